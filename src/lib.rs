#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod document;
pub mod formats;
pub mod lecture;
pub mod logging;
pub mod payload;
pub mod report;
pub mod resolver;
pub mod rules;
