use clap::{Args, Parser, Subcommand};

use crate::config::{OriginalLinkCheck, RuleSetVersion, VideoLectureGate};
use crate::payload::PayloadKind;
use crate::report::ReportFormat;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Only log warnings and errors (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate every metadata record, declared path and content file.
    Validate(ValidateArgs),
    /// Only check that declared paths resolve.
    Paths(PathsArgs),
    /// Check the shape of a single auxiliary JSON payload.
    Payload(PayloadArgs),
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Course root containing `metadata/` and the content tree.
    pub root: String,

    /// Rule-set version (default: COURSECHECK_RULES, then v2).
    #[arg(long, value_enum)]
    pub rules: Option<RuleSetVersion>,

    /// Override the video-lecture gate of the selected rule set.
    #[arg(long, value_enum)]
    pub video_lecture_gate: Option<VideoLectureGate>,

    /// Override the original-link check of the selected rule set.
    #[arg(long, value_enum)]
    pub original_link_check: Option<OriginalLinkCheck>,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Exit with status 2 when any violation, invalid path or orphan is found.
    #[arg(long)]
    pub deny_violations: bool,
}

#[derive(Debug, Args)]
pub struct PathsArgs {
    /// Course root containing `metadata/` and the content tree.
    pub root: String,
}

#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// Payload format to check against.
    #[arg(long, value_enum)]
    pub kind: PayloadKind,

    /// JSON file to check.
    pub file: String,
}
