use std::collections::BTreeSet;
use std::io::Write;

use anyhow::Context as _;
use serde::Serialize;

use crate::config::RuleSet;
use crate::corpus::{CorpusOutcome, PathFinding};
use crate::formats::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub metadata_files: usize,
    pub documents: usize,
    pub paths_checked: usize,
    pub valid_paths: usize,
    pub invalid_paths: usize,
    pub violations: usize,
    pub orphaned_files: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Categories {
    pub types: BTreeSet<String>,
    pub subtypes: BTreeSet<String>,
    pub models: BTreeSet<String>,
    pub processing_methods: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileViolation {
    pub metadata_file: String,
    #[serde(flatten)]
    pub violation: Violation,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub rule_set: String,
    pub summary: Summary,
    pub invalid_paths: Vec<PathFinding>,
    pub violations: Vec<FileViolation>,
    pub categories: Categories,
    pub orphaned_files: Vec<String>,
}

impl Report {
    pub fn new(outcome: &CorpusOutcome, rules: &RuleSet) -> Self {
        let invalid_paths: Vec<PathFinding> = outcome
            .files
            .iter()
            .flat_map(|file| file.invalid_paths.iter().cloned())
            .collect();
        let violations: Vec<FileViolation> = outcome
            .files
            .iter()
            .flat_map(|file| {
                file.violations.iter().map(|violation| FileViolation {
                    metadata_file: file.metadata_file.clone(),
                    violation: violation.clone(),
                })
            })
            .collect();
        let accumulator = &outcome.accumulator;

        Self {
            rule_set: rules.describe(),
            summary: Summary {
                metadata_files: outcome.files.len(),
                documents: accumulator.documents,
                paths_checked: outcome.valid_path_count() + invalid_paths.len(),
                valid_paths: outcome.valid_path_count(),
                invalid_paths: invalid_paths.len(),
                violations: violations.len(),
                orphaned_files: outcome.orphaned_files.len(),
            },
            invalid_paths,
            violations,
            categories: Categories {
                types: accumulator.types.clone(),
                subtypes: accumulator.subtypes.clone(),
                models: accumulator.models.clone(),
                processing_methods: accumulator.processing_methods.clone(),
            },
            orphaned_files: outcome.orphaned_files.clone(),
        }
    }

    pub fn write(&self, format: ReportFormat, out: &mut impl Write) -> anyhow::Result<()> {
        match format {
            ReportFormat::Text => self.write_text(out),
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self).context("serialize report")?;
                writeln!(out).context("write report newline")?;
                Ok(())
            }
        }
    }

    fn write_text(&self, out: &mut impl Write) -> anyhow::Result<()> {
        write_invalid_paths(&self.invalid_paths, out)?;

        if !self.violations.is_empty() {
            writeln!(out, "\nViolations:")?;
            for entry in &self.violations {
                let violation = &entry.violation;
                writeln!(out, "File: {}", entry.metadata_file)?;
                writeln!(out, "  Document ID: {}", violation.document_id)?;
                writeln!(out, "  Field: {} ({})", violation.field, violation.kind)?;
                writeln!(out, "  Message: {}", violation.message)?;
                writeln!(out)?;
            }
        }

        if !self.orphaned_files.is_empty() {
            writeln!(out, "\nOrphaned files:")?;
            for file in &self.orphaned_files {
                writeln!(out, "  {file}")?;
            }
        }

        let summary = &self.summary;
        writeln!(out, "\nRule set: {}", self.rule_set)?;
        writeln!(out, "Metadata files: {}", summary.metadata_files)?;
        writeln!(out, "Documents: {}", summary.documents)?;
        writeln!(out, "Total paths checked: {}", summary.paths_checked)?;
        writeln!(out, "Number of valid paths: {}", summary.valid_paths)?;
        writeln!(out, "Number of invalid paths: {}", summary.invalid_paths)?;
        writeln!(out, "Number of violations: {}", summary.violations)?;
        writeln!(out, "Number of orphaned files: {}", summary.orphaned_files)?;

        let categories = [
            ("type", &self.categories.types),
            ("subtype", &self.categories.subtypes),
            ("model", &self.categories.models),
            ("processing_method", &self.categories.processing_methods),
        ];
        writeln!(out, "\nDistinct values:")?;
        for (name, values) in categories {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            writeln!(out, "  {name}: {}", values.join(", "))?;
        }

        out.flush().context("flush report")?;
        Ok(())
    }
}

/// Output of the `paths` command.
pub fn write_paths_report(outcome: &CorpusOutcome, out: &mut impl Write) -> anyhow::Result<()> {
    let invalid: Vec<PathFinding> = outcome
        .files
        .iter()
        .flat_map(|file| file.invalid_paths.iter().cloned())
        .collect();
    let valid = outcome.valid_path_count();

    writeln!(out, "Total paths checked: {}", valid + invalid.len())?;
    writeln!(out, "Number of valid paths: {valid}")?;
    writeln!(out, "Number of invalid paths: {}", invalid.len())?;

    if invalid.is_empty() {
        writeln!(out, "All paths seem valid")?;
    } else {
        write_invalid_paths(&invalid, out)?;
    }
    out.flush().context("flush paths report")?;
    Ok(())
}

fn write_invalid_paths(invalid: &[PathFinding], out: &mut impl Write) -> anyhow::Result<()> {
    if invalid.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nInvalid Paths:")?;
    for finding in invalid {
        writeln!(out, "File: {}", finding.metadata_file)?;
        writeln!(out, "  Document ID: {}", finding.document_id)?;
        writeln!(out, "  Attribute: {}", finding.attribute)?;
        writeln!(out, "  Path: {}", finding.path)?;
        writeln!(out)?;
    }
    Ok(())
}
