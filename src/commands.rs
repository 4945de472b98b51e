use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;

use crate::cli::{PathsArgs, PayloadArgs, ValidateArgs};
use crate::config::RuleSet;
use crate::corpus;
use crate::report::{self, Report};

/// Exit status for a completed run that found problems under `--deny-violations`.
pub const VIOLATIONS_EXIT: u8 = 2;

pub fn validate(args: ValidateArgs) -> anyhow::Result<ExitCode> {
    let root = PathBuf::from(&args.root);
    let rules = RuleSet::resolve(args.rules, args.video_lecture_gate, args.original_link_check)
        .context("resolve rule set")?;
    tracing::info!(root = %root.display(), rules = %rules.describe(), "validating corpus");

    let outcome = corpus::run(&root, &rules)
        .with_context(|| format!("validate corpus: {}", root.display()))?;

    let report = Report::new(&outcome, &rules);
    let mut stdout = std::io::stdout().lock();
    report
        .write(args.format, &mut stdout)
        .context("write report")?;

    if args.deny_violations && !outcome.is_clean() {
        return Ok(ExitCode::from(VIOLATIONS_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn paths(args: PathsArgs) -> anyhow::Result<ExitCode> {
    let root = PathBuf::from(&args.root);
    let outcome = corpus::run_paths(&root)
        .with_context(|| format!("check declared paths: {}", root.display()))?;

    let mut stdout = std::io::stdout().lock();
    report::write_paths_report(&outcome, &mut stdout).context("write paths report")?;
    Ok(ExitCode::SUCCESS)
}

pub fn payload(args: PayloadArgs) -> anyhow::Result<ExitCode> {
    let file = PathBuf::from(&args.file);
    match args.kind.check_file(&file) {
        Ok(()) => {
            println!("{}: valid {}", file.display(), args.kind.label());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{}: invalid {}: {err}", file.display(), args.kind.label());
            Ok(ExitCode::FAILURE)
        }
    }
}
