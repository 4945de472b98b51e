//! Whole-corpus pass: walks `<root>/metadata/*.json`, validates every
//! document, checks every declared path, and reconciles the content tree
//! against the paths the records reference.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::RuleSet;
use crate::document;
use crate::formats::{DocumentId, Violation, ViolationKind, describe};
use crate::lecture;
use crate::resolver;

pub const METADATA_DIR: &str = "metadata";

pub const PATH_ATTRIBUTES: &[&str] = &["path", "srt_path", "pdf_page_video_ts_path"];

/// Conditions that abort the whole run.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("root folder does not exist: {0}")]
    RootMissing(PathBuf),

    #[error("read metadata dir {path}: {source}")]
    MetadataDirUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("read metadata file {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse metadata file {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("metadata file {0}: 'documents' is not a list")]
    DocumentsNotArray(PathBuf),

    #[error("walk content tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A declared path that failed exact resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathFinding {
    pub metadata_file: String,
    pub document_id: DocumentId,
    pub attribute: String,
    pub path: String,
}

/// Corpus-wide aggregation, merged once per metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Accumulator {
    pub documents: usize,
    pub types: BTreeSet<String>,
    pub subtypes: BTreeSet<String>,
    pub models: BTreeSet<String>,
    pub processing_methods: BTreeSet<String>,
    /// Multiset of declared path values.
    pub referenced_paths: BTreeMap<String, usize>,
}

impl Accumulator {
    pub fn record_document(&mut self, document: &Map<String, Value>) {
        self.documents += 1;
        let categories = [
            ("type", &mut self.types),
            ("subtype", &mut self.subtypes),
            ("model", &mut self.models),
            ("processing_method", &mut self.processing_methods),
        ];
        for (key, values) in categories {
            if let Some(value) = document.get(key).and_then(Value::as_str) {
                values.insert(value.to_owned());
            }
        }
    }

    pub fn record_path(&mut self, path: &str) {
        *self.referenced_paths.entry(path.to_owned()).or_default() += 1;
    }

    pub fn is_referenced(&self, path: &str) -> bool {
        self.referenced_paths.contains_key(path)
    }

    pub fn merge(&mut self, other: Accumulator) {
        self.documents += other.documents;
        self.types.extend(other.types);
        self.subtypes.extend(other.subtypes);
        self.models.extend(other.models);
        self.processing_methods.extend(other.processing_methods);
        for (path, count) in other.referenced_paths {
            *self.referenced_paths.entry(path).or_default() += count;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileOutcome {
    pub metadata_file: String,
    pub violations: Vec<Violation>,
    pub valid_paths: usize,
    pub invalid_paths: Vec<PathFinding>,
    pub accumulator: Accumulator,
}

#[derive(Debug, Clone, Default)]
pub struct CorpusOutcome {
    pub files: Vec<FileOutcome>,
    pub accumulator: Accumulator,
    pub orphaned_files: Vec<String>,
}

impl CorpusOutcome {
    pub fn violation_count(&self) -> usize {
        self.files.iter().map(|file| file.violations.len()).sum()
    }

    pub fn valid_path_count(&self) -> usize {
        self.files.iter().map(|file| file.valid_paths).sum()
    }

    pub fn invalid_path_count(&self) -> usize {
        self.files.iter().map(|file| file.invalid_paths.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.violation_count() == 0
            && self.invalid_path_count() == 0
            && self.orphaned_files.is_empty()
    }
}

/// Full pass: record rules, declared paths, and orphan reconciliation.
pub fn run(root: &Path, rules: &RuleSet) -> Result<CorpusOutcome, CorpusError> {
    let mut outcome = run_files(root, Some(rules))?;
    let content = content_files(root)?;
    outcome.orphaned_files = orphaned_files(&content, &outcome.accumulator);
    tracing::info!(
        documents = outcome.accumulator.documents,
        violations = outcome.violation_count(),
        invalid_paths = outcome.invalid_path_count(),
        orphaned_files = outcome.orphaned_files.len(),
        "corpus validated"
    );
    Ok(outcome)
}

/// Declared-path check only, without record rules or orphan detection.
pub fn run_paths(root: &Path) -> Result<CorpusOutcome, CorpusError> {
    run_files(root, None)
}

fn run_files(root: &Path, rules: Option<&RuleSet>) -> Result<CorpusOutcome, CorpusError> {
    if !root.is_dir() {
        return Err(CorpusError::RootMissing(root.to_path_buf()));
    }

    let mut outcome = CorpusOutcome::default();
    for path in metadata_files(root)? {
        let file = validate_file(&path, root, rules)?;
        outcome.accumulator.merge(file.accumulator.clone());
        outcome.files.push(file);
    }
    Ok(outcome)
}

/// `*.json` files directly under `<root>/metadata`, sorted by name.
pub fn metadata_files(root: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let dir = root.join(METADATA_DIR);
    let unreadable = |source| CorpusError::MetadataDirUnreadable {
        path: dir.clone(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(&dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads the `documents` list of one metadata file; `None` when the key is
/// missing.
pub fn load_documents(path: &Path) -> Result<Option<Vec<Value>>, CorpusError> {
    let contents = std::fs::read(path).map_err(|source| CorpusError::MetadataRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut payload: Value =
        serde_json::from_slice(&contents).map_err(|source| CorpusError::MetadataParse {
            path: path.to_path_buf(),
            source,
        })?;

    match payload.get_mut("documents").map(Value::take) {
        None => Ok(None),
        Some(Value::Array(documents)) => Ok(Some(documents)),
        Some(_) => Err(CorpusError::DocumentsNotArray(path.to_path_buf())),
    }
}

/// Validates every document of one metadata file. With `rules` unset only
/// the declared paths are checked.
pub fn validate_file(
    path: &Path,
    root: &Path,
    rules: Option<&RuleSet>,
) -> Result<FileOutcome, CorpusError> {
    let metadata_file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::info!(file = %path.display(), "validating metadata file");

    let mut outcome = FileOutcome {
        metadata_file,
        ..FileOutcome::default()
    };

    let Some(documents) = load_documents(path)? else {
        tracing::warn!(file = %path.display(), "no 'documents' key found; skipping");
        return Ok(outcome);
    };

    for (index, entry) in documents.iter().enumerate() {
        let Some(document) = entry.as_object() else {
            outcome.violations.push(Violation {
                document_id: DocumentId::unknown(),
                field: format!("documents[{index}]"),
                kind: ViolationKind::Field,
                message: format!("document must be an object, got {}", describe(entry)),
            });
            continue;
        };

        outcome.accumulator.record_document(document);
        check_declared_paths(document, root, &mut outcome);
        if let Some(rules) = rules {
            outcome
                .violations
                .extend(document::validate(document, root, rules));
        }
    }

    tracing::debug!(
        file = %outcome.metadata_file,
        documents = documents.len(),
        violations = outcome.violations.len(),
        invalid_paths = outcome.invalid_paths.len(),
        "metadata file done"
    );
    Ok(outcome)
}

/// Non-null path attributes of a document and of its associated video
/// lectures, named as they appear in reports.
pub fn declared_paths(document: &Map<String, Value>) -> Vec<(String, &Value)> {
    let mut declared = Vec::new();
    collect_paths(document, None, &mut declared);

    if let Some(lectures) = document.get(lecture::FIELD).and_then(Value::as_array) {
        for (index, entry) in lectures.iter().enumerate() {
            if let Some(entry) = entry.as_object() {
                let prefix = format!("{}[{index}]", lecture::FIELD);
                collect_paths(entry, Some(&prefix), &mut declared);
            }
        }
    }
    declared
}

fn collect_paths<'a>(
    record: &'a Map<String, Value>,
    prefix: Option<&str>,
    declared: &mut Vec<(String, &'a Value)>,
) {
    for attribute in PATH_ATTRIBUTES {
        match record.get(*attribute) {
            None | Some(Value::Null) => {}
            Some(value) => {
                let name = match prefix {
                    Some(prefix) => format!("{prefix}.{attribute}"),
                    None => (*attribute).to_owned(),
                };
                declared.push((name, value));
            }
        }
    }
}

fn check_declared_paths(document: &Map<String, Value>, root: &Path, outcome: &mut FileOutcome) {
    let document_id = DocumentId::from_record(document);
    for (attribute, value) in declared_paths(document) {
        let valid = match value.as_str() {
            Some(path) => {
                outcome.accumulator.record_path(path);
                let resolution = resolver::resolve(root, path);
                if !resolution.is_found() {
                    tracing::debug!(
                        %attribute,
                        path,
                        reason = %resolution.describe(),
                        "declared path does not resolve"
                    );
                }
                resolution.is_found()
            }
            None => false,
        };

        if valid {
            outcome.valid_paths += 1;
        } else {
            outcome.invalid_paths.push(PathFinding {
                metadata_file: outcome.metadata_file.clone(),
                document_id: document_id.clone(),
                attribute,
                path: value.as_str().map_or_else(|| value.to_string(), str::to_owned),
            });
        }
    }
}

/// Non-hidden files under `root`, outside `metadata/`, as `/`-separated
/// relative paths in sorted order.
pub fn content_files(root: &Path) -> Result<Vec<String>, CorpusError> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            let metadata = entry.depth() == 1
                && entry.file_type().is_dir()
                && entry.file_name() == METADATA_DIR;
            !hidden && !metadata
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let relative = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(relative);
    }
    files.sort();
    Ok(files)
}

/// Content files that no record declares.
pub fn orphaned_files(content_files: &[String], accumulator: &Accumulator) -> Vec<String> {
    let mut orphans: Vec<String> = content_files
        .iter()
        .filter(|file| !accumulator.is_referenced(file))
        .cloned()
        .collect();
    orphans.sort();
    orphans.dedup();
    orphans
}
