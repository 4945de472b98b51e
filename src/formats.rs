use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Three-state view of an optional record attribute.
///
/// `Absent` and `Null` both skip value-level rules, but required-key rules
/// only fire on `Absent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Null,
    Present(&'a Value),
}

impl<'a> FieldValue<'a> {
    pub fn of(record: &'a Map<String, Value>, key: &str) -> Self {
        match record.get(key) {
            None => Self::Absent,
            Some(Value::Null) => Self::Null,
            Some(value) => Self::Present(value),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn value(&self) -> Option<&'a Value> {
        match *self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value().and_then(Value::as_str)
    }

    /// True only for a literal JSON `true`.
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Present(Value::Bool(true)))
    }
}

/// Identifier used for attributing violations; rendered from the record's
/// `id`, which may be a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn from_record(record: &Map<String, Value>) -> Self {
        match record.get("id") {
            Some(Value::String(id)) => Self(id.clone()),
            Some(Value::Null) | None => Self::unknown(),
            Some(other) => Self(other.to_string()),
        }
    }

    pub fn unknown() -> Self {
        Self("unknown".to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Field-shape or conditional-rule failure.
    Field,
    /// Referenced payload fails its shape check.
    Structure,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Structure => "structure",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub document_id: DocumentId,
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

/// Collects violations for one record, keeping rule order.
#[derive(Debug)]
pub struct ViolationSink<'a> {
    document_id: &'a DocumentId,
    prefix: String,
    violations: Vec<Violation>,
}

impl<'a> ViolationSink<'a> {
    pub fn new(document_id: &'a DocumentId) -> Self {
        Self {
            document_id,
            prefix: String::new(),
            violations: Vec::new(),
        }
    }

    /// Sink whose field names are qualified by `prefix`, e.g.
    /// `associated_video_lectures[2]`.
    pub fn nested(document_id: &'a DocumentId, prefix: impl Into<String>) -> Self {
        Self {
            document_id,
            prefix: prefix.into(),
            violations: Vec::new(),
        }
    }

    pub fn qualify(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_owned()
        } else if field.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}.{field}", self.prefix)
        }
    }

    pub fn push(&mut self, kind: ViolationKind, field: &str, message: impl Into<String>) {
        let field = self.qualify(field);
        self.violations.push(Violation {
            document_id: self.document_id.clone(),
            field,
            kind,
            message: message.into(),
        });
    }

    pub fn field(&mut self, field: &str, message: impl Into<String>) {
        self.push(ViolationKind::Field, field, message);
    }

    pub fn extend(&mut self, violations: Vec<Violation>) {
        self.violations.extend(violations);
    }

    pub fn finish(self) -> Vec<Violation> {
        self.violations
    }
}

/// Short rendering of a JSON value for messages.
pub fn describe(value: &Value) -> String {
    match value {
        Value::String(text) => format!("'{text}'"),
        other => other.to_string(),
    }
}
