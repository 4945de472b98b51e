//! Rule primitives shared by the document and video-lecture validators.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::formats::{FieldValue, ViolationKind, ViolationSink, describe};
use crate::payload::PayloadKind;
use crate::resolver;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("valid date pattern"));

/// How a category attribute's values are constrained.
#[derive(Debug, Clone, Copy)]
pub enum Vocabulary {
    /// Open tag; any string is accepted.
    FreeForm,
    /// Closed enumeration.
    OneOf(&'static [&'static str]),
}

pub fn check_vocabulary(
    sink: &mut ViolationSink<'_>,
    field: &str,
    value: FieldValue<'_>,
    vocabulary: Vocabulary,
) {
    let Some(value) = value.value() else {
        return;
    };
    match (value.as_str(), vocabulary) {
        (Some(_), Vocabulary::FreeForm) => {}
        (Some(text), Vocabulary::OneOf(allowed)) if allowed.contains(&text) => {}
        (Some(text), Vocabulary::OneOf(allowed)) => sink.field(
            field,
            format!("'{text}' is not one of: {}", allowed.join(", ")),
        ),
        (None, _) => sink.field(field, format!("must be a string, got {}", describe(value))),
    }
}

pub fn check_integer(sink: &mut ViolationSink<'_>, field: &str, value: FieldValue<'_>) {
    if let Some(value) = value.value()
        && !(value.is_i64() || value.is_u64())
    {
        sink.field(field, format!("must be an integer, got {}", describe(value)));
    }
}

pub fn check_string(sink: &mut ViolationSink<'_>, field: &str, value: FieldValue<'_>) {
    if let Some(value) = value.value()
        && !value.is_string()
    {
        sink.field(field, format!("must be a string, got {}", describe(value)));
    }
}

pub fn check_boolean(sink: &mut ViolationSink<'_>, field: &str, value: FieldValue<'_>) {
    if let Some(value) = value.value()
        && !value.is_boolean()
    {
        sink.field(field, format!("must be a boolean, got {}", describe(value)));
    }
}

pub fn check_date(sink: &mut ViolationSink<'_>, field: &str, value: FieldValue<'_>) {
    let Some(value) = value.value() else {
        return;
    };
    match value.as_str() {
        Some(text) if DATE_PATTERN.is_match(text) => {}
        _ => sink.field(
            field,
            format!("must be a DD/MM/YYYY date, got {}", describe(value)),
        ),
    }
}

/// Present values must be literally `false`.
pub fn check_false(
    sink: &mut ViolationSink<'_>,
    field: &str,
    value: FieldValue<'_>,
    message: &str,
) {
    if let Some(value) = value.value()
        && value != &Value::Bool(false)
    {
        sink.field(field, message);
    }
}

pub fn check_no_underscore(sink: &mut ViolationSink<'_>, field: &str, value: FieldValue<'_>) {
    let Some(value) = value.value() else {
        return;
    };
    match value.as_str() {
        Some(text) if text.contains('_') => {
            sink.field(field, format!("must not contain '_': '{text}'"));
        }
        Some(_) => {}
        None => sink.field(field, format!("must be a string, got {}", describe(value))),
    }
}

pub fn check_suffix(
    sink: &mut ViolationSink<'_>,
    field: &str,
    value: FieldValue<'_>,
    suffix: &str,
) {
    let Some(value) = value.value() else {
        return;
    };
    match value.as_str() {
        Some(text) if text.ends_with(suffix) => {}
        Some(text) => sink.field(field, format!("must end with '{suffix}': '{text}'")),
        None => sink.field(field, format!("must be a string, got {}", describe(value))),
    }
}

pub fn check_contains_any(
    sink: &mut ViolationSink<'_>,
    field: &str,
    value: FieldValue<'_>,
    needles: &[&str],
) {
    let Some(value) = value.value() else {
        return;
    };
    match value.as_str() {
        Some(text) if needles.iter().any(|needle| text.contains(needle)) => {}
        _ => sink.field(
            field,
            format!(
                "must be a link containing one of: {}; got {}",
                needles.join(", "),
                describe(value)
            ),
        ),
    }
}

/// Shape check of the payload at `relative`; callers only invoke this once the
/// path is known to resolve.
pub fn check_payload(
    sink: &mut ViolationSink<'_>,
    root: &Path,
    field: &str,
    relative: &str,
    kind: PayloadKind,
) {
    if let Err(err) = kind.check_file(&root.join(relative)) {
        tracing::debug!(
            field = %sink.qualify(field),
            path = relative,
            %err,
            "payload failed shape check"
        );
        sink.push(
            ViolationKind::Structure,
            field,
            format!("'{relative}' is not a valid {}: {err}", kind.label()),
        );
    }
}

/// Runs the payload check when a string path resolves; a missing file is left
/// to the existence checks.
pub fn check_payload_if_found(
    sink: &mut ViolationSink<'_>,
    root: &Path,
    field: &str,
    value: FieldValue<'_>,
    kind: PayloadKind,
) {
    if let Some(relative) = value.as_str()
        && resolver::resolve(root, relative).is_found()
    {
        check_payload(sink, root, field, relative, kind);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::formats::DocumentId;

    type Rule = fn(&mut ViolationSink<'_>, FieldValue<'_>);

    fn run(rule: Rule, value: Value) -> usize {
        let id = DocumentId::from("1");
        let mut sink = ViolationSink::new(&id);
        rule(&mut sink, FieldValue::Present(&value));
        sink.finish().len()
    }

    fn date(sink: &mut ViolationSink<'_>, value: FieldValue<'_>) {
        check_date(sink, "from", value);
    }

    fn week(sink: &mut ViolationSink<'_>, value: FieldValue<'_>) {
        check_integer(sink, "week", value);
    }

    fn model(sink: &mut ViolationSink<'_>, value: FieldValue<'_>) {
        check_vocabulary(sink, "model", value, Vocabulary::OneOf(&["a", "b"]));
    }

    fn category(sink: &mut ViolationSink<'_>, value: FieldValue<'_>) {
        check_vocabulary(sink, "type", value, Vocabulary::FreeForm);
    }

    fn link(sink: &mut ViolationSink<'_>, value: FieldValue<'_>) {
        check_contains_any(sink, "original_link", value, &["mediaspace", "edx"]);
    }

    #[test]
    fn date_pattern_checks_shape_only() {
        assert_eq!(run(date, json!("01/09/2024")), 0);
        assert_eq!(run(date, json!("99/99/9999")), 0);
        assert_eq!(run(date, json!("1/9/2024")), 1);
        assert_eq!(run(date, json!("2024-09-01")), 1);
        assert_eq!(run(date, json!("01/09/2024 ")), 1);
        assert_eq!(run(date, json!(20240901)), 1);
    }

    #[test]
    fn integer_rule_rejects_strings_and_floats() {
        assert_eq!(run(week, json!(3)), 0);
        assert_eq!(run(week, json!("3")), 1);
        assert_eq!(run(week, json!(3.5)), 1);
        assert_eq!(run(week, json!(true)), 1);
    }

    #[test]
    fn closed_vocabulary_rejects_unknown_values() {
        assert_eq!(run(model, json!("a")), 0);
        assert_eq!(run(model, json!("c")), 1);
        assert_eq!(run(model, json!(1)), 1);
        assert_eq!(run(category, json!("anything")), 0);
    }

    #[test]
    fn null_and_absent_skip_value_rules() {
        let id = DocumentId::from("1");
        let mut sink = ViolationSink::new(&id);
        check_suffix(&mut sink, "srt_path", FieldValue::Null, ".srt");
        check_suffix(&mut sink, "srt_path", FieldValue::Absent, ".srt");
        check_false(&mut sink, "tikz", FieldValue::Null, "must be false");
        check_no_underscore(&mut sink, "title", FieldValue::Absent);
        assert!(sink.finish().is_empty());
    }

    #[test]
    fn link_must_contain_a_known_platform() {
        assert_eq!(run(link, json!("https://mediaspace.example.org/v/1")), 0);
        assert_eq!(run(link, json!("https://learning.edx.org/course")), 0);
        assert_eq!(run(link, json!("https://youtube.com/watch")), 1);
        assert_eq!(run(link, json!(42)), 1);
    }

    #[test]
    fn payload_check_skips_unresolved_paths() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::write(temp.path().join("Broken.json"), "{}")?;
        let id = DocumentId::from("1");
        let mut sink = ViolationSink::new(&id);

        for path in ["missing.json", "broken.json", "Broken.json"] {
            let value = json!(path);
            check_payload_if_found(
                &mut sink,
                temp.path(),
                "pdf_page_video_ts_path",
                FieldValue::Present(&value),
                PayloadKind::PageTimestamps,
            );
        }

        let violations = sink.finish();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::Structure);
        assert!(violations[0].message.starts_with("'Broken.json'"));
        Ok(())
    }
}
