//! Shape checks for the auxiliary JSON payloads referenced from metadata
//! records. Every failure, including I/O and parse errors, is returned as a
//! [`PayloadError`] and never escapes as a fatal error.

use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

pub const SEGMENTED_DESCRIPTION_KEYS: &[&str] = &[
    "language",
    "general_description_en",
    "keywords_en",
    "keywords_fr",
    "video_segments",
];

pub const VIDEO_SEGMENT_KEYS: &[&str] = &[
    "start_timestamp",
    "end_timestamp",
    "key_frame_timestamp",
    "contains_math",
    "contains_diagram",
    "pointer_usage",
    "transcription_en",
    "transcription_fr",
    "extracted_text",
    "description_en",
    "description_fr",
    "keywords_en",
    "keywords_fr",
];

pub const PAGE_ENTRY_KEYS: &[&str] = &["page", "timestamps"];

pub const TIME_RANGE_KEYS: &[&str] = &["start", "end"];

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("read payload: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse payload json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} is not an object")]
    NotAnObject(String),

    #[error("{0} is not an array")]
    NotAnArray(String),

    #[error("{context} is missing key '{key}'")]
    MissingKey { context: String, key: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PayloadKind {
    /// Segmented video description (`video_segments`).
    Segments,
    /// Page-to-timestamp ranges.
    PageTimestamps,
}

impl PayloadKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Segments => "segmented video description",
            Self::PageTimestamps => "page timestamps",
        }
    }

    pub fn check_file(&self, path: &Path) -> Result<(), PayloadError> {
        match self {
            Self::Segments => check_segmented_description_file(path),
            Self::PageTimestamps => check_page_timestamps_file(path),
        }
    }
}

pub fn check_segmented_description_file(path: &Path) -> Result<(), PayloadError> {
    let bytes = std::fs::read(path)?;
    check_segmented_description_bytes(&bytes)
}

pub fn check_segmented_description_bytes(bytes: &[u8]) -> Result<(), PayloadError> {
    let payload: Value = serde_json::from_slice(bytes)?;
    check_segmented_description(&payload)
}

pub fn check_segmented_description(payload: &Value) -> Result<(), PayloadError> {
    let root = expect_object(payload, "root")?;
    require_keys(root, "root", SEGMENTED_DESCRIPTION_KEYS)?;

    let segments = expect_array(&root["video_segments"], "video_segments")?;
    for (index, segment) in segments.iter().enumerate() {
        let context = format!("video_segments[{index}]");
        let segment = expect_object(segment, &context)?;
        require_keys(segment, &context, VIDEO_SEGMENT_KEYS)?;
    }

    Ok(())
}

pub fn check_page_timestamps_file(path: &Path) -> Result<(), PayloadError> {
    let bytes = std::fs::read(path)?;
    check_page_timestamps_bytes(&bytes)
}

pub fn check_page_timestamps_bytes(bytes: &[u8]) -> Result<(), PayloadError> {
    let payload: Value = serde_json::from_slice(bytes)?;
    check_page_timestamps(&payload)
}

pub fn check_page_timestamps(payload: &Value) -> Result<(), PayloadError> {
    let pages = expect_array(payload, "root")?;
    for (index, page) in pages.iter().enumerate() {
        let context = format!("[{index}]");
        let page = expect_object(page, &context)?;
        require_keys(page, &context, PAGE_ENTRY_KEYS)?;

        let ranges = expect_array(&page["timestamps"], &format!("{context}.timestamps"))?;
        for (range_index, range) in ranges.iter().enumerate() {
            let range_context = format!("{context}.timestamps[{range_index}]");
            let range = expect_object(range, &range_context)?;
            require_keys(range, &range_context, TIME_RANGE_KEYS)?;
        }
    }

    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    context: &str,
) -> Result<&'a Map<String, Value>, PayloadError> {
    value
        .as_object()
        .ok_or_else(|| PayloadError::NotAnObject(context.to_owned()))
}

fn expect_array<'a>(value: &'a Value, context: &str) -> Result<&'a Vec<Value>, PayloadError> {
    value
        .as_array()
        .ok_or_else(|| PayloadError::NotAnArray(context.to_owned()))
}

fn require_keys(
    object: &Map<String, Value>,
    context: &str,
    keys: &[&'static str],
) -> Result<(), PayloadError> {
    match keys.iter().find(|key| !object.contains_key(**key)) {
        Some(key) => Err(PayloadError::MissingKey {
            context: context.to_owned(),
            key: *key,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn segment() -> Value {
        let mut segment = Map::new();
        for key in VIDEO_SEGMENT_KEYS {
            segment.insert((*key).to_owned(), json!(null));
        }
        segment.insert("contains_math".to_owned(), json!(false));
        segment.insert("start_timestamp".to_owned(), json!("00:00:00"));
        Value::Object(segment)
    }

    fn description() -> Value {
        json!({
            "language": "en",
            "general_description_en": "Intro lecture",
            "keywords_en": ["intro"],
            "keywords_fr": ["introduction"],
            "video_segments": [segment(), segment()],
        })
    }

    #[test]
    fn complete_segmented_description_is_valid() {
        assert!(check_segmented_description(&description()).is_ok());
    }

    #[test]
    fn empty_segment_list_is_valid() {
        let mut payload = description();
        payload["video_segments"] = json!([]);
        assert!(check_segmented_description(&payload).is_ok());
    }

    #[test]
    fn removing_any_segment_key_invalidates_the_file() {
        for key in VIDEO_SEGMENT_KEYS {
            let mut payload = description();
            payload["video_segments"][1]
                .as_object_mut()
                .expect("segment object")
                .remove(*key);

            let err = check_segmented_description(&payload).expect_err("missing key");
            assert!(
                matches!(err, PayloadError::MissingKey { key: missing, .. } if missing == *key),
                "unexpected error for {key}: {err}"
            );
        }
    }

    #[test]
    fn removing_a_top_level_key_invalidates_the_file() {
        let mut payload = description();
        payload
            .as_object_mut()
            .expect("root object")
            .remove("keywords_fr");

        assert!(matches!(
            check_segmented_description(&payload),
            Err(PayloadError::MissingKey {
                key: "keywords_fr",
                ..
            })
        ));
    }

    #[test]
    fn wrong_shapes_are_classified() {
        assert!(matches!(
            check_segmented_description(&json!([])),
            Err(PayloadError::NotAnObject(_))
        ));

        let mut payload = description();
        payload["video_segments"] = json!({"0": {}});
        assert!(matches!(
            check_segmented_description(&payload),
            Err(PayloadError::NotAnArray(_))
        ));

        let mut payload = description();
        payload["video_segments"] = json!(["segment"]);
        assert!(matches!(
            check_segmented_description(&payload),
            Err(PayloadError::NotAnObject(_))
        ));
    }

    #[test]
    fn malformed_json_is_an_error_not_a_panic() {
        assert!(matches!(
            check_segmented_description_bytes(b"{not json"),
            Err(PayloadError::Json(_))
        ));
        assert!(matches!(
            check_page_timestamps_bytes(b""),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn page_timestamps_accept_well_formed_entries() {
        let payload = json!([
            {"page": 1, "timestamps": [{"start": "00:00:00", "end": "00:01:10"}]},
            {"page": 2, "timestamps": []},
        ]);
        assert!(check_page_timestamps(&payload).is_ok());
    }

    #[test]
    fn page_timestamps_reject_bad_shapes() {
        assert!(matches!(
            check_page_timestamps(&json!({"page": 1})),
            Err(PayloadError::NotAnArray(_))
        ));
        assert!(matches!(
            check_page_timestamps(&json!([{"timestamps": []}])),
            Err(PayloadError::MissingKey { key: "page", .. })
        ));
        assert!(matches!(
            check_page_timestamps(&json!([{"page": 1, "timestamps": "00:00"}])),
            Err(PayloadError::NotAnArray(_))
        ));
        assert!(matches!(
            check_page_timestamps(&json!([{"page": 1, "timestamps": [{"start": "0"}]}])),
            Err(PayloadError::MissingKey { key: "end", .. })
        ));
        assert!(matches!(
            check_page_timestamps(&json!([[1, []]])),
            Err(PayloadError::NotAnObject(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let missing = temp.path().join("absent.json");

        assert!(matches!(
            PayloadKind::PageTimestamps.check_file(&missing),
            Err(PayloadError::Io(_))
        ));
        assert!(matches!(
            PayloadKind::Segments.check_file(&missing),
            Err(PayloadError::Io(_))
        ));
        Ok(())
    }
}
