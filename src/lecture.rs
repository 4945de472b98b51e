use std::path::Path;

use serde_json::{Map, Value};

use crate::config::LECTURE_LINK_PLATFORM;
use crate::formats::{DocumentId, FieldValue, Violation, ViolationSink};
use crate::payload::PayloadKind;
use crate::rules;

pub const FIELD: &str = "associated_video_lectures";

pub const REQUIRED_KEYS: &[&str] = &[
    "title",
    "is_gemini_processed_video",
    "original_link",
    "path",
    "srt_path",
    "pdf_page_video_ts_path",
];

/// Validates the `index`-th entry of a document's `associated_video_lectures`.
/// Field names in the returned violations are qualified with the entry
/// position, e.g. `associated_video_lectures[2].srt_path`.
///
/// Referenced files are only opened when they resolve; unresolved paths are
/// reported once, by the corpus declared-path check.
pub fn validate(
    lecture: &Map<String, Value>,
    document_id: &DocumentId,
    index: usize,
    root: &Path,
) -> Vec<Violation> {
    let mut sink = ViolationSink::nested(document_id, format!("{FIELD}[{index}]"));
    let field = |key: &str| FieldValue::of(lecture, key);

    for key in REQUIRED_KEYS {
        if field(*key).is_absent() {
            sink.field(key, "missing required key");
        }
    }

    rules::check_no_underscore(&mut sink, "title", field("title"));
    rules::check_contains_any(
        &mut sink,
        "original_link",
        field("original_link"),
        &[LECTURE_LINK_PLATFORM],
    );

    rules::check_suffix(&mut sink, "srt_path", field("srt_path"), ".srt");
    rules::check_payload_if_found(
        &mut sink,
        root,
        "pdf_page_video_ts_path",
        field("pdf_page_video_ts_path"),
        PayloadKind::PageTimestamps,
    );

    let gemini = field("is_gemini_processed_video");
    rules::check_boolean(&mut sink, "is_gemini_processed_video", gemini);
    if gemini.is_true() {
        rules::check_payload_if_found(
            &mut sink,
            root,
            "path",
            field("path"),
            PayloadKind::Segments,
        );
    }

    sink.finish()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::formats::ViolationKind;

    struct Fixture {
        temp: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> anyhow::Result<Self> {
            let temp = tempfile::TempDir::new()?;
            std::fs::create_dir_all(temp.path().join("videos"))?;
            std::fs::write(
                temp.path().join("videos/lec1.srt"),
                "1\n00:00:00,000 --> 00:00:01,000\nhi\n",
            )?;
            std::fs::write(
                temp.path().join("videos/lec1_ts.json"),
                r#"[{"page": 1, "timestamps": [{"start": "00:00", "end": "00:10"}]}]"#,
            )?;
            std::fs::write(temp.path().join("videos/broken_ts.json"), r#"{"page": 1}"#)?;
            std::fs::write(
                temp.path().join("videos/lec1.json"),
                r#"{"language": "en", "video_segments": []}"#,
            )?;
            Ok(Self { temp })
        }

        fn validate(&self, lecture: Value) -> Vec<Violation> {
            let lecture = lecture.as_object().expect("lecture object").clone();
            validate(&lecture, &DocumentId::from("42"), 0, self.temp.path())
        }
    }

    fn complete_lecture() -> Value {
        json!({
            "title": "Lecture one",
            "is_gemini_processed_video": false,
            "original_link": "https://mediaspace.example.org/media/1",
            "path": null,
            "srt_path": "videos/lec1.srt",
            "pdf_page_video_ts_path": "videos/lec1_ts.json",
        })
    }

    #[test]
    fn complete_lecture_has_no_violations() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        assert_eq!(fixture.validate(complete_lecture()), Vec::new());
        Ok(())
    }

    #[test]
    fn absent_srt_path_only_reports_missing_key() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut lecture = complete_lecture();
        lecture.as_object_mut().expect("object").remove("srt_path");

        let violations = fixture.validate(lecture);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "associated_video_lectures[0].srt_path");
        assert_eq!(violations[0].message, "missing required key");
        Ok(())
    }

    #[test]
    fn null_values_satisfy_required_keys() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let lecture = json!({
            "title": null,
            "is_gemini_processed_video": null,
            "original_link": null,
            "path": null,
            "srt_path": null,
            "pdf_page_video_ts_path": null,
        });
        assert_eq!(fixture.validate(lecture), Vec::new());
        Ok(())
    }

    #[test]
    fn unresolved_paths_are_left_to_the_corpus_check() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut lecture = complete_lecture();
        lecture["srt_path"] = json!("videos/missing.srt");
        lecture["pdf_page_video_ts_path"] = json!("videos/none.json");

        assert_eq!(fixture.validate(lecture), Vec::new());
        Ok(())
    }

    #[test]
    fn srt_suffix_is_checked_without_the_file() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut lecture = complete_lecture();
        lecture["srt_path"] = json!("videos/missing.vtt");

        let violations = fixture.validate(lecture);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::Field);
        assert_eq!(violations[0].field, "associated_video_lectures[0].srt_path");
        Ok(())
    }

    #[test]
    fn malformed_timestamp_file_is_a_structure_violation() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut lecture = complete_lecture();
        lecture["pdf_page_video_ts_path"] = json!("videos/broken_ts.json");

        let violations = fixture.validate(lecture);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::Structure);
        assert_eq!(
            violations[0].field,
            "associated_video_lectures[0].pdf_page_video_ts_path"
        );
        Ok(())
    }

    #[test]
    fn title_and_link_rules_accumulate() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut lecture = complete_lecture();
        lecture["title"] = json!("lecture_one");
        lecture["original_link"] = json!("https://www.youtube.com/watch?v=1");

        let fields: Vec<_> = fixture
            .validate(lecture)
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "associated_video_lectures[0].title",
                "associated_video_lectures[0].original_link",
            ]
        );
        Ok(())
    }

    #[test]
    fn gemini_lecture_path_is_shape_checked() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut lecture = complete_lecture();
        lecture["is_gemini_processed_video"] = json!(true);
        lecture["path"] = json!("videos/lec1.json");

        let violations = fixture.validate(lecture.clone());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::Structure);
        assert_eq!(violations[0].field, "associated_video_lectures[0].path");
        assert!(
            violations[0]
                .message
                .contains("missing key 'general_description_en'")
        );

        lecture["is_gemini_processed_video"] = json!(false);
        assert_eq!(fixture.validate(lecture), Vec::new());
        Ok(())
    }

    #[test]
    fn gemini_flag_must_be_boolean() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut lecture = complete_lecture();
        lecture["is_gemini_processed_video"] = json!("yes");

        let violations = fixture.validate(lecture);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].field,
            "associated_video_lectures[0].is_gemini_processed_video"
        );
        Ok(())
    }
}
