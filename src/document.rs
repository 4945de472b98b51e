use std::path::Path;

use serde_json::{Map, Value};

use crate::config::{MODELS, OriginalLinkCheck, PROCESSING_METHODS, RuleSet, VideoLectureGate};
use crate::formats::{DocumentId, FieldValue, Violation, ViolationSink, describe};
use crate::lecture;
use crate::payload::PayloadKind;
use crate::rules::{self, Vocabulary};

pub const VIDEO_LECTURE_SUBTYPE: &str = "video_lecture";
pub const BOOK_IN_BIBLIOGRAPHY_SUBTYPE: &str = "book_in_bibliography";

/// Category attributes, split into open tags and closed enumerations.
pub const CATEGORY_FIELDS: &[(&str, Vocabulary)] = &[
    ("type", Vocabulary::FreeForm),
    ("subtype", Vocabulary::FreeForm),
    ("model", Vocabulary::OneOf(MODELS)),
    ("processing_method", Vocabulary::OneOf(PROCESSING_METHODS)),
];

/// Runs every rule against one document and returns the violations in rule
/// order, followed by those of each associated video lecture.
pub fn validate(document: &Map<String, Value>, root: &Path, rules: &RuleSet) -> Vec<Violation> {
    let document_id = DocumentId::from_record(document);
    let mut sink = ViolationSink::new(&document_id);
    let field = |key: &str| FieldValue::of(document, key);

    rules::check_integer(&mut sink, "week", field("week"));
    rules::check_string(&mut sink, "number", field("number"));
    rules::check_string(&mut sink, "sub_number", field("sub_number"));
    for (name, vocabulary) in CATEGORY_FIELDS {
        rules::check_vocabulary(&mut sink, name, field(*name), *vocabulary);
    }
    rules::check_date(&mut sink, "from", field("from"));
    rules::check_date(&mut sink, "until", field("until"));
    rules::check_false(&mut sink, "tikz", field("tikz"), "must be false");
    rules::check_no_underscore(&mut sink, "title", field("title"));
    rules::check_suffix(&mut sink, "srt_path", field("srt_path"), ".srt");

    let subtype = field("subtype").as_str();

    if subtype == Some(VIDEO_LECTURE_SUBTYPE) && video_lecture_gate_applies(document, rules) {
        rules::check_suffix(&mut sink, "path", field("path"), ".json");
        if !field("is_video").is_true() {
            sink.field(
                "is_video",
                format!("must be true when subtype is '{VIDEO_LECTURE_SUBTYPE}'"),
            );
        }
    }

    if subtype == Some(BOOK_IN_BIBLIOGRAPHY_SUBTYPE) {
        let message = format!("must be false when subtype is '{BOOK_IN_BIBLIOGRAPHY_SUBTYPE}'");
        for flag in ["one_chunk_per_page", "one_chunk_per_doc"] {
            rules::check_false(&mut sink, flag, field(flag), &message);
        }
    }

    let check = rules.original_link_check;
    let link_applies = match check {
        OriginalLinkCheck::MediaspaceAlways => true,
        OriginalLinkCheck::KnownPlatformsForVideos => field("is_video").is_true(),
    };
    if link_applies {
        rules::check_contains_any(
            &mut sink,
            "original_link",
            field("original_link"),
            check.platforms(),
        );
    }

    if field("is_gemini_processed_video").is_true() {
        if !field("is_video").is_true() {
            sink.field(
                "is_video",
                "must be true when is_gemini_processed_video is true",
            );
        }
        rules::check_payload_if_found(
            &mut sink,
            root,
            "path",
            field("path"),
            PayloadKind::Segments,
        );
    }

    rules::check_payload_if_found(
        &mut sink,
        root,
        "pdf_page_video_ts_path",
        field("pdf_page_video_ts_path"),
        PayloadKind::PageTimestamps,
    );

    if let Some(lectures) = field(lecture::FIELD).value() {
        match lectures.as_array() {
            Some(lectures) => {
                for (index, entry) in lectures.iter().enumerate() {
                    match entry.as_object() {
                        Some(entry) => {
                            sink.extend(lecture::validate(entry, &document_id, index, root));
                        }
                        None => sink.field(
                            &format!("{}[{index}]", lecture::FIELD),
                            format!("must be an object, got {}", describe(entry)),
                        ),
                    }
                }
            }
            None => sink.field(
                lecture::FIELD,
                format!("must be a list, got {}", describe(lectures)),
            ),
        }
    }

    sink.finish()
}

fn video_lecture_gate_applies(document: &Map<String, Value>, rules: &RuleSet) -> bool {
    match rules.video_lecture_gate {
        VideoLectureGate::SubtypeOnly => true,
        VideoLectureGate::ExemptQa => !FieldValue::of(document, "is_qa").is_true(),
    }
}
