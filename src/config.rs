use anyhow::Context as _;
use clap::ValueEnum;

pub const RULES_ENV: &str = "COURSECHECK_RULES";

pub const MODELS: &[&str] = &["gpt-4o", "gemini-1.5-pro"];

pub const PROCESSING_METHODS: &[&str] = &["pymupdf", "mathpix", "gemini"];

pub const KNOWN_PLATFORMS: &[&str] = &["mediaspace", "coursera", "courseware", "edx"];

pub const LECTURE_LINK_PLATFORM: &str = "mediaspace";

const LECTURE_LINK_PLATFORMS: &[&str] = &[LECTURE_LINK_PLATFORM];

/// Decides when a `subtype == "video_lecture"` record must look like a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VideoLectureGate {
    /// Every `video_lecture` record.
    SubtypeOnly,
    /// `video_lecture` records unless `is_qa` is true.
    ExemptQa,
}

/// Decides which records get their `original_link` checked, and against what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OriginalLinkCheck {
    /// Any non-null link must mention `mediaspace`.
    MediaspaceAlways,
    /// Only links on `is_video` records, against every known platform.
    KnownPlatformsForVideos,
}

impl OriginalLinkCheck {
    pub fn platforms(&self) -> &'static [&'static str] {
        match self {
            Self::MediaspaceAlways => LECTURE_LINK_PLATFORMS,
            Self::KnownPlatformsForVideos => KNOWN_PLATFORMS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RuleSetVersion {
    /// Subtype-only video gate, mediaspace link check on every record.
    V1,
    /// `is_qa` exemption, platform link check on video records only.
    #[default]
    V2,
}

impl RuleSetVersion {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        <Self as ValueEnum>::from_str(raw.trim(), true)
            .map_err(|err| anyhow::anyhow!("unknown rule set '{raw}': {err}"))
    }
}

/// Conditional-rule policies in effect for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    pub version: RuleSetVersion,
    pub video_lecture_gate: VideoLectureGate,
    pub original_link_check: OriginalLinkCheck,
}

impl RuleSet {
    pub fn for_version(version: RuleSetVersion) -> Self {
        match version {
            RuleSetVersion::V1 => Self {
                version,
                video_lecture_gate: VideoLectureGate::SubtypeOnly,
                original_link_check: OriginalLinkCheck::MediaspaceAlways,
            },
            RuleSetVersion::V2 => Self {
                version,
                video_lecture_gate: VideoLectureGate::ExemptQa,
                original_link_check: OriginalLinkCheck::KnownPlatformsForVideos,
            },
        }
    }

    /// Flags win over `COURSECHECK_RULES`, which wins over the default version;
    /// individual policy flags override whatever version was picked.
    pub fn resolve(
        version: Option<RuleSetVersion>,
        video_lecture_gate: Option<VideoLectureGate>,
        original_link_check: Option<OriginalLinkCheck>,
    ) -> anyhow::Result<Self> {
        let version = match version {
            Some(version) => version,
            None => match std::env::var(RULES_ENV) {
                Ok(raw) if !raw.trim().is_empty() => {
                    RuleSetVersion::parse(&raw).with_context(|| format!("read {RULES_ENV}"))?
                }
                _ => RuleSetVersion::default(),
            },
        };

        let mut rules = Self::for_version(version);
        if let Some(gate) = video_lecture_gate {
            rules.video_lecture_gate = gate;
        }
        if let Some(check) = original_link_check {
            rules.original_link_check = check;
        }
        Ok(rules)
    }

    pub fn describe(&self) -> String {
        format!(
            "{} (video-lecture-gate={}, original-link-check={})",
            value_name(&self.version),
            value_name(&self.video_lecture_gate),
            value_name(&self.original_link_check)
        )
    }
}

fn value_name(value: &impl ValueEnum) -> String {
    value
        .to_possible_value()
        .map(|value| value.get_name().to_owned())
        .unwrap_or_default()
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::for_version(RuleSetVersion::default())
    }
}
