//! Canonical learning-content entities.
//!
//! The capsule tree: a capsule (course) contains granules (levels), a
//! granule contains molecules (lesson units), a molecule contains atoms
//! (the smallest content unit — a lesson, quiz, or interactive exercise).
//! All records here are plain values produced by `catalog::normalize`;
//! composition is by embedding for rendering plus `*_id` backreferences.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::progress::ProgressStatus;

/// XP goal applied when the backend sends none (or zero).
pub const DEFAULT_XP_TARGET: i64 = 6000;

/// What kind of content an atom carries.
///
/// Parsed from the backend's `content_type` string; unknown kinds are kept
/// verbatim in `Other` instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    Lesson,
    Quiz,
    FillInBlank,
    Reorder,
    Association,
    SentenceConstruction,
    Writing,
    CharacterRecognition,
    CodeExample,
    CodeChallenge,
    LiveCodeExecutor,
    CodeSandboxSetup,
    CodeProjectBrief,
    Other(String),
}

impl Default for ContentType {
    fn default() -> Self {
        Self::Lesson
    }
}

impl ContentType {
    /// Map a backend content-type string onto a known kind.
    ///
    /// Case, underscores, hyphens, and spaces are ignored; a handful of
    /// historical aliases map onto their current names. Unrecognized
    /// strings survive as [`ContentType::Other`].
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "lesson" | "reading" => Self::Lesson,
            "quiz" | "qcm" | "multiplechoice" | "mcq" => Self::Quiz,
            "fillinblank" | "fillintheblank" | "cloze" | "gapfill" => Self::FillInBlank,
            "reorder" | "ordering" => Self::Reorder,
            "association" | "matching" | "dragdrop" => Self::Association,
            "sentenceconstruction" | "sentencebuilder" => Self::SentenceConstruction,
            "writing" | "freetext" => Self::Writing,
            "characterrecognition" => Self::CharacterRecognition,
            "codeexample" => Self::CodeExample,
            "codechallenge" => Self::CodeChallenge,
            "livecodeexecutor" => Self::LiveCodeExecutor,
            "codesandboxsetup" => Self::CodeSandboxSetup,
            "codeprojectbrief" => Self::CodeProjectBrief,
            _ if key.is_empty() => Self::Lesson,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Canonical wire name.
    pub fn name(&self) -> &str {
        match self {
            Self::Lesson => "lesson",
            Self::Quiz => "quiz",
            Self::FillInBlank => "fill_in_blank",
            Self::Reorder => "reorder",
            Self::Association => "association",
            Self::SentenceConstruction => "sentence_construction",
            Self::Writing => "writing",
            Self::CharacterRecognition => "character_recognition",
            Self::CodeExample => "code_example",
            Self::CodeChallenge => "code_challenge",
            Self::LiveCodeExecutor => "live_code_executor",
            Self::CodeSandboxSetup => "code_sandbox_setup",
            Self::CodeProjectBrief => "code_project_brief",
            Self::Other(raw) => raw,
        }
    }

    /// Whether answers to this kind receive a correct/incorrect verdict.
    ///
    /// Ungraded kinds (lessons, writing, code walkthroughs) can never end
    /// up `failed`.
    pub fn is_graded(&self) -> bool {
        matches!(
            self,
            Self::Quiz
                | Self::FillInBlank
                | Self::Reorder
                | Self::Association
                | Self::SentenceConstruction
                | Self::CharacterRecognition
                | Self::CodeChallenge
        )
    }
}

impl From<String> for ContentType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ContentType> for String {
    fn from(ct: ContentType) -> Self {
        ct.name().to_string()
    }
}

/// Backend-side atom generation state for a molecule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    Completed,
    Failed,
}

impl Default for GenerationStatus {
    fn default() -> Self {
        Self::Completed
    }
}

impl GenerationStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "pending" | "processing" | "generating" | "inprogress" | "queued" => {
                Some(Self::Pending)
            }
            "completed" | "complete" | "done" | "ready" => Some(Self::Completed),
            "failed" | "failure" | "error" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Top-level learning unit (a course).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capsule {
    pub id: String,
    pub title: String,
    pub description: String,
    pub domain: String,
    pub area: String,
    pub main_skill: String,
    pub level_count: u32,
    pub atom_count: u32,
    pub lesson_count: u32,
    pub xp_target: i64,
    pub xp_current: i64,
    /// Derived: `min(100, xp_current / xp_target * 100)` unless the server
    /// supplied an explicit percentage. Always within `[0, 100]`.
    pub progress_percentage: f64,
    pub progress_status: ProgressStatus,
    pub is_locked: bool,
    pub is_enrolled: bool,
    /// Set semantics with insertion order: first occurrence wins.
    pub tags: Vec<String>,
    pub granules: Vec<Granule>,
    /// Original payload, kept for fields not yet modeled.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl Default for Capsule {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            domain: String::new(),
            area: String::new(),
            main_skill: String::new(),
            level_count: 0,
            atom_count: 0,
            lesson_count: 0,
            xp_target: DEFAULT_XP_TARGET,
            xp_current: 0,
            progress_percentage: 0.0,
            progress_status: ProgressStatus::NotStarted,
            is_locked: false,
            is_enrolled: false,
            tags: Vec::new(),
            granules: Vec::new(),
            raw: Value::Null,
        }
    }
}

/// A level within a capsule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Granule {
    pub id: String,
    /// Sort key; ties keep input order.
    pub order: f64,
    pub title: String,
    pub molecules: Vec<Molecule>,
}

/// A lesson unit within a granule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Molecule {
    pub id: String,
    pub order: f64,
    pub atom_count: u32,
    pub generation_status: GenerationStatus,
    pub progress_status: ProgressStatus,
    pub atoms: Vec<Atom>,
}

/// The smallest content unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Atom {
    pub id: String,
    pub order: f64,
    pub content_type: ContentType,
    /// Kind-specific payload (lesson body, exercise definition, ...).
    pub content: Value,
    pub progress_status: ProgressStatus,
    pub reward_xp: i64,
    pub is_bonus: bool,
    pub is_locked: bool,
    pub capsule_id: String,
    pub molecule_id: String,
}

/// Result of fetching a molecule's atoms, including the 202
/// generation-pending case where no atoms exist yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomBatch {
    pub atoms: Vec<Atom>,
    pub generation_status: GenerationStatus,
    pub progress_status: ProgressStatus,
}

impl AtomBatch {
    /// Batch for a molecule whose atoms are still being generated.
    pub fn pending() -> Self {
        Self {
            atoms: Vec::new(),
            generation_status: GenerationStatus::Pending,
            progress_status: ProgressStatus::InProgress,
        }
    }
}
