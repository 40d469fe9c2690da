//! Exercise definitions and answer payloads.
//!
//! An atom's `content` value is probed once at load time and resolved into
//! an [`ExerciseKind`] carrying everything the interaction needs. The kind
//! never changes during a session; payload shape is not re-evaluated while
//! the user works.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::{Atom, ContentType};
use crate::normalize::{non_blank, pick, pick_bool, pick_string, unwrap_collection};

// ==================== Exercise definitions ====================

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq)]
pub struct QcmExercise {
    pub question: String,
    pub options: Vec<String>,
}

impl QcmExercise {
    /// Index of the first option with this exact text.
    ///
    /// Duplicate option text resolves to the first match. That ambiguity
    /// is inherited from the submission format, which carries an index.
    pub fn option_index(&self, text: &str) -> Option<usize> {
        self.options.iter().position(|o| o == text)
    }
}

/// A prompt with ordered free-text blanks.
#[derive(Debug, Clone, PartialEq)]
pub struct FillInBlankExercise {
    pub prompt: String,
    /// Correct answers in blank order. Their count defines how many
    /// blanks the user fills, regardless of markers in the prompt.
    pub answers: Vec<String>,
}

impl FillInBlankExercise {
    pub fn blank_count(&self) -> usize {
        self.answers.len()
    }

    /// Count `___` style markers in the prompt (`___2___` counts once).
    ///
    /// May disagree with [`blank_count`](Self::blank_count) on malformed
    /// content; the answer list wins and the mismatch is tolerated.
    pub fn marker_count(&self) -> usize {
        static MARKER: OnceLock<Regex> = OnceLock::new();
        MARKER
            .get_or_init(|| Regex::new(r"_{3,}(?:\d+_{3,})?").expect("marker pattern compiles"))
            .find_iter(&self.prompt)
            .count()
    }
}

/// A permutable list, delivered in server-scrambled order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderExercise {
    pub prompt: String,
    pub items: Vec<String>,
}

/// One prompt→answer pairing in an association exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationPair {
    pub prompt: String,
    pub answer: String,
}

/// Match prompts to answer chips drawn from a shared pool.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationExercise {
    pub instruction: String,
    pub pairs: Vec<AssociationPair>,
}

impl AssociationExercise {
    pub fn prompts(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.prompt.as_str()).collect()
    }

    /// The full answer pool, in payload order.
    pub fn pool(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.answer.as_str()).collect()
    }
}

/// How a sentence-construction atom behaves, fixed at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum SentenceMode {
    /// A `choices` array was present: behaves as multiple choice.
    Choice(Vec<String>),
    /// No choices: the user orders the given words.
    WordOrder(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentenceConstructionExercise {
    pub prompt: String,
    pub mode: SentenceMode,
}

/// Free-form text, never auto-graded.
#[derive(Debug, Clone, PartialEq)]
pub struct WritingExercise {
    pub prompt: String,
}

/// The exercise an atom resolves to, decided once per load.
#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseKind {
    Qcm(QcmExercise),
    FillInBlank(FillInBlankExercise),
    Reorder(ReorderExercise),
    Association(AssociationExercise),
    SentenceConstruction(SentenceConstructionExercise),
    Writing(WritingExercise),
}

impl ExerciseKind {
    /// Resolve an atom's content into an exercise.
    ///
    /// Returns `None` for non-interactive content (lessons, code
    /// walkthroughs). Character-recognition atoms resolve by shape:
    /// multiple choice when options exist, free input otherwise.
    pub fn from_atom(atom: &Atom) -> Option<Self> {
        Self::resolve(&atom.content_type, &atom.content)
    }

    pub fn resolve(content_type: &ContentType, content: &Value) -> Option<Self> {
        match content_type {
            ContentType::Quiz => Some(Self::Qcm(parse_qcm(content))),
            ContentType::FillInBlank => Some(Self::FillInBlank(parse_fill_in_blank(content))),
            ContentType::Reorder => Some(Self::Reorder(parse_reorder(content))),
            ContentType::Association => Some(Self::Association(parse_association(content))),
            ContentType::SentenceConstruction => Some(Self::SentenceConstruction(
                parse_sentence_construction(content),
            )),
            ContentType::Writing => Some(Self::Writing(parse_writing(content))),
            ContentType::CharacterRecognition => {
                let qcm = parse_qcm(content);
                if qcm.options.is_empty() {
                    Some(Self::Writing(parse_writing(content)))
                } else {
                    Some(Self::Qcm(qcm))
                }
            }
            _ => None,
        }
    }
}

// ==================== Payload parsing ====================

fn parse_qcm(content: &Value) -> QcmExercise {
    QcmExercise {
        question: pick_string(content, &["question", "prompt", "text", "title"])
            .unwrap_or_default(),
        options: string_list(content, &["options", "choices", "answers"]),
    }
}

fn parse_fill_in_blank(content: &Value) -> FillInBlankExercise {
    FillInBlankExercise {
        prompt: pick_string(content, &["prompt", "text", "sentence", "question"])
            .unwrap_or_default(),
        answers: string_list(content, &["answers", "correct_answers", "blanks", "solutions"]),
    }
}

fn parse_reorder(content: &Value) -> ReorderExercise {
    ReorderExercise {
        prompt: pick_string(content, &["prompt", "text", "question", "instruction"])
            .unwrap_or_default(),
        items: string_list(content, &["items", "elements", "options", "segments"]),
    }
}

fn parse_association(content: &Value) -> AssociationExercise {
    let pairs_raw = pick(content, &["pairs", "associations", "matches"]).unwrap_or(&Value::Null);
    let pairs = unwrap_collection(pairs_raw, &["pairs"])
        .iter()
        .filter_map(|entry| {
            let prompt = pick_string(entry, &["left", "prompt", "source", "term"])?;
            let answer = pick_string(entry, &["right", "answer", "target", "definition"])?;
            Some(AssociationPair { prompt, answer })
        })
        .collect();

    AssociationExercise {
        instruction: pick_string(content, &["instruction", "prompt", "text", "question"])
            .unwrap_or_default(),
        pairs,
    }
}

fn parse_sentence_construction(content: &Value) -> SentenceConstructionExercise {
    let prompt = pick_string(content, &["prompt", "text", "question", "translation"])
        .unwrap_or_default();

    // Mode is fixed here and never re-evaluated during interaction
    let choices = pick(content, &["choices"])
        .map(|v| item_texts(unwrap_collection(v, &["choices"])))
        .unwrap_or_default();

    let mode = if choices.is_empty() {
        SentenceMode::WordOrder(string_list(content, &["words", "tokens", "segments", "items"]))
    } else {
        SentenceMode::Choice(choices)
    };

    SentenceConstructionExercise { prompt, mode }
}

fn parse_writing(content: &Value) -> WritingExercise {
    WritingExercise {
        prompt: pick_string(content, &["prompt", "question", "text", "instruction"])
            .unwrap_or_default(),
    }
}

/// Resolve a list field whose entries are strings or labeled objects.
fn string_list(content: &Value, keys: &[&str]) -> Vec<String> {
    pick(content, keys)
        .map(|v| item_texts(unwrap_collection(v, keys)))
        .unwrap_or_default()
}

fn item_texts(items: &[Value]) -> Vec<String> {
    items.iter().filter_map(item_text).collect()
}

/// Text of one list entry: a bare string, a number, or an object with a
/// conventional label key.
fn item_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => pick_string(value, &["label", "text", "value", "title", "answer"]),
        _ => None,
    }
}

// ==================== Answers ====================

/// The user's in-progress answer. Shape follows the exercise kind;
/// sentence construction uses `Selection` or `Ordering` per its mode.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerDraft {
    /// Selected option text, if any.
    Selection { selected: Option<String> },
    /// One value per blank, in blank order.
    Blanks { values: Vec<String> },
    /// Current item order.
    Ordering { order: Vec<String> },
    /// Placed answer per prompt, index-parallel to the pair list.
    Bindings { placed: Vec<Option<String>> },
    /// Free text.
    FreeText { text: String },
}

/// Server ruling on a submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_correct: bool,
    pub feedback: String,
}

/// Normalize a verdict payload; unrecognized shapes read as incorrect
/// with no feedback.
pub fn normalize_verdict(raw: &Value) -> Verdict {
    Verdict {
        is_correct: pick_bool(raw, &["is_correct", "isCorrect", "correct", "success"])
            .unwrap_or(false),
        feedback: pick_string(raw, &["feedback", "message", "explanation", "detail"])
            .unwrap_or_default(),
    }
}

/// Body of an answer POST. All exercise kinds share this envelope; the
/// atom id is sent under both its current and legacy field names so
/// either API generation accepts it.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerSubmission {
    pub component_id: String,
    pub atom_id: String,
    pub user_answer_json: Value,
}

impl AnswerSubmission {
    pub fn new(atom_id: &str, user_answer_json: Value) -> Self {
        Self {
            component_id: atom_id.to_string(),
            atom_id: atom_id.to_string(),
            user_answer_json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_qcm_from_quiz_atom() {
        let kind = ExerciseKind::resolve(
            &ContentType::Quiz,
            &json!({ "question": "2+2?", "options": ["3", "4"] }),
        )
        .unwrap();
        match kind {
            ExerciseKind::Qcm(qcm) => {
                assert_eq!(qcm.question, "2+2?");
                assert_eq!(qcm.options, vec!["3", "4"]);
            }
            other => panic!("expected qcm, got {:?}", other),
        }
    }

    #[test]
    fn test_qcm_duplicate_option_text_resolves_first_match() {
        let qcm = QcmExercise {
            question: String::new(),
            options: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(qcm.option_index("a"), Some(0));
        assert_eq!(qcm.option_index("b"), Some(1));
        assert_eq!(qcm.option_index("c"), None);
    }

    #[test]
    fn test_qcm_options_accept_labeled_objects() {
        let kind = ExerciseKind::resolve(
            &ContentType::Quiz,
            &json!({ "prompt": "pick", "choices": [{ "label": "x" }, { "text": "y" }] }),
        )
        .unwrap();
        match kind {
            ExerciseKind::Qcm(qcm) => assert_eq!(qcm.options, vec!["x", "y"]),
            other => panic!("expected qcm, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_count_follows_answers_not_markers() {
        let exercise = parse_fill_in_blank(&json!({
            "sentence": "The ___1___ sat on the ___2___ near the ___3___.",
            "answers": ["cat", "mat"],
        }));
        assert_eq!(exercise.blank_count(), 2);
        assert_eq!(exercise.marker_count(), 3);

        // Unnumbered marker runs count once each
        let plain = parse_fill_in_blank(&json!({
            "sentence": "___ and ____",
            "answers": ["a"],
        }));
        assert_eq!(plain.marker_count(), 2);
    }

    #[test]
    fn test_fill_in_blank_object_answers() {
        let exercise = parse_fill_in_blank(&json!({
            "prompt": "___ and ___",
            "blanks": [{ "answer": "salt" }, { "answer": "pepper" }],
        }));
        assert_eq!(exercise.answers, vec!["salt", "pepper"]);
    }

    #[test]
    fn test_association_pairs_from_left_right() {
        let exercise = parse_association(&json!({
            "instruction": "match",
            "pairs": [
                { "left": "dog", "right": "chien" },
                { "left": "cat", "right": "chat" },
            ],
        }));
        assert_eq!(exercise.pairs.len(), 2);
        assert_eq!(exercise.prompts(), vec!["dog", "cat"]);
        assert_eq!(exercise.pool(), vec!["chien", "chat"]);
    }

    #[test]
    fn test_sentence_mode_decided_by_choices_presence() {
        let choice = parse_sentence_construction(&json!({
            "prompt": "Translate",
            "choices": ["Je mange", "Tu manges"],
            "words": ["ignored"],
        }));
        assert!(matches!(choice.mode, SentenceMode::Choice(ref c) if c.len() == 2));

        let words = parse_sentence_construction(&json!({
            "prompt": "Build the sentence",
            "words": ["je", "mange", "une", "pomme"],
        }));
        assert!(matches!(words.mode, SentenceMode::WordOrder(ref w) if w.len() == 4));
    }

    #[test]
    fn test_character_recognition_resolves_by_shape() {
        let with_options = ExerciseKind::resolve(
            &ContentType::CharacterRecognition,
            &json!({ "question": "水", "options": ["water", "fire"] }),
        )
        .unwrap();
        assert!(matches!(with_options, ExerciseKind::Qcm(_)));

        let free_input = ExerciseKind::resolve(
            &ContentType::CharacterRecognition,
            &json!({ "prompt": "Write the reading of 水" }),
        )
        .unwrap();
        assert!(matches!(free_input, ExerciseKind::Writing(_)));
    }

    #[test]
    fn test_non_interactive_content_resolves_to_none() {
        assert!(ExerciseKind::resolve(&ContentType::Lesson, &json!({})).is_none());
        assert!(ExerciseKind::resolve(&ContentType::CodeExample, &json!({})).is_none());
    }

    #[test]
    fn test_normalize_verdict_defaults() {
        let verdict = normalize_verdict(&json!({}));
        assert!(!verdict.is_correct);
        assert_eq!(verdict.feedback, "");

        let verdict = normalize_verdict(&json!({ "correct": true, "message": "bien!" }));
        assert!(verdict.is_correct);
        assert_eq!(verdict.feedback, "bien!");
    }

    #[test]
    fn test_submission_carries_both_id_fields() {
        let submission = AnswerSubmission::new("a1", json!({ "selected_option": 1 }));
        let body = serde_json::to_value(&submission).unwrap();
        assert_eq!(body["component_id"], "a1");
        assert_eq!(body["atom_id"], "a1");
        assert_eq!(body["user_answer_json"]["selected_option"], 1);
    }
}
