//! Per-kind answer-draft logic: initial drafts, validation, interaction
//! helpers, and submission payload building.
//!
//! Everything here is pure; the lifecycle machine in `session` decides
//! when these operations are allowed.

use std::collections::HashMap;

use serde_json::{json, Value};
use thiserror::Error;

use crate::api::ApiError;
use crate::exercises::models::{
    AnswerDraft, AnswerSubmission, AssociationExercise, ExerciseKind, SentenceMode,
};
use crate::progress::ProgressError;

#[derive(Debug, Error)]
pub enum ExerciseError {
    #[error("atom content is not an interactive exercise")]
    UnsupportedContent,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error("reset failed: {0}")]
    Reset(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, ExerciseError>;

/// The draft a session starts from (and returns to after a reset).
pub fn initial_draft(kind: &ExerciseKind) -> AnswerDraft {
    match kind {
        ExerciseKind::Qcm(_) => AnswerDraft::Selection { selected: None },
        ExerciseKind::FillInBlank(exercise) => AnswerDraft::Blanks {
            values: vec![String::new(); exercise.blank_count()],
        },
        // The server-scrambled order is the starting point
        ExerciseKind::Reorder(exercise) => AnswerDraft::Ordering {
            order: exercise.items.clone(),
        },
        ExerciseKind::Association(exercise) => AnswerDraft::Bindings {
            placed: vec![None; exercise.pairs.len()],
        },
        ExerciseKind::SentenceConstruction(exercise) => match &exercise.mode {
            SentenceMode::Choice(_) => AnswerDraft::Selection { selected: None },
            SentenceMode::WordOrder(words) => AnswerDraft::Ordering {
                order: words.clone(),
            },
        },
        ExerciseKind::Writing(_) => AnswerDraft::FreeText {
            text: String::new(),
        },
    }
}

/// Check that a draft is complete enough to submit. Failures stay local;
/// nothing invalid is ever sent to the server.
pub fn validate(kind: &ExerciseKind, draft: &AnswerDraft) -> Result<()> {
    match (kind, draft) {
        (ExerciseKind::Qcm(exercise), AnswerDraft::Selection { selected }) => {
            let text = selected
                .as_deref()
                .ok_or_else(|| ExerciseError::Validation("no option selected".to_string()))?;
            if exercise.option_index(text).is_none() {
                return Err(ExerciseError::Validation(
                    "selected option is not offered".to_string(),
                ));
            }
            Ok(())
        }
        (ExerciseKind::FillInBlank(exercise), AnswerDraft::Blanks { values }) => {
            if values.len() != exercise.blank_count() {
                return Err(ExerciseError::Validation(format!(
                    "expected {} blanks, draft has {}",
                    exercise.blank_count(),
                    values.len()
                )));
            }
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(ExerciseError::Validation(
                    "all blanks must be filled".to_string(),
                ));
            }
            Ok(())
        }
        (ExerciseKind::Reorder(exercise), AnswerDraft::Ordering { order }) => {
            if !same_items(order, &exercise.items) {
                return Err(ExerciseError::Validation(
                    "order must contain exactly the given items".to_string(),
                ));
            }
            Ok(())
        }
        (ExerciseKind::Association(exercise), AnswerDraft::Bindings { placed }) => {
            if placed.len() != exercise.pairs.len() || placed.iter().any(Option::is_none) {
                return Err(ExerciseError::Validation(
                    "every prompt needs an answer".to_string(),
                ));
            }
            Ok(())
        }
        (ExerciseKind::SentenceConstruction(exercise), draft) => match (&exercise.mode, draft) {
            (SentenceMode::Choice(choices), AnswerDraft::Selection { selected }) => {
                let text = selected
                    .as_deref()
                    .ok_or_else(|| ExerciseError::Validation("no option selected".to_string()))?;
                if !choices.iter().any(|c| c == text) {
                    return Err(ExerciseError::Validation(
                        "selected option is not offered".to_string(),
                    ));
                }
                Ok(())
            }
            (SentenceMode::WordOrder(words), AnswerDraft::Ordering { order }) => {
                if !same_items(order, words) {
                    return Err(ExerciseError::Validation(
                        "order must contain exactly the given words".to_string(),
                    ));
                }
                Ok(())
            }
            _ => Err(draft_mismatch()),
        },
        (ExerciseKind::Writing(_), AnswerDraft::FreeText { text }) => {
            if text.trim().is_empty() {
                return Err(ExerciseError::Validation("text is empty".to_string()));
            }
            Ok(())
        }
        _ => Err(draft_mismatch()),
    }
}

/// Build the POST body for a validated draft.
///
/// Selections are mapped from option text to index here, at submit time;
/// duplicate option text resolves to the first match.
pub fn build_submission(
    atom_id: &str,
    kind: &ExerciseKind,
    draft: &AnswerDraft,
) -> Result<AnswerSubmission> {
    validate(kind, draft)?;

    let user_answer_json = match (kind, draft) {
        (ExerciseKind::Qcm(exercise), AnswerDraft::Selection { selected }) => {
            let index = selected
                .as_deref()
                .and_then(|text| exercise.option_index(text))
                .ok_or_else(draft_mismatch)?;
            json!({ "selected_option": index })
        }
        (ExerciseKind::FillInBlank(_), AnswerDraft::Blanks { values }) => {
            json!({ "answers": values })
        }
        (ExerciseKind::Reorder(_), AnswerDraft::Ordering { order }) => {
            json!({ "order": order })
        }
        (ExerciseKind::Association(exercise), AnswerDraft::Bindings { placed }) => {
            let pairs: Vec<Value> = exercise
                .pairs
                .iter()
                .zip(placed.iter())
                .filter_map(|(pair, answer)| {
                    answer
                        .as_ref()
                        .map(|a| json!({ "prompt": pair.prompt, "answer": a }))
                })
                .collect();
            json!({ "pairs": pairs })
        }
        (ExerciseKind::SentenceConstruction(exercise), draft) => match (&exercise.mode, draft) {
            (SentenceMode::Choice(choices), AnswerDraft::Selection { selected }) => {
                let index = selected
                    .as_deref()
                    .and_then(|text| choices.iter().position(|c| c == text))
                    .ok_or_else(draft_mismatch)?;
                json!({ "selected_option": index })
            }
            (SentenceMode::WordOrder(_), AnswerDraft::Ordering { order }) => {
                json!({ "words": order })
            }
            _ => return Err(draft_mismatch()),
        },
        (ExerciseKind::Writing(_), AnswerDraft::FreeText { text }) => {
            json!({ "text": text })
        }
        _ => return Err(draft_mismatch()),
    };

    Ok(AnswerSubmission::new(atom_id, user_answer_json))
}

// ==================== Interaction helpers ====================

/// Move one item within an ordering draft. Out-of-range indices are
/// rejected.
pub fn move_item(draft: &mut AnswerDraft, from: usize, to: usize) -> bool {
    let AnswerDraft::Ordering { order } = draft else {
        return false;
    };
    if from >= order.len() || to >= order.len() {
        return false;
    }
    let item = order.remove(from);
    order.insert(to, item);
    true
}

/// Place an answer chip on a prompt slot.
///
/// Fails when the slot is occupied (one answer per prompt) or the chip is
/// no longer in the available pool.
pub fn place_answer(
    exercise: &AssociationExercise,
    draft: &mut AnswerDraft,
    prompt_index: usize,
    answer: &str,
) -> bool {
    if !available_pool(exercise, draft).contains(&answer) {
        return false;
    }
    let AnswerDraft::Bindings { placed } = draft else {
        return false;
    };
    match placed.get_mut(prompt_index) {
        Some(slot @ None) => {
            *slot = Some(answer.to_string());
            true
        }
        _ => false,
    }
}

/// Return a placed chip to the pool.
pub fn clear_binding(draft: &mut AnswerDraft, prompt_index: usize) -> bool {
    let AnswerDraft::Bindings { placed } = draft else {
        return false;
    };
    match placed.get_mut(prompt_index) {
        Some(slot @ Some(_)) => {
            *slot = None;
            true
        }
        _ => false,
    }
}

/// Answer chips still available for placement. Placed chips are removed
/// one occurrence at a time, so duplicate answers in the pool survive
/// until each copy is used.
pub fn available_pool<'a>(exercise: &'a AssociationExercise, draft: &AnswerDraft) -> Vec<&'a str> {
    let AnswerDraft::Bindings { placed } = draft else {
        return Vec::new();
    };

    let mut used: HashMap<&str, usize> = HashMap::new();
    for answer in placed.iter().flatten() {
        *used.entry(answer.as_str()).or_insert(0) += 1;
    }

    exercise
        .pool()
        .into_iter()
        .filter(|text| match used.get_mut(*text) {
            Some(n) if *n > 0 => {
                *n -= 1;
                false
            }
            _ => true,
        })
        .collect()
}

fn draft_mismatch() -> ExerciseError {
    ExerciseError::Validation("answer draft does not match the exercise".to_string())
}

/// Same multiset of items, any order.
fn same_items(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut x: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut y: Vec<&str> = b.iter().map(String::as_str).collect();
    x.sort_unstable();
    y.sort_unstable();
    x == y
}
