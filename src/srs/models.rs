//! Spaced-repetition review entities.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{
    pick, pick_id, pick_number, pick_string, to_iso_string, unwrap_collection,
};

/// One reviewable card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsItem {
    pub id: String,
    pub prompt: String,
    pub answer: String,
    pub hint: String,
    pub due_at: Option<String>,
    pub due_in_seconds: Option<i64>,
    pub capsule_id: Option<String>,
    pub molecule_id: Option<String>,
}

/// Server-side review session state, replaced wholesale by every
/// start/review response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsSession {
    pub session_id: String,
    /// Card currently up for review, if any.
    pub item: Option<SrsItem>,
    /// Upcoming cards, informational only. The server owns ordering.
    pub queue: Vec<SrsItem>,
    pub remaining: u32,
}

impl SrsSession {
    /// A session is done when the server has nothing left to show.
    pub fn is_finished(&self) -> bool {
        self.remaining == 0 && self.item.is_none()
    }
}

/// How the user rated a revealed card. The four-step scale is passed to
/// the server as-is; all spacing math happens there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRating {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewRating {
    /// Wire value (1..=4).
    pub fn as_grade(&self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    pub fn from_grade(grade: u8) -> Option<Self> {
        match grade {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }
}

/// Body of a review POST.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSubmission {
    pub session_id: String,
    pub item_id: String,
    /// Numeric grade on the 1..=4 scale.
    pub rating: u8,
}

impl ReviewSubmission {
    pub fn new(session_id: &str, item_id: &str, rating: ReviewRating) -> Self {
        Self {
            session_id: session_id.to_string(),
            item_id: item_id.to_string(),
            rating: rating.as_grade(),
        }
    }
}

// ==================== Normalizers ====================

pub fn normalize_srs_item(raw: &Value) -> SrsItem {
    SrsItem {
        id: pick_id(raw, &["id", "item_id", "itemId", "card_id", "uuid"]).unwrap_or_default(),
        prompt: pick_string(raw, &["prompt", "question", "front", "text"]).unwrap_or_default(),
        answer: pick_string(raw, &["answer", "back", "solution"]).unwrap_or_default(),
        hint: pick_string(raw, &["hint", "clue"]).unwrap_or_default(),
        due_at: pick(raw, &["due_at", "dueAt", "due_date", "next_review_at"])
            .and_then(to_iso_string),
        due_in_seconds: pick_number(raw, &["due_in_seconds", "dueInSeconds", "due_in"])
            .map(|n| n as i64),
        capsule_id: pick_id(raw, &["capsule_id", "capsuleId"]),
        molecule_id: pick_id(raw, &["molecule_id", "moleculeId"]),
    }
}

/// Normalize a session payload from either the start or review endpoint.
///
/// `prior_session_id` keeps the id sticky when a review response omits
/// it; `remaining` falls back to what the payload implies (queue length
/// plus the current item).
pub fn normalize_srs_session(raw: &Value, prior_session_id: &str) -> SrsSession {
    let session_id = pick_id(raw, &["session_id", "sessionId", "id", "uuid"])
        .unwrap_or_else(|| prior_session_id.to_string());

    let item = pick(raw, &["item", "current", "current_item", "currentItem"])
        .filter(|v| v.is_object())
        .map(normalize_srs_item);

    let queue_raw = pick(raw, &["queue", "items", "upcoming"]).unwrap_or(&Value::Null);
    let queue: Vec<SrsItem> = unwrap_collection(queue_raw, &["queue", "items"])
        .iter()
        .map(normalize_srs_item)
        .collect();

    let remaining = pick_number(raw, &["remaining", "remaining_count", "left"])
        .map(|n| n.max(0.0) as u32)
        .unwrap_or_else(|| queue.len() as u32 + u32::from(item.is_some()));

    SrsSession {
        session_id,
        item,
        queue,
        remaining,
    }
}
