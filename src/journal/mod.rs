//! Learning journal entries
//!
//! Free-form notes the user attaches to their learning, optionally tied
//! to a capsule or molecule. Entries are server-owned; this module holds
//! the canonical record, its normalizer, and the transport seam the CRUD
//! operations go through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::normalize::{normalize_tags, pick, pick_id, pick_string, to_iso_string};

/// Longest derived summary, in characters.
const SUMMARY_CHARS: usize = 280;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Server-provided, or the first 280 characters of content.
    pub summary: String,
    pub tags: Vec<String>,
    pub capsule_id: Option<String>,
    pub molecule_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Client-side payload for creating or updating an entry.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalDraft {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capsule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub molecule_id: Option<String>,
}

/// Backend seam for journal CRUD.
#[async_trait]
pub trait JournalTransport: Send + Sync {
    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, ApiError>;
    async fn create_journal_entry(&self, draft: &JournalDraft) -> Result<JournalEntry, ApiError>;
    async fn update_journal_entry(
        &self,
        id: &str,
        draft: &JournalDraft,
    ) -> Result<JournalEntry, ApiError>;
    async fn delete_journal_entry(&self, id: &str) -> Result<(), ApiError>;
}

pub fn normalize_journal_entry(raw: &Value) -> JournalEntry {
    let content = pick_string(raw, &["content", "body", "text"]).unwrap_or_default();
    let summary = pick_string(raw, &["summary", "excerpt", "preview"])
        .unwrap_or_else(|| derive_summary(&content));

    JournalEntry {
        id: pick_id(raw, &["id", "entry_id", "entryId", "uuid"]).unwrap_or_default(),
        title: pick_string(raw, &["title", "name", "subject"]).unwrap_or_default(),
        content,
        summary,
        tags: pick(raw, &["tags", "labels"]).map(normalize_tags).unwrap_or_default(),
        capsule_id: pick_id(raw, &["capsule_id", "capsuleId"]),
        molecule_id: pick_id(raw, &["molecule_id", "moleculeId"]),
        created_at: pick(raw, &["created_at", "createdAt", "created"]).and_then(to_iso_string),
        updated_at: pick(raw, &["updated_at", "updatedAt", "modified_at", "updated"])
            .and_then(to_iso_string),
    }
}

/// First 280 characters of the content, safe on any UTF-8.
fn derive_summary(content: &str) -> String {
    content.chars().take(SUMMARY_CHARS).collect()
}
