//! REST client for the learning backend.
//!
//! Carries the migration shims the backend still needs: legacy path
//! fallback on 404/405, tolerant response normalization, and the 202
//! generation-pending case for atom fetches. Mutations invalidate the
//! query cache by coarse prefix.

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::{json, Value};

use crate::api::{
    ApiError, Result, ANSWER_PATHS, JOURNAL_PATHS, SRS_REVIEW_PATHS, SRS_SESSION_PATHS,
};
use crate::cache::QueryCache;
use crate::catalog::{normalize_atom_batch, normalize_capsule, AtomBatch, Capsule};
use crate::config::ClientConfig;
use crate::events::{ClientEvent, EventBus};
use crate::exercises::{normalize_verdict, AnswerSubmission, AnswerTransport, Verdict};
use crate::journal::{normalize_journal_entry, JournalDraft, JournalEntry, JournalTransport};
use crate::normalize::unwrap_collection;
use crate::srs::{ReviewSubmission, SrsTransport};

pub struct ApiClient {
    client: Client,
    base_url: String,
    client_id: String,
    send_beacon: bool,
    cache: QueryCache,
    bus: EventBus,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url_trimmed().to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            client_id: config.client_id.clone(),
            send_beacon: config.send_activity_beacon,
            cache: QueryCache::new(),
            bus: EventBus::noop(),
        })
    }

    /// Attach an event bus; completion and activity events go nowhere
    /// until one is set.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Build full URL for a path
    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    // ==================== Catalog ====================

    /// Fetch and normalize one capsule.
    pub async fn fetch_capsule(
        &self,
        domain: &str,
        area: &str,
        capsule_id: &str,
    ) -> Result<Capsule> {
        let key = capsule_key(domain, area, capsule_id);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(normalize_capsule(&cached));
        }

        let path = format!("/capsules/{}/{}/{}", domain, area, capsule_id);
        let raw = self.get_json(&path).await?;
        self.cache.insert(&key, raw.clone());

        let capsule = normalize_capsule(&raw);
        log::debug!(
            "api: fetched capsule {} ({} granules, {} atoms)",
            capsule.id,
            capsule.granules.len(),
            capsule.atom_count
        );
        Ok(capsule)
    }

    /// Fetch a molecule's atoms.
    ///
    /// A 202 response means atom generation is still running server-side;
    /// it yields an empty pending batch and is never cached.
    pub async fn fetch_molecule_atoms(&self, molecule_id: &str) -> Result<AtomBatch> {
        let key = ["atoms", molecule_id];
        if let Some(cached) = self.cache.get(&key) {
            return Ok(normalize_atom_batch(&cached, "", molecule_id));
        }

        let path = format!("/capsules/molecules/{}/atoms", molecule_id);
        let response = self.client.get(self.url(&path)).send().await?;
        match response.status() {
            StatusCode::ACCEPTED => {
                log::info!("api: atoms for molecule {} still generating", molecule_id);
                Ok(AtomBatch::pending())
            }
            status if status.is_success() => {
                let raw: Value = response.json().await?;
                self.cache.insert(&key, raw.clone());
                Ok(normalize_atom_batch(&raw, "", molecule_id))
            }
            _ => Err(error_from(response).await),
        }
    }

    // ==================== Progress ====================

    /// Mark an atom complete without a verdict (lessons).
    pub async fn complete_atom(&self, atom_id: &str) -> Result<()> {
        let path = format!("/progress/atom/{}/complete", atom_id);
        self.post_json(&path, &json!({})).await?;
        self.invalidate_progress();
        Ok(())
    }

    /// Fire-and-forget activity-end beacon. Failures are logged at debug
    /// and never retried; dropping the notice is acceptable.
    pub fn send_activity_end(&self, capsule_id: &str) {
        self.bus.emit(ClientEvent::ActivityEnded {
            capsule_id: capsule_id.to_string(),
        });

        if !self.send_beacon {
            return;
        }

        let client = self.client.clone();
        let url = self.url("/progress/activity-end");
        let body = json!({ "capsule_id": capsule_id, "client_id": self.client_id });
        tokio::spawn(async move {
            match client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    log::debug!("api: activity-end beacon delivered");
                }
                Ok(response) => {
                    log::debug!(
                        "api: activity-end beacon rejected: HTTP {}",
                        response.status()
                    );
                }
                Err(err) => {
                    log::debug!("api: activity-end beacon dropped: {}", err);
                }
            }
        });
    }

    // ==================== Request plumbing ====================

    async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self.client.get(self.url(path)).send().await?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.request_json(Method::POST, path, Some(body)).await
    }

    async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self.client.request(method, self.url(path));
        if !self.client_id.is_empty() {
            request = request.header("x-client-id", &self.client_id);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        // Mutation endpoints may answer with an empty body
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    /// Try each path in order, moving on only when the route itself is
    /// missing (404/405). Any other failure surfaces immediately; if every
    /// path is missing, the final attempt's error is the one returned.
    async fn request_with_fallback(
        &self,
        method: Method,
        paths: &[&str],
        body: Option<&Value>,
    ) -> Result<Value> {
        for (i, path) in paths.iter().enumerate() {
            let is_last = i + 1 == paths.len();
            let result = self.request_json(method.clone(), path, body).await;
            match settle_attempt(result, is_last) {
                Attempt::Settle(Ok(value)) => {
                    if i > 0 {
                        log::debug!("api: request served by legacy path {}", path);
                    }
                    return Ok(value);
                }
                Attempt::Settle(Err(err)) => return Err(err),
                Attempt::TryNext(err) => {
                    log::debug!("api: {} unavailable ({}), trying next path", path, err);
                }
            }
        }
        Err(ApiError::Status {
            status: 404,
            detail: "no endpoint available".to_string(),
        })
    }

    fn invalidate_progress(&self) {
        self.cache.invalidate_prefix(&["capsules"]);
        self.cache.invalidate_prefix(&["atoms"]);
    }
}

/// Build a status error, preferring the JSON body's `detail` field for
/// the human-readable message.
async fn error_from(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ApiError::Status {
        status,
        detail: detail_from_body(status, &body),
    }
}

fn detail_from_body(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail")?.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("server returned HTTP {}", status))
}

/// Outcome of one fallback attempt.
enum Attempt {
    Settle(Result<Value>),
    TryNext(ApiError),
}

/// Sort one attempt's outcome: a missing route (404/405) advances to the
/// next path while one remains; anything else settles the request, so the
/// last path's error is the one callers see.
fn settle_attempt(result: Result<Value>, is_last: bool) -> Attempt {
    match result {
        Err(err) if !is_last && err.triggers_fallback() => Attempt::TryNext(err),
        other => Attempt::Settle(other),
    }
}

// ==================== Transport impls ====================

#[async_trait]
impl AnswerTransport for ApiClient {
    async fn submit_answer(&self, submission: &AnswerSubmission) -> Result<Verdict> {
        let body = serde_json::to_value(submission)?;
        let raw = self
            .request_with_fallback(Method::POST, &ANSWER_PATHS, Some(&body))
            .await?;
        self.invalidate_progress();
        Ok(normalize_verdict(&raw))
    }

    async fn reset_atom(&self, atom_id: &str) -> Result<()> {
        let path = format!("/progress/atom/{}/reset", atom_id);
        self.post_json(&path, &json!({})).await?;
        self.invalidate_progress();
        Ok(())
    }
}

#[async_trait]
impl SrsTransport for ApiClient {
    async fn start_srs_session(&self, capsule_id: Option<&str>) -> Result<Value> {
        let mut body = json!({});
        if let Some(id) = capsule_id {
            body["capsule_id"] = json!(id);
        }
        self.request_with_fallback(Method::POST, &SRS_SESSION_PATHS, Some(&body))
            .await
    }

    async fn submit_srs_review(&self, review: &ReviewSubmission) -> Result<Value> {
        let body = serde_json::to_value(review)?;
        let raw = self
            .request_with_fallback(Method::POST, &SRS_REVIEW_PATHS, Some(&body))
            .await?;
        self.invalidate_progress();
        Ok(raw)
    }
}

#[async_trait]
impl JournalTransport for ApiClient {
    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>> {
        let raw = if let Some(cached) = self.cache.get(&["journal"]) {
            cached
        } else {
            let raw = self
                .request_with_fallback(Method::GET, &JOURNAL_PATHS, None)
                .await?;
            self.cache.insert(&["journal"], raw.clone());
            raw
        };

        Ok(unwrap_collection(&raw, &["entries", "journal"])
            .iter()
            .map(normalize_journal_entry)
            .collect())
    }

    async fn create_journal_entry(&self, draft: &JournalDraft) -> Result<JournalEntry> {
        let body = serde_json::to_value(draft)?;
        let raw = self
            .request_with_fallback(Method::POST, &JOURNAL_PATHS, Some(&body))
            .await?;
        self.cache.invalidate_prefix(&["journal"]);
        Ok(normalize_journal_entry(&raw))
    }

    async fn update_journal_entry(&self, id: &str, draft: &JournalDraft) -> Result<JournalEntry> {
        let body = serde_json::to_value(draft)?;
        let paths = entry_paths(id);
        let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
        let raw = self
            .request_with_fallback(Method::PATCH, &paths, Some(&body))
            .await?;
        self.cache.invalidate_prefix(&["journal"]);
        Ok(normalize_journal_entry(&raw))
    }

    async fn delete_journal_entry(&self, id: &str) -> Result<()> {
        let paths = entry_paths(id);
        let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
        self.request_with_fallback(Method::DELETE, &paths, None)
            .await?;
        self.cache.invalidate_prefix(&["journal"]);
        Ok(())
    }
}

/// Per-entry routes across all journal path families.
fn entry_paths(id: &str) -> Vec<String> {
    JOURNAL_PATHS
        .iter()
        .map(|root| format!("{}/{}", root, id))
        .collect()
}

/// Cache key for a capsule fetch. Slugs are only unique within an area,
/// so the whole route identity goes into the key.
fn capsule_key<'a>(domain: &'a str, area: &'a str, capsule_id: &'a str) -> [&'a str; 4] {
    ["capsules", domain, area, capsule_id]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base: &str) -> ApiClient {
        let config = ClientConfig {
            base_url: base.to_string(),
            ..ClientConfig::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let client = test_client("http://localhost:8000/");
        assert_eq!(
            client.url("/capsules/lang/fr/c1"),
            "http://localhost:8000/capsules/lang/fr/c1"
        );
        assert_eq!(client.url("srs/session"), "http://localhost:8000/srs/session");
        assert_eq!(client.url(""), "http://localhost:8000");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let config = ClientConfig {
            base_url: "ftp://example.com".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            ApiClient::new(&config),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_detail_extraction_prefers_body_detail() {
        assert_eq!(
            detail_from_body(422, r#"{"detail": "answer payload malformed"}"#),
            "answer payload malformed"
        );
        assert_eq!(detail_from_body(500, "<html>oops</html>"), "server returned HTTP 500");
        assert_eq!(detail_from_body(404, r#"{"error": "x"}"#), "server returned HTTP 404");
        assert_eq!(detail_from_body(502, ""), "server returned HTTP 502");
    }

    #[test]
    fn test_entry_paths_follow_every_family() {
        let paths = entry_paths("j1");
        assert_eq!(
            paths,
            vec![
                "/journal/entries/j1",
                "/learning/journal/entries/j1",
                "/capsules/journal/entries/j1",
            ]
        );
    }

    fn status_error(status: u16) -> ApiError {
        ApiError::Status {
            status,
            detail: String::new(),
        }
    }

    #[test]
    fn test_fallback_advances_only_on_missing_routes() {
        assert!(matches!(
            settle_attempt(Err(status_error(404)), false),
            Attempt::TryNext(_)
        ));
        assert!(matches!(
            settle_attempt(Err(status_error(405)), false),
            Attempt::TryNext(_)
        ));
        // A live route that fails is a real failure, not a missing one
        assert!(matches!(
            settle_attempt(Err(status_error(500)), false),
            Attempt::Settle(Err(ApiError::Status { status: 500, .. }))
        ));
        assert!(matches!(
            settle_attempt(Ok(Value::Null), false),
            Attempt::Settle(Ok(_))
        ));
    }

    #[test]
    fn test_last_path_surfaces_its_own_error() {
        assert!(matches!(
            settle_attempt(Err(status_error(404)), true),
            Attempt::Settle(Err(ApiError::Status { status: 404, .. }))
        ));
    }

    #[test]
    fn test_capsule_cache_key_scopes_by_domain_and_area() {
        let cache = QueryCache::new();
        cache.insert(&capsule_key("lang", "fr", "intro"), json!({ "id": "fr-intro" }));
        cache.insert(&capsule_key("lang", "es", "intro"), json!({ "id": "es-intro" }));

        assert_eq!(
            cache.get(&capsule_key("lang", "fr", "intro")).unwrap()["id"],
            "fr-intro"
        );

        // The coarse prefix still covers the longer keys
        cache.invalidate_prefix(&["capsules"]);
        assert!(cache.get(&capsule_key("lang", "es", "intro")).is_none());
    }
}
