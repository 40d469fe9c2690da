//! Spaced-repetition reviews
//!
//! This module provides:
//! - Review entities and their payload-tolerant normalizers
//! - The four-step rating scale (Again/Hard/Good/Easy)
//! - The server-driven review flow machine

pub mod models;
pub mod session;

pub use models::{
    normalize_srs_item, normalize_srs_session, ReviewRating, ReviewSubmission, SrsItem,
    SrsSession,
};
pub use session::{ReviewError, ReviewFlow, ReviewPhase, SrsTransport};
