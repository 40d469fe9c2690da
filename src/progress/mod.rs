//! Progress model for the capsule tree
//!
//! This module provides:
//! - The shared `ProgressStatus` vocabulary and its tolerant parser
//! - Status roll-up from atoms to molecules to granules
//! - XP percentage math for capsules
//! - Per-atom transition tracking with once-only reward announcements

pub mod status;
pub mod tracker;

pub use status::{
    derive_capsule_status, roll_up, xp_percentage, ProgressStatus,
};
pub use tracker::{AtomProgress, CapsuleXp, ProgressError};
