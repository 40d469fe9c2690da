//! Capsule catalog: canonical entities and their normalizers
//!
//! This module provides:
//! - Canonical records for the capsule → granule → molecule → atom tree
//! - Content-type and generation-status vocabularies
//! - Never-failing normalizers from raw backend JSON

pub mod models;
pub mod normalize;

pub use models::{
    Atom, AtomBatch, Capsule, ContentType, GenerationStatus, Granule, Molecule,
    DEFAULT_XP_TARGET,
};
pub use normalize::{
    normalize_atom, normalize_atom_batch, normalize_capsule, normalize_granule,
    normalize_molecule,
};
