//! Payload-tolerant entity normalizers.
//!
//! Backend payloads for the same entity arrive in several historical
//! shapes (renamed keys, values tucked into `metadata` bags, collections
//! behind pagination wrappers). Each normalizer here resolves every
//! canonical field through an ordered candidate-key list and never fails:
//! `null` or `{}` input yields a structurally complete default record.

use serde_json::Value;

use crate::catalog::models::{
    Atom, AtomBatch, Capsule, ContentType, GenerationStatus, Granule, Molecule,
    DEFAULT_XP_TARGET,
};
use crate::normalize::{
    normalize_tags, pick, pick_bool, pick_id, pick_number, pick_positive, pick_string,
    pick_strings, unwrap_collection,
};
use crate::progress::{derive_capsule_status, roll_up, xp_percentage, ProgressStatus};

// ==================== Capsule ====================

/// Normalize a capsule detail payload, building the whole granule →
/// molecule → atom tree beneath it.
pub fn normalize_capsule(raw: &Value) -> Capsule {
    let id = pick_id(raw, &["id", "capsule_id", "capsuleId", "uuid", "slug"]).unwrap_or_default();

    let granules_raw = pick(raw, &["granules", "levels", "modules"]).unwrap_or(&Value::Null);
    let mut granules: Vec<Granule> = unwrap_collection(granules_raw, &["granules", "levels"])
        .iter()
        .enumerate()
        .map(|(index, value)| normalize_granule(value, index, &id))
        .collect();
    sort_by_order(&mut granules, |g| g.order);

    let xp_target = pick_positive(
        raw,
        &[
            "xp_target",
            "target_xp",
            "xpTarget",
            "goal_xp",
            "xp_goal",
            "total_xp",
            "reward_target",
        ],
    )
    .map(|n| n as i64)
    .unwrap_or(DEFAULT_XP_TARGET);

    let xp_current = pick_number(
        raw,
        &["xp_current", "current_xp", "xpCurrent", "earned_xp", "xp"],
    )
    .map(|n| (n as i64).max(0))
    .unwrap_or(0);

    let progress_percentage = pick_number(
        raw,
        &[
            "progress_percentage",
            "progressPercentage",
            "completion_percentage",
            "percentage",
        ],
    )
    .map(|p| p.clamp(0.0, 100.0))
    .unwrap_or_else(|| xp_percentage(xp_current as f64, xp_target as f64));

    let progress_status = pick_status(raw).unwrap_or_else(|| {
        derive_capsule_status(xp_current as f64, progress_percentage)
    });

    let level_count = pick_number(raw, &["level_count", "levelCount", "granule_count"])
        .map(|n| n.max(0.0) as u32)
        .unwrap_or(granules.len() as u32);

    // Per-molecule counts are payload claims; the sum saturates rather
    // than trusting them to fit.
    let atom_count = pick_number(raw, &["atom_count", "atomCount", "total_atoms"])
        .map(|n| n.max(0.0) as u32)
        .unwrap_or_else(|| {
            granules
                .iter()
                .flat_map(|g| g.molecules.iter())
                .map(|m| m.atom_count)
                .fold(0u32, u32::saturating_add)
        });

    let lesson_count = pick_number(raw, &["lesson_count", "lessonCount", "total_lessons"])
        .map(|n| n.max(0.0) as u32)
        .unwrap_or_else(|| {
            granules
                .iter()
                .map(|g| g.molecules.len() as u32)
                .fold(0u32, u32::saturating_add)
        });

    let tags = pick(raw, &["tags", "labels", "topics"])
        .map(normalize_tags)
        .map(dedup_preserving_order)
        .unwrap_or_default();

    Capsule {
        id,
        title: pick_string(raw, &["title", "name", "label"]).unwrap_or_default(),
        description: pick_string(raw, &["description", "summary", "about"]).unwrap_or_default(),
        domain: pick_string(raw, &["domain"]).unwrap_or_default(),
        area: pick_string(raw, &["area"]).unwrap_or_default(),
        main_skill: pick_string(raw, &["main_skill", "mainSkill", "skill"]).unwrap_or_default(),
        level_count,
        atom_count,
        lesson_count,
        xp_target,
        xp_current,
        progress_percentage,
        progress_status,
        is_locked: pick_bool(raw, &["is_locked", "isLocked", "locked"]).unwrap_or(false),
        is_enrolled: pick_bool(raw, &["is_enrolled", "isEnrolled", "enrolled"]).unwrap_or(false),
        tags,
        granules,
        raw: raw.clone(),
    }
}

// ==================== Granule ====================

/// Normalize one level. `index` seeds the sort key when the payload
/// carries no order field, keeping input order under the stable sort.
pub fn normalize_granule(raw: &Value, index: usize, capsule_id: &str) -> Granule {
    let molecules_raw = pick(raw, &["molecules", "lessons", "units"]).unwrap_or(&Value::Null);
    let mut molecules: Vec<Molecule> = unwrap_collection(molecules_raw, &["molecules", "lessons"])
        .iter()
        .enumerate()
        .map(|(i, value)| normalize_molecule(value, i, capsule_id))
        .collect();
    sort_by_order(&mut molecules, |m| m.order);

    Granule {
        id: pick_id(raw, &["id", "granule_id", "level_id", "uuid"]).unwrap_or_default(),
        order: pick_number(raw, &["order", "position", "index", "rank"])
            .unwrap_or(index as f64),
        title: pick_string(raw, &["title", "name", "label"]).unwrap_or_default(),
        molecules,
    }
}

// ==================== Molecule ====================

pub fn normalize_molecule(raw: &Value, index: usize, capsule_id: &str) -> Molecule {
    let id = pick_id(raw, &["id", "molecule_id", "lesson_id", "uuid"]).unwrap_or_default();

    let atoms_raw = pick(raw, &["atoms", "contents"]).unwrap_or(&Value::Null);
    let mut atoms: Vec<Atom> = unwrap_collection(atoms_raw, &["atoms", "contents"])
        .iter()
        .enumerate()
        .map(|(i, value)| normalize_atom_at(value, i, capsule_id, &id))
        .collect();
    sort_by_order(&mut atoms, |a| a.order);

    let atom_count = pick_number(raw, &["atom_count", "atomCount", "total_atoms"])
        .map(|n| n.max(0.0) as u32)
        .unwrap_or(atoms.len() as u32);

    let generation_status = pick_generation_status(raw).unwrap_or_default();

    let progress_status =
        pick_status(raw).unwrap_or_else(|| roll_up(&effective_statuses(&atoms)));

    Molecule {
        id,
        order: pick_number(raw, &["order", "position", "index", "rank"])
            .unwrap_or(index as f64),
        atom_count,
        generation_status,
        progress_status,
        atoms,
    }
}

// ==================== Atom ====================

/// Normalize one atom. Parent ids are threaded in from the enclosing
/// molecule fetch; explicit backreferences in the payload win.
pub fn normalize_atom(raw: &Value, capsule_id: &str, molecule_id: &str) -> Atom {
    normalize_atom_at(raw, 0, capsule_id, molecule_id)
}

fn normalize_atom_at(raw: &Value, index: usize, capsule_id: &str, molecule_id: &str) -> Atom {
    let status = pick_status(raw).unwrap_or(ProgressStatus::NotStarted);
    let is_locked = pick_bool(raw, &["is_locked", "isLocked", "locked"]).unwrap_or(false)
        || status == ProgressStatus::Locked;

    let content_type = pick_string(raw, &["content_type", "contentType", "type", "kind"])
        .map(|s| ContentType::parse(&s))
        .unwrap_or_default();

    Atom {
        id: pick_id(raw, &["id", "atom_id", "atomId", "uuid"]).unwrap_or_default(),
        order: pick_number(raw, &["order", "position", "index", "rank"])
            .unwrap_or(index as f64),
        content_type,
        content: pick(raw, &["content", "body", "payload"])
            .cloned()
            .unwrap_or(Value::Null),
        progress_status: status,
        reward_xp: pick_number(raw, &["reward_xp", "rewardXp", "xp_value", "xpValue", "xp"])
            .map(|n| (n as i64).max(0))
            .unwrap_or(0),
        is_bonus: pick_bool(raw, &["is_bonus", "isBonus", "bonus"]).unwrap_or(false),
        is_locked,
        capsule_id: pick_id(raw, &["capsule_id", "capsuleId"])
            .unwrap_or_else(|| capsule_id.to_string()),
        molecule_id: pick_id(raw, &["molecule_id", "moleculeId", "lesson_id"])
            .unwrap_or_else(|| molecule_id.to_string()),
    }
}

/// Normalize the body of a molecule-atoms fetch.
pub fn normalize_atom_batch(raw: &Value, capsule_id: &str, molecule_id: &str) -> AtomBatch {
    let mut atoms: Vec<Atom> = unwrap_collection(raw, &["atoms", "contents"])
        .iter()
        .enumerate()
        .map(|(i, value)| normalize_atom_at(value, i, capsule_id, molecule_id))
        .collect();
    sort_by_order(&mut atoms, |a| a.order);

    let generation_status = pick_generation_status(raw).unwrap_or_default();

    let progress_status =
        pick_status(raw).unwrap_or_else(|| roll_up(&effective_statuses(&atoms)));

    AtomBatch {
        atoms,
        generation_status,
        progress_status,
    }
}

// ==================== Shared helpers ====================

/// Resolve an explicit progress-status field. Candidate values that do
/// not parse as a known status are skipped, not treated as present.
fn pick_status(raw: &Value) -> Option<ProgressStatus> {
    pick_strings(
        raw,
        &["progress_status", "progressStatus", "user_status", "status"],
    )
    .into_iter()
    .find_map(|s| ProgressStatus::parse(&s))
}

/// Same skip-unparseable rule for generation states.
fn pick_generation_status(raw: &Value) -> Option<GenerationStatus> {
    pick_strings(
        raw,
        &["generation_status", "generationStatus", "generation_state"],
    )
    .into_iter()
    .find_map(|s| GenerationStatus::parse(&s))
}

/// Atom statuses with the lock overlay applied, for aggregation.
fn effective_statuses(atoms: &[Atom]) -> Vec<ProgressStatus> {
    atoms
        .iter()
        .map(|a| {
            if a.is_locked {
                ProgressStatus::Locked
            } else {
                a.progress_status
            }
        })
        .collect()
}

/// Ascending stable sort on an f64 key. NaN keys compare equal, so they
/// stay where the payload put them.
fn sort_by_order<T, F: Fn(&T) -> f64>(items: &mut [T], key: F) {
    items.sort_by(|a, b| {
        key(a)
            .partial_cmp(&key(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn dedup_preserving_order(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}
