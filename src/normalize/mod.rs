//! Tolerant normalization primitives shared by all entity normalizers.

mod coerce;
mod fields;
mod unwrap;

pub use coerce::{non_blank, normalize_tags, to_boolean, to_iso_string, to_number};
pub use fields::{pick, pick_bool, pick_id, pick_number, pick_positive, pick_string, pick_strings};
pub use unwrap::{to_array, unwrap_collection};
