pub mod atoms;
pub mod capsule;
pub mod journal;
pub mod review;
