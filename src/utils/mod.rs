//! Small shared helpers

pub mod hashing;
pub mod text;

pub use hashing::stable_id;
pub use text::{contains_reference_link, strip_reference_links};
