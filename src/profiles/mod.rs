//! Media profile derivation: raw tabular rows → enriched, queryable profiles.
//!
//! The pipeline runs bottom-up: [`classify`] holds the pure name-based
//! classification rules, [`row`] reads the tabular source, [`enrich`] turns
//! one row into one immutable [`types::MediaProfile`], and [`directory`]
//! holds the enriched set for the process lifetime with exact and fuzzy
//! lookup.

pub mod classify;
pub mod directory;
pub mod enrich;
pub mod row;
pub mod types;

pub use directory::{load_user_profiles, MediaDirectory};
pub use row::RawMediaRow;
pub use types::MediaProfile;
