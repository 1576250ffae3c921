//! Device profile model and registry tooling for Tessera.
//!
//! `tessera-profile` loads YAML device profiles, extracts their signature
//! and maintainer sections, and derives the canonical payload that
//! maintainers sign. It also implements the registry-wide scans: structural
//! validation, `manifest.json` aggregation, and maintainer auditing.

pub mod canonical;
pub mod document;
pub mod error;
pub mod maintainers;
pub mod manifest;
pub mod registry;
pub mod validate;

// Re-export primary types for convenience.
pub use canonical::{CANONICAL_FORM, canonicalize};
pub use document::{MaintainerRecord, Profile, SignatureBlock, SignatureField};
pub use error::ProfileError;
