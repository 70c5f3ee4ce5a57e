//! Sigpost Core - Signal schema and quality scoring
//!
//! This crate provides the foundational primitives:
//! - The Signal record: one security observation about one entity
//! - Closed enumerations with lower-camel-case wire spellings
//! - Validation reports over raw JSON candidates
//! - The quality scorer: a weighted completeness estimate per signal
//!
//! Everything here is pure: no I/O, no shared mutable state. Scoring a
//! collection of signals is embarrassingly parallel.

pub mod context;
pub mod entity;
pub mod enums;
pub mod quality;
pub mod severity;
pub mod signal;
pub mod validate;

pub use context::*;
pub use entity::*;
pub use enums::UnknownEnumValue;
pub use quality::*;
pub use severity::*;
pub use signal::*;
pub use validate::*;

/// Schema version stamped on signals built through the builder
pub const SIGNAL_VERSION: &str = "1.0";

/// Documented lower bound of `Signal::confidence`
pub const MIN_CONFIDENCE: i64 = 0;

/// Documented upper bound of `Signal::confidence`
pub const MAX_CONFIDENCE: i64 = 100;

/// Documented lower bound of `SecurityContext::degree_of_impact`
pub const MIN_DEGREE_OF_IMPACT: i64 = -10;

/// Documented upper bound of `SecurityContext::degree_of_impact`
pub const MAX_DEGREE_OF_IMPACT: i64 = 10;

/// Well-known submitter name for Qualys configuration assessment
pub const SOURCE_QUALYS_CA: &str = "com.qualys.ca";
