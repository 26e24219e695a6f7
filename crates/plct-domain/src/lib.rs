//! PLCT Domain Layer
//!
//! Core data model for turning corporate annual reports into scored
//! digital-transformation initiative records. This crate has no third-party
//! dependencies; it defines the value types, closed enumerations, the
//! extraction schema, the pure scoring rules, and the trait seams that the
//! infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **PLCT framework**: four dimensions scored 0-100 (Customer Experience,
//!   People Empowerment, Operational Efficiency, New Business Models)
//! - **Stakeholder composites**: fixed linear combinations of the four
//!   dimensions for the Investor, Policy and Strategic viewpoints
//! - **Disclosure quality**: five sub-scores measuring how thoroughly a
//!   report documents an initiative
//! - **Confidence level**: derived from disclosure quality and structured
//!   detail coverage, never taken from the reasoning engine
//!
//! ## Architecture
//!
//! ```text
//! Document -> ReasoningEngine -> (validation) -> ScoringEngine -> Company + Initiatives -> PersistenceGateway
//! ```
//!
//! Everything the reasoning engine returns is untrusted until it has been
//! validated into a [`ValidatedPayload`]. Scoring only ever sees validated
//! values.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod label;

pub mod category;
pub mod company;
pub mod document;
pub mod initiative;
pub mod levels;
pub mod payload;
pub mod schema;
pub mod scores;
pub mod scoring;
pub mod sector;
pub mod snapshot;
pub mod traits;
pub mod violation;

// Re-exports for convenience
pub use category::InitiativeCategory;
pub use company::{Company, CompanyId, CompanyProfile};
pub use document::{Document, DocumentFingerprint};
pub use initiative::{DetailEntry, Initiative, InitiativeScoring, StructuredDetails, ValidatedInitiative};
pub use levels::{ConfidenceLevel, DisclosureTier, InnovationLevel, MaturityLevel, StrategicPriority};
pub use payload::{RejectedInitiative, ScoredPayload, ValidatedPayload};
pub use schema::{FieldKind, FieldSpec, SchemaSpec};
pub use scores::{DisclosureScores, PlctDimension, PlctScores, StakeholderScores};
pub use scoring::{ScoringConfig, ScoringEngine};
pub use sector::Sector;
pub use snapshot::{CompanySummary, Snapshot, SnapshotFilter};
pub use violation::{Violation, ViolationKind};
