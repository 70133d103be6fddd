//! Shared primitive types used across the assignment engine.

/// A stable, unique staff identifier (unique across every tier).
pub type StaffId = String;

/// A canonical case-type label, e.g. "Grief and Loss".
pub type CaseTypeLabel = String;

/// The canonical batch identifier.
pub type BatchId = String;

/// Label used when no phrase in the case-type map matches a description.
pub const MISCELLANEOUS: &str = "Miscellaneous";
