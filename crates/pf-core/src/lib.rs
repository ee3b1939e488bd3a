//! `pf-core` — foundational types for the `pathfinder` routing service.
//!
//! This crate is a dependency of every other `pf-*` crate.  It intentionally
//! has no `pf-*` dependencies and minimal external ones (`thiserror`,
//! `serde` and `serde_json`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId` (provider id), `NodeIdx`, `EdgeIdx`          |
//! | [`geo`]         | `GeoPoint`, `BoundingBox`, haversine distance         |
//! | [`region`]      | `RegionDescriptor` and its JSON wire shape            |
//! | [`error`]       | `CoreError`, `CoreResult`                             |

pub mod error;
pub mod geo;
pub mod ids;
pub mod region;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{BoundingBox, GeoPoint};
pub use ids::{EdgeIdx, NodeId, NodeIdx};
pub use region::{descriptors_from_value, parse_descriptors, RegionDescriptor};
