//! # neohub-domain
//!
//! Pure domain model for the neohub heating-hub client.
//!
//! ## Responsibilities
//! - Foundational types: identities, change timestamps, error taxonomy
//! - Define **status records** decoded from hub replies (system config,
//!   live data, engineers parameters)
//! - Define **devices** (zones and plugs) and the **hub state** aggregate
//! - Define **profiles** (weekly comfort-level schedules)
//! - Define **commands** (hub verbs and the device command table)
//! - Define **session events** (connected, disconnected, discovered, updated)
//! - Provide the name-set **diff** used by reconciliation and the
//!   read-only **summaries** used by front ends
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod identity;
pub mod timestamps;

pub mod command;
pub mod device;
pub mod diff;
pub mod event;
pub mod profile;
pub mod state;
pub mod status;
pub mod summary;
