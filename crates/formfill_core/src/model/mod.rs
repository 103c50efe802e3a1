//! Household domain model.
//!
//! # Responsibility
//! - Define the document/member structures persisted by core.
//! - Keep member fields free-form; no schema is enforced.
//!
//! # Invariants
//! - Every member is addressed by its string `id`.
//! - Members are never removed by core.

pub mod household;
