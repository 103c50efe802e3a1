//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, path and gap primitives into command-level APIs.
//! - Keep the CLI decoupled from storage details.

pub mod household_service;
