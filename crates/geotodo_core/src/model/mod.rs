//! Domain model for tasks and their optional coordinates.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep creation defaults and validation next to the data they guard.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard delete; tasks own no related records.

pub mod task;
