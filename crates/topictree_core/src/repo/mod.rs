//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the topic store contract consumed by every service.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.

pub mod topic_repo;
