//! Domain model for the topic taxonomy.
//!
//! # Responsibility
//! - Define topic nodes, entity links and the typed level code.
//! - Define payload and read models exchanged with catalog and indexing
//!   collaborators.
//!
//! # Invariants
//! - Nodes reference their parent by id only; trees are assembled on demand.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod level;
pub mod topic;
