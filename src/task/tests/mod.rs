//! Unit tests for the task module.
//!
//! Tests are organised by concern: value validation and mutations, the
//! status transition table, audit history, the in-memory adapters and
//! service orchestration.
