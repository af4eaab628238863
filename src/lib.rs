//! Tasklane: task lifecycle core for project management services.
//!
//! This crate provides the task state machine behind a task and project
//! management API: creating tasks, moving them through their lifecycle,
//! recording who changed which field, and persisting the result with
//! optimistic concurrency. Transport, authentication and notification
//! delivery are left to the host application.
//!
//! # Architecture
//!
//! Tasklane follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and access checks
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle domain, ports, adapters and services

pub mod task;
