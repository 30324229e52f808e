//! eventdesk-core library.
//!
//! Events, attendees and inventory persisted to four flat text tables.
//! [`repo::Repository`] loads the tables into a [`state::DeskState`],
//! exposes the allocation and registration engines, and saves the touched
//! tables after every successful mutation.
//!
//! # Conventions
//!
//! - **Errors**: engine operations return [`DeskResult`]; file and config
//!   plumbing uses `anyhow::Result` with context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod allocation;
pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod ids;
pub mod model;
pub mod registration;
pub mod repo;
pub mod report;
pub mod state;
pub mod store;
pub mod validate;

pub use error::{DeskError, DeskResult, ErrorCode, Violation};
pub use repo::{LoadReport, Repository, Table};
pub use state::DeskState;
