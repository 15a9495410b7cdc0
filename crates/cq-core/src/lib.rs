//! # cq-core
//!
//! Core types, errors, and configuration for content-query.
//!
//! This crate provides the building blocks shared by the query crate:
//! - Error type and result alias
//! - Dialect, sort direction, and publication state types
//! - Pagination model
//! - Builder configuration

pub mod error;
pub mod types;
pub mod pagination;
pub mod config;

pub use error::*;
pub use types::*;
pub use pagination::*;
pub use config::{BuilderConfig, ConfigError};
