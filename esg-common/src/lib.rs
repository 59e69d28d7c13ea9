//! # ESG Common Library
//!
//! Shared code for the ESG scoring services:
//! - Error and result types
//! - Bootstrap configuration loading (TOML file, compiled defaults)

pub mod config;
pub mod error;

pub use error::{Error, Result};
