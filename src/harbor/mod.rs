//! Harbor API interaction module
//!
//! This module provides the core functionality for interacting with a
//! Harbor-compatible container registry API: the HTTP client wrapper,
//! typed errors, and the project / robot account resources.
//!
//! # Module Structure
//!
//! - [`client`] - Main Harbor client combining credentials and HTTP access
//! - [`error`] - Typed error definitions
//! - [`http`] - HTTP utilities for REST API calls
//! - [`projects`] - Project lifecycle operations
//! - [`robots`] - Robot account lifecycle operations
//!
//! # Example
//!
//! ```ignore
//! use crate::harbor::client::HarborClient;
//! use crate::harbor::projects::{self, ProjectConfig};
//!
//! async fn example() -> crate::harbor::error::Result<()> {
//!     let client = HarborClient::new("https://registry.example.com", "admin", "secret", false)?;
//!     let (id, project) = projects::create_project(
//!         &client,
//!         &ProjectConfig { name: "library".into(), public: true, auto_scan: false },
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod projects;
pub mod robots;
