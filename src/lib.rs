//! Client library for the Harbor container registry API.
//!
//! Exposes a typed [`harbor::client::HarborClient`] plus per-resource
//! lifecycle functions for projects and robot accounts. The `harborctl`
//! binary drives these from the command line.

pub mod config;
pub mod harbor;
