//! # wftlint
//!
//! Lints workflow template manifests, either in-process or against a
//! workflow server's lint endpoint.
//!
//! ## Usage
//!
//! ```bash
//! wftlint lint [--strict[=false]] [--argo-server host:port] (DIRECTORY | FILE...)
//! ```
//!
//! ## Modules
//!
//! - `cli` - Argument parsing, help rendering and command routing
//! - `config` - Client configuration: namespace and lint server address
//! - `error` - Error taxonomy shared by every component
//! - `lint` - Path classification, traversal and the local/remote lint drivers
//! - `service` - The remote lint service and its test double
//! - `validate` - Manifest parsing and workflow template rules
pub mod cli;
pub mod config;
pub mod error;
pub mod lint;
pub mod service;
pub mod validate;
