//! CLI module
//!
//! Command-line interface over the typed client. One subcommand per
//! resource, with table or JSON output.
//!
//! # Commands
//!
//! - `assessment` - get/create/list/cancel/pause/resume
//! - `asset` - get/create/update/list
//! - `finding` - get/list/verify-fix
//! - `organization` - get/create/update/list/create-key/revoke-key
//! - `report` - get/summary/list
//! - `webhook` - get/create/update/delete/ping/list/deliveries
//! - `meta` - openapi/signing-keys

mod commands;
mod output;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
