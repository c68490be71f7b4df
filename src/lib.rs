// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # Redvault client
//!
//! Typed async client and CLI for the Redvault security-assessment API.
//!
//! ## Features
//!
//! - **Typed services**: assessments, assets, findings, organizations,
//!   reports, webhooks, meta
//! - **Lazy pagination**: cursor iterators with loop-guard protection
//! - **Resilient transport**: retry with exponential backoff plus
//!   client-side token-bucket rate limiting
//! - **Webhook verification**: Ed25519 signatures, usable standalone or
//!   as axum middleware
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use redvault::{Client, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder()
//!         .organization_key(std::env::var("REDVAULT_ORG_KEY").unwrap())
//!         .build()?;
//!
//!     let mut findings = client.findings().all_by_asset("asset_01", None);
//!     while let Some(finding) = findings.next().await {
//!         println!("{}", finding?.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Client facade and builder
pub mod client;

/// Transport stack: retry and rate limiting over reqwest
pub mod http;

/// Cursor pagination
pub mod pagination;

/// Per-resource API services
pub mod api;

/// Webhook signature verification
pub mod webhook;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{Client, ClientBuilder, API_VERSION, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use pagination::{ListOptions, Page, PageInfo, PageIter};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
