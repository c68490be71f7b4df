//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::DEFAULT_BASE_URL;

/// Redvault CLI
#[derive(Parser, Debug)]
#[command(name = "redvault")]
#[command(author, version, about = "Interact with the Redvault API", long_about = None)]
pub struct Cli {
    /// Organization API key
    #[arg(long, global = true, env = "REDVAULT_ORG_KEY", hide_env_values = true)]
    pub org_key: Option<String>,

    /// Integration API key
    #[arg(
        long,
        global = true,
        env = "REDVAULT_INTEGRATION_KEY",
        hide_env_values = true
    )]
    pub integration_key: Option<String>,

    /// API base URL
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL, hide_default_value = false)]
    pub base_url: String,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage assessments
    Assessment {
        #[command(subcommand)]
        command: AssessmentCommands,
    },

    /// Manage assets
    Asset {
        #[command(subcommand)]
        command: AssetCommands,
    },

    /// Manage findings
    Finding {
        #[command(subcommand)]
        command: FindingCommands,
    },

    /// Manage organizations
    Organization {
        #[command(subcommand)]
        command: OrganizationCommands,
    },

    /// Manage reports
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },

    /// Manage webhooks
    Webhook {
        #[command(subcommand)]
        command: WebhookCommands,
    },

    /// API metadata and utilities
    Meta {
        #[command(subcommand)]
        command: MetaCommands,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum AssessmentCommands {
    /// Get an assessment by ID
    Get { assessment_id: String },

    /// Create a new assessment
    Create {
        /// Asset ID to create the assessment for
        #[arg(long)]
        asset_id: String,

        /// Number of attack credits to use
        #[arg(long)]
        attack_credits: i64,

        /// Assessment objective
        #[arg(long)]
        objective: Option<String>,
    },

    /// List assessments for an asset
    List {
        #[arg(long)]
        asset_id: String,

        /// Maximum number of results per page
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Cancel a running assessment
    Cancel { assessment_id: String },

    /// Pause a running assessment
    Pause { assessment_id: String },

    /// Resume a paused assessment
    Resume { assessment_id: String },
}

#[derive(Subcommand, Debug)]
pub enum AssetCommands {
    /// Get an asset by ID
    Get { asset_id: String },

    /// Create a new asset
    Create {
        /// Organization ID to create the asset in
        #[arg(long)]
        organization_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        sku: String,
    },

    /// Update an asset from a JSON document
    Update {
        asset_id: String,

        /// Path to a JSON file with the full asset configuration
        #[arg(long, short = 'f')]
        file: PathBuf,
    },

    /// List assets for an organization
    List {
        #[arg(long)]
        organization_id: String,

        /// Maximum number of results per page
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FindingCommands {
    /// Get a finding by ID
    Get { finding_id: String },

    /// List findings for an asset
    List {
        #[arg(long)]
        asset_id: String,

        /// Maximum number of results per page
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Verify that a finding has been fixed
    VerifyFix { finding_id: String },
}

#[derive(Subcommand, Debug)]
pub enum OrganizationCommands {
    /// Get an organization by ID
    Get { organization_id: String },

    /// Create a new organization
    Create {
        /// Integration ID to create the organization in
        #[arg(long)]
        integration_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        external_id: Option<String>,

        /// Member as "email=name"; repeat for multiple members
        #[arg(long = "member", required = true)]
        members: Vec<String>,
    },

    /// Update an organization
    Update {
        organization_id: String,

        #[arg(long)]
        name: String,

        /// Omit to clear the external ID
        #[arg(long)]
        external_id: Option<String>,
    },

    /// List organizations for an integration
    List {
        #[arg(long)]
        integration_id: String,

        /// Maximum number of results per page
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Create an API key for an organization
    CreateKey {
        organization_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        expires_in_days: Option<u32>,
    },

    /// Revoke an organization API key
    RevokeKey { key_id: String },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Download a report as PDF
    Get {
        report_id: String,

        /// Path to write the PDF file
        #[arg(long, short = 'f')]
        output_file: Option<PathBuf>,
    },

    /// Get the markdown summary of a report
    Summary {
        report_id: String,

        /// Path to write the markdown summary
        #[arg(long, short = 'f')]
        output_file: Option<PathBuf>,
    },

    /// List reports for an asset
    List {
        #[arg(long)]
        asset_id: String,

        /// Maximum number of results per page
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum WebhookCommands {
    /// Get a webhook by ID
    Get { webhook_id: String },

    /// Create a new webhook
    Create {
        /// Organization ID to create the webhook in
        #[arg(long)]
        organization_id: String,

        #[arg(long)]
        api_version: String,

        #[arg(long)]
        target_url: String,

        /// Event type to subscribe to; repeat for multiple events
        #[arg(long = "event", required = true)]
        events: Vec<String>,
    },

    /// Update a webhook
    Update {
        webhook_id: String,

        #[arg(long)]
        api_version: Option<String>,

        #[arg(long)]
        target_url: Option<String>,

        /// Replacement event list; repeat for multiple events
        #[arg(long = "event")]
        events: Vec<String>,
    },

    /// Delete a webhook
    Delete { webhook_id: String },

    /// Send a ping event to a webhook
    Ping { webhook_id: String },

    /// List webhooks for an organization
    List {
        #[arg(long)]
        organization_id: String,

        /// Maximum number of results per page
        #[arg(long)]
        limit: Option<u32>,
    },

    /// List deliveries for a webhook
    Deliveries {
        webhook_id: String,

        /// Maximum number of results per page
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MetaCommands {
    /// Get the OpenAPI specification
    Openapi {
        /// Write output to file
        #[arg(long, short = 'f')]
        output_file: Option<PathBuf>,
    },

    /// Get webhook signing keys
    SigningKeys,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for humans
    Table,
    /// Pretty-printed JSON
    Json,
}
