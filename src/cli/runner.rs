//! CLI runner - executes commands

use serde::Serialize;

use crate::api::assessments::{Assessment, CreateAssessmentRequest};
use crate::api::assets::{CreateAssetRequest, UpdateAssetRequest};
use crate::api::organizations::{
    CreateKeyRequest, CreateOrganizationRequest, OrganizationMember, UpdateOrganizationRequest,
};
use crate::api::webhooks::{CreateWebhookRequest, UpdateWebhookRequest};
use crate::cli::commands::{
    AssessmentCommands, AssetCommands, Cli, Commands, FindingCommands, MetaCommands,
    OrganizationCommands, OutputFormat, ReportCommands, WebhookCommands,
};
use crate::cli::output::{print_json, write_bytes_or_stdout, Table};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::pagination::{ListOptions, PageIter};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Assessment { command } => self.assessment(command).await,
            Commands::Asset { command } => self.asset(command).await,
            Commands::Finding { command } => self.finding(command).await,
            Commands::Organization { command } => self.organization(command).await,
            Commands::Report { command } => self.report(command).await,
            Commands::Webhook { command } => self.webhook(command).await,
            Commands::Meta { command } => self.meta(command).await,
            Commands::Version => {
                println!("redvault {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }

    fn client(&self) -> Result<Client> {
        let mut builder = Client::builder().base_url(&self.cli.base_url);
        if let Some(key) = &self.cli.org_key {
            builder = builder.organization_key(key);
        }
        if let Some(key) = &self.cli.integration_key {
            builder = builder.integration_key(key);
        }
        builder.build()
    }

    async fn assessment(&self, command: &AssessmentCommands) -> Result<()> {
        let client = self.client()?;
        let service = client.assessments();

        match command {
            AssessmentCommands::Get { assessment_id } => {
                self.print_assessment(&service.get(assessment_id).await?)
            }
            AssessmentCommands::Create {
                asset_id,
                attack_credits,
                objective,
            } => {
                let req = CreateAssessmentRequest {
                    attack_credits: *attack_credits,
                    objective: objective.clone(),
                };
                self.print_assessment(&service.create(asset_id, &req).await?)
            }
            AssessmentCommands::List { asset_id, limit } => {
                let iter = service.all_by_asset(asset_id, list_opts(*limit));
                self.print_list(
                    iter,
                    &["ID", "NAME", "STATE", "PROGRESS", "CREATED"],
                    |item| {
                        vec![
                            item.id.clone(),
                            item.name.clone(),
                            item.state.to_string(),
                            format!("{:.0}%", item.progress * 100.0),
                            item.created_at.to_rfc3339(),
                        ]
                    },
                )
                .await
            }
            AssessmentCommands::Cancel { assessment_id } => {
                self.print_assessment(&service.cancel(assessment_id).await?)
            }
            AssessmentCommands::Pause { assessment_id } => {
                self.print_assessment(&service.pause(assessment_id).await?)
            }
            AssessmentCommands::Resume { assessment_id } => {
                self.print_assessment(&service.resume(assessment_id).await?)
            }
        }
    }

    async fn asset(&self, command: &AssetCommands) -> Result<()> {
        let client = self.client()?;
        let service = client.assets();

        match command {
            AssetCommands::Get { asset_id } => {
                let asset = service.get(asset_id).await?;
                match self.cli.output {
                    OutputFormat::Json => print_json(&asset),
                    OutputFormat::Table => {
                        let mut table = Table::new(&["FIELD", "VALUE"]);
                        table.row(vec!["id".into(), asset.id]);
                        table.row(vec!["name".into(), asset.name]);
                        table.row(vec!["lifecycle".into(), asset.lifecycle]);
                        table.row(vec!["sku".into(), asset.sku]);
                        table.row(vec![
                            "startUrl".into(),
                            asset.start_url.unwrap_or_default(),
                        ]);
                        table.row(vec![
                            "organizationId".into(),
                            asset.organization_id,
                        ]);
                        table.print();
                        Ok(())
                    }
                }
            }
            AssetCommands::Create {
                organization_id,
                name,
                sku,
            } => {
                let req = CreateAssetRequest {
                    name: name.clone(),
                    sku: sku.clone(),
                };
                let asset = service.create(organization_id, &req).await?;
                print_json(&asset)
            }
            AssetCommands::Update { asset_id, file } => {
                let doc = std::fs::read_to_string(file)?;
                let req: UpdateAssetRequest = serde_json::from_str(&doc).map_err(|e| {
                    Error::invalid_request(format!("invalid asset document: {e}"))
                })?;
                let asset = service.update(asset_id, &req).await?;
                print_json(&asset)
            }
            AssetCommands::List {
                organization_id,
                limit,
            } => {
                let iter = service.all_by_organization(organization_id, list_opts(*limit));
                self.print_list(iter, &["ID", "NAME", "LIFECYCLE", "CREATED"], |item| {
                    vec![
                        item.id.clone(),
                        item.name.clone(),
                        item.lifecycle.clone(),
                        item.created_at.to_rfc3339(),
                    ]
                })
                .await
            }
        }
    }

    async fn finding(&self, command: &FindingCommands) -> Result<()> {
        let client = self.client()?;
        let service = client.findings();

        match command {
            FindingCommands::Get { finding_id } => {
                let finding = service.get(finding_id).await?;
                match self.cli.output {
                    OutputFormat::Json => print_json(&finding),
                    OutputFormat::Table => {
                        let mut table = Table::new(&["FIELD", "VALUE"]);
                        table.row(vec!["id".into(), finding.id]);
                        table.row(vec!["name".into(), finding.name]);
                        table.row(vec!["severity".into(), finding.severity]);
                        table.row(vec!["state".into(), finding.state]);
                        table.row(vec!["summary".into(), finding.summary]);
                        table.print();
                        Ok(())
                    }
                }
            }
            FindingCommands::List { asset_id, limit } => {
                let iter = service.all_by_asset(asset_id, list_opts(*limit));
                self.print_list(
                    iter,
                    &["ID", "NAME", "SEVERITY", "STATE", "CREATED"],
                    |item| {
                        vec![
                            item.id.clone(),
                            item.name.clone(),
                            item.severity.clone(),
                            item.state.clone(),
                            item.created_at.to_rfc3339(),
                        ]
                    },
                )
                .await
            }
            FindingCommands::VerifyFix { finding_id } => {
                self.print_assessment(&service.verify_fix(finding_id).await?)
            }
        }
    }

    async fn organization(&self, command: &OrganizationCommands) -> Result<()> {
        let client = self.client()?;
        let service = client.organizations();

        match command {
            OrganizationCommands::Get { organization_id } => {
                print_json(&service.get(organization_id).await?)
            }
            OrganizationCommands::Create {
                integration_id,
                name,
                external_id,
                members,
            } => {
                let req = CreateOrganizationRequest {
                    name: name.clone(),
                    external_id: external_id.clone(),
                    members: parse_members(members)?,
                };
                print_json(&service.create(integration_id, &req).await?)
            }
            OrganizationCommands::Update {
                organization_id,
                name,
                external_id,
            } => {
                let req = UpdateOrganizationRequest {
                    name: name.clone(),
                    external_id: external_id.clone(),
                };
                print_json(&service.update(organization_id, &req).await?)
            }
            OrganizationCommands::List {
                integration_id,
                limit,
            } => {
                let iter = service.all_by_integration(integration_id, list_opts(*limit));
                self.print_list(
                    iter,
                    &["ID", "NAME", "EXTERNAL_ID", "STATE", "CREATED"],
                    |item| {
                        vec![
                            item.id.clone(),
                            item.name.clone(),
                            item.external_id.clone().unwrap_or_default(),
                            item.state.clone(),
                            item.created_at.to_rfc3339(),
                        ]
                    },
                )
                .await
            }
            OrganizationCommands::CreateKey {
                organization_id,
                name,
                expires_in_days,
            } => {
                let req = CreateKeyRequest {
                    name: name.clone(),
                    expires_in_days: *expires_in_days,
                };
                // The secret is only returned once, so always emit JSON.
                print_json(&service.create_key(organization_id, &req).await?)
            }
            OrganizationCommands::RevokeKey { key_id } => {
                service.revoke_key(key_id).await?;
                eprintln!("Revoked key {key_id}");
                Ok(())
            }
        }
    }

    async fn report(&self, command: &ReportCommands) -> Result<()> {
        let client = self.client()?;
        let service = client.reports();

        match command {
            ReportCommands::Get {
                report_id,
                output_file,
            } => {
                let pdf = service.get(report_id).await?;
                write_bytes_or_stdout(output_file.as_deref(), &pdf)
            }
            ReportCommands::Summary {
                report_id,
                output_file,
            } => {
                let summary = service.get_summary(report_id).await?;
                write_bytes_or_stdout(output_file.as_deref(), summary.markdown.as_bytes())
            }
            ReportCommands::List { asset_id, limit } => {
                let iter = service.all_by_asset(asset_id, list_opts(*limit));
                self.print_list(iter, &["ID", "VERSION", "CREATED"], |item| {
                    vec![
                        item.id.clone(),
                        item.version.to_string(),
                        item.created_at.to_rfc3339(),
                    ]
                })
                .await
            }
        }
    }

    async fn webhook(&self, command: &WebhookCommands) -> Result<()> {
        let client = self.client()?;
        let service = client.webhooks();

        match command {
            WebhookCommands::Get { webhook_id } => print_json(&service.get(webhook_id).await?),
            WebhookCommands::Create {
                organization_id,
                api_version,
                target_url,
                events,
            } => {
                let req = CreateWebhookRequest {
                    api_version: api_version.clone(),
                    target_url: target_url.clone(),
                    events: events.clone(),
                };
                print_json(&service.create(organization_id, &req).await?)
            }
            WebhookCommands::Update {
                webhook_id,
                api_version,
                target_url,
                events,
            } => {
                let req = UpdateWebhookRequest {
                    api_version: api_version.clone(),
                    target_url: target_url.clone(),
                    events: if events.is_empty() {
                        None
                    } else {
                        Some(events.clone())
                    },
                };
                print_json(&service.update(webhook_id, &req).await?)
            }
            WebhookCommands::Delete { webhook_id } => {
                service.delete(webhook_id).await?;
                eprintln!("Deleted webhook {webhook_id}");
                Ok(())
            }
            WebhookCommands::Ping { webhook_id } => {
                service.ping(webhook_id).await?;
                eprintln!("Pinged webhook {webhook_id}");
                Ok(())
            }
            WebhookCommands::List {
                organization_id,
                limit,
            } => {
                let iter = service.all_by_organization(organization_id, list_opts(*limit));
                self.print_list(iter, &["ID", "TARGET_URL", "EVENTS", "CREATED"], |item| {
                    vec![
                        item.id.clone(),
                        item.target_url.clone(),
                        item.events.join(","),
                        item.created_at.to_rfc3339(),
                    ]
                })
                .await
            }
            WebhookCommands::Deliveries { webhook_id, limit } => {
                let iter = service.all_deliveries(webhook_id, list_opts(*limit));
                self.print_list(iter, &["SENT_AT", "STATUS", "SUCCESS"], |item| {
                    vec![
                        item.sent_at.to_rfc3339(),
                        item.response.status.to_string(),
                        item.success.to_string(),
                    ]
                })
                .await
            }
        }
    }

    async fn meta(&self, command: &MetaCommands) -> Result<()> {
        let client = self.client()?;
        let service = client.meta();

        match command {
            MetaCommands::Openapi { output_file } => {
                let spec = service.get_openapi_spec().await?;
                write_bytes_or_stdout(output_file.as_deref(), &spec)
            }
            MetaCommands::SigningKeys => {
                let keys = service.get_webhook_signing_keys().await?;
                match self.cli.output {
                    OutputFormat::Json => print_json(&keys),
                    OutputFormat::Table => {
                        let mut table = Table::new(&["PUBLIC_KEY"]);
                        for key in keys {
                            table.row(vec![key.public_key]);
                        }
                        table.print();
                        Ok(())
                    }
                }
            }
        }
    }

    fn print_assessment(&self, assessment: &Assessment) -> Result<()> {
        match self.cli.output {
            OutputFormat::Json => print_json(assessment),
            OutputFormat::Table => {
                let mut table = Table::new(&["FIELD", "VALUE"]);
                table.row(vec!["id".into(), assessment.id.clone()]);
                table.row(vec!["name".into(), assessment.name.clone()]);
                table.row(vec!["state".into(), assessment.state.to_string()]);
                table.row(vec![
                    "progress".into(),
                    format!("{:.0}%", assessment.progress * 100.0),
                ]);
                table.row(vec![
                    "attackCredits".into(),
                    assessment.attack_credits.to_string(),
                ]);
                table.row(vec!["assetId".into(), assessment.asset_id.clone()]);
                table.print();
                Ok(())
            }
        }
    }

    /// Drain a page iterator and print the rows. Partial results are
    /// printed before a trailing pagination error is reported.
    async fn print_list<T, F>(
        &self,
        iter: PageIter<'_, T>,
        headers: &[&str],
        to_row: F,
    ) -> Result<()>
    where
        T: Serialize,
        F: Fn(&T) -> Vec<String>,
    {
        let (items, err) = iter.collect().await;

        match self.cli.output {
            OutputFormat::Json => print_json(&items)?,
            OutputFormat::Table => {
                let mut table = Table::new(headers);
                for item in &items {
                    table.row(to_row(item));
                }
                if table.is_empty() {
                    eprintln!("No results.");
                } else {
                    table.print();
                }
            }
        }

        match err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn list_opts(limit: Option<u32>) -> Option<ListOptions> {
    limit.map(ListOptions::with_limit)
}

/// Parse a `--member email=name` argument.
fn parse_members(raw: &[String]) -> Result<Vec<OrganizationMember>> {
    raw.iter()
        .map(|entry| {
            let (email, name) = entry.split_once('=').ok_or_else(|| {
                Error::invalid_request(format!("invalid member {entry:?}, expected email=name"))
            })?;
            Ok(OrganizationMember {
                email: email.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}
