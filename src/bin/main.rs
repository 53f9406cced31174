//! grpcbridge binary.
//!
//! Developer tooling for inspecting how a protobuf service will be bridged:
//! which fields of each method's request and response get converted.

use anyhow::Context;
use clap::{Parser, Subcommand};
use grpcbridge::config::{BridgeConfig, ConfigArgs};
use grpcbridge::dispatch::ServiceDefinition;
use grpcbridge::extract::{extract_converters, ConverterSummary};
use grpcbridge::logging;
use grpcbridge::schema::{self, SchemaIndex};
use prost_types::FileDescriptorSet;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the field converters of every method of a service as JSON
    Inspect {
        /// Descriptor set produced by `protoc --include_imports --descriptor_set_out`
        #[arg(long)]
        descriptor_set: PathBuf,

        /// Fully qualified service name, e.g. `pkg.Service`
        #[arg(long)]
        service: String,
    },
    /// List every message the schema index knows about
    Messages {
        #[arg(long)]
        descriptor_set: PathBuf,
    },
}

#[derive(Serialize)]
struct MethodReport {
    method: String,
    path: String,
    request: Vec<ConverterSummary>,
    response: Vec<ConverterSummary>,
}

async fn load_descriptor_set(path: &Path) -> anyhow::Result<FileDescriptorSet> {
    schema::load_descriptor_set(path)
        .await
        .with_context(|| format!("Failed to load descriptor set {}", path.display()))
}

fn inspect(set: &FileDescriptorSet, service: &str, config: &BridgeConfig) -> anyhow::Result<Vec<MethodReport>> {
    let index = config
        .schema_settings()
        .apply(SchemaIndex::from_file_descriptor_set(set));
    let service = ServiceDefinition::from_file_descriptor_set(set, service)?;

    service
        .methods
        .iter()
        .map(|method| -> anyhow::Result<MethodReport> {
            let request = extract_converters(index.message(&method.request_type)?, &index)?;
            let response = extract_converters(index.message(&method.response_type)?, &index)?;
            Ok(MethodReport {
                method: method.name.clone(),
                path: method.path.clone(),
                request: request.iter().map(|c| c.summary()).collect(),
                response: response.iter().map(|c| c.summary()).collect(),
            })
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = BridgeConfig::load(&cli.config)?;
    logging::init(&config.logging);

    match cli.command {
        Commands::Inspect {
            descriptor_set,
            service,
        } => {
            let set = load_descriptor_set(&descriptor_set).await?;
            let report = inspect(&set, &service, &config)?;
            info!(service = %service, methods = report.len(), "Inspected service");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Messages { descriptor_set } => {
            let set = load_descriptor_set(&descriptor_set).await?;
            let index = SchemaIndex::from_file_descriptor_set(&set);
            for name in index.names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}
