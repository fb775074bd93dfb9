use crate::cli::Commands;
use super::output::{print_json, print_result};
use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use futures::{Stream, StreamExt, TryStreamExt};
use log::info;
use pipedrive::api::constants::{FIELDS_TO_SELECT, pagination};
use pipedrive::api::{Params, ResourceClient, ResourceKind};
use pipedrive::config::Config;
use serde_json::Value;

/// Execute a command. Returns whether it succeeded.
pub async fn run(command: Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Resources => {
            print_resources();
            Ok(true)
        }
        Commands::List {
            resource,
            limit,
            page_size,
            fields,
        } => {
            let client = client_for(&resource, config)?;
            let mut params = Params::new();
            if let Some(page_size) = page_size {
                params.insert(pagination::LIMIT.to_string(), Value::from(page_size));
            }
            if !fields.is_empty() {
                params.insert(FIELDS_TO_SELECT.to_string(), Value::from(fields));
            }
            let items = collect(client.each(params)?, limit).await?;
            info!("Listed {} {}", items.len(), client.entity_name());
            print_json(&items)?;
            Ok(true)
        }
        Commands::Get {
            resource,
            id,
            fields,
        } => {
            let client = client_for(&resource, config)?;
            let result = if fields.is_empty() {
                client.find_by_id(&id).await?
            } else {
                let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
                client.find_by_id_with_fields(&id, &fields).await?
            };
            print_result(&result)
        }
        Commands::Search {
            resource,
            term,
            email,
            limit,
        } => {
            let client = client_for(&resource, config)?;
            let items = collect(client.find_by_name(&term, email, Params::new())?, limit).await?;
            info!("Found {} {} matching '{}'", items.len(), client.entity_name(), term);
            print_json(&items)?;
            Ok(true)
        }
        Commands::Create { resource, data } => {
            let client = client_for(&resource, config)?;
            let result = client.create(parse_params(&data)?).await?;
            print_result(&result)
        }
        Commands::Update { resource, id, data } => {
            let client = client_for(&resource, config)?;
            let result = client.update(&id, parse_params(&data)?).await?;
            print_result(&result)
        }
        Commands::Delete { resource, id } => {
            let client = client_for(&resource, config)?;
            let result = client.delete(&id).await?;
            print_result(&result)
        }
    }
}

fn client_for(resource: &str, config: &Config) -> Result<ResourceClient> {
    let kind: ResourceKind = resource.parse()?;
    ResourceClient::with_config(kind, config).context("Failed to configure Pipedrive client")
}

fn parse_params(data: &str) -> Result<Params> {
    let value: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
    match value {
        Value::Object(params) => Ok(params),
        _ => Err(anyhow!("--data must be a JSON object")),
    }
}

async fn collect<S>(stream: S, limit: Option<usize>) -> Result<Vec<Value>>
where
    S: Stream<Item = Result<Value>>,
{
    match limit {
        Some(limit) => stream.take(limit).try_collect().await,
        None => stream.try_collect().await,
    }
}

fn print_resources() {
    println!(
        "{}{}{}",
        format!("{:<20} ", "RESOURCE").bold(),
        format!("{:<20} ", "ENDPOINT").bold(),
        "OPERATIONS".bold()
    );
    for kind in ResourceKind::ALL {
        let caps = kind.capabilities();
        let operations: Vec<&str> = [
            (caps.read, "read"),
            (caps.create, "create"),
            (caps.update, "update"),
            (caps.delete, "delete"),
        ]
        .into_iter()
        .filter_map(|(allowed, name)| allowed.then_some(name))
        .collect();
        println!("{:<20} {:<20} {}", kind.name(), kind.entity_name(), operations.join(", "));
    }
}
