use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;
use pipedrive::config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pipedrive-cli")]
#[command(about = "A CLI tool for interacting with the Pipedrive CRM API")]
pub struct Cli {
    /// Path to a TOML config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API token, overrides config file and environment
    #[arg(long, global = true)]
    pub api_token: Option<String>,

    /// Log every request and response
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every item of a resource, following pagination
    List {
        /// Resource name, e.g. `deal`, `persons` or `activity-type`
        resource: String,
        /// Stop after this many items
        #[arg(short, long)]
        limit: Option<usize>,
        /// Items requested per page
        #[arg(long)]
        page_size: Option<u32>,
        /// Only return these fields
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Fetch a single item by id
    Get {
        resource: String,
        id: String,
        /// Only return these fields
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Search a resource by name
    Search {
        resource: String,
        term: String,
        /// Search by e-mail address instead of name
        #[arg(long)]
        email: bool,
        /// Stop after this many items
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Create an item from a JSON object
    Create {
        resource: String,
        /// JSON object with the item's attributes
        #[arg(short, long)]
        data: String,
    },
    /// Update an item from a JSON object
    Update {
        resource: String,
        id: String,
        /// JSON object with the attributes to change
        #[arg(short, long)]
        data: String,
    },
    /// Delete an item by id
    Delete { resource: String, id: String },
    /// Show the available resources and their endpoints
    Resources,
}

impl Cli {
    /// Resolve the effective config: file, then environment, then flags
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        config.apply_env();

        if let Some(token) = &self.api_token {
            debug!("Using api_token from command line");
            config.api_token = Some(token.clone());
        }
        if self.debug {
            config.debug = true;
        }

        Ok(config)
    }
}
