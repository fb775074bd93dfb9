//! Client library for the Pipedrive CRM REST API
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use pipedrive::api::{Params, ResourceClient, ResourceKind};
//! use pipedrive::config::Config;
//!
//! let config = Config::default().with_api_token("my-token");
//! let deals = ResourceClient::with_config(ResourceKind::Deal, &config)?;
//!
//! let deal = deals.find_by_id(42).await?;
//! if deal.not_authorized() {
//!     eprintln!("token rejected");
//! }
//!
//! let all_deals = deals.all(Params::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;

pub use api::{ApiResult, Credentials, ResourceClient, ResourceKind};
pub use config::Config;
