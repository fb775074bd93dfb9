//! Resource client: CRUD operations and paged listings for one resource kind
//!
//! Remote failures are data, not errors: every call that reaches the server
//! returns an `ApiResult` whose flags describe the outcome. `Err` is reserved
//! for configuration errors, usage errors (missing id, missing search term,
//! operation not allowed on this resource) and transport failures that
//! outlived the retry policy.

use super::auth::Credentials;
use super::constants::{headers, search};
use super::pagination::{PageSource, Paginator};
use super::request::{self, Params};
use super::resilience::{RequestLogger, RetryPolicy};
use super::resource::{Capabilities, ResourceKind};
use super::result::ApiResult;
use super::transport::{HttpMethod, HttpRequest, ReqwestTransport, Transport, TransportError};
use crate::config::{self, Config};
use anyhow::{Result, bail};
use futures::{Stream, TryStreamExt};
use log::debug;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Client for a single Pipedrive resource kind
#[derive(Clone)]
pub struct ResourceClient {
    kind: ResourceKind,
    entity_name: String,
    credentials: Credentials,
    user_agent: String,
    retry_policy: RetryPolicy,
    logger: RequestLogger,
    transport: OnceCell<Arc<dyn Transport>>,
}

impl ResourceClient {
    /// Build a client from the process-wide default config
    pub fn new(kind: ResourceKind) -> Result<Self> {
        Self::with_config(kind, &config::defaults())
    }

    /// Build a client from an explicit config. Fails if the credentials in
    /// `config` are missing or malformed.
    pub fn with_config(kind: ResourceKind, config: &Config) -> Result<Self> {
        let credentials = config.credentials()?;
        let entity_name = kind.entity_name();
        debug!(
            "Creating {} client ({} mode)",
            entity_name,
            if credentials.is_oauth() { "oauth" } else { "api token" }
        );

        Ok(Self {
            kind,
            logger: RequestLogger::new(entity_name.clone(), config.debug),
            entity_name,
            credentials,
            user_agent: config.user_agent.clone(),
            retry_policy: RetryPolicy::new(config.retry.clone()),
            transport: OnceCell::new(),
        })
    }

    /// Build a client that sends requests through `transport` instead of
    /// creating its own HTTP connection
    pub fn with_transport(kind: ResourceKind, config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let client = Self::with_config(kind, config)?;
        // Freshly built, the cell is always empty
        let _ = client.transport.set(transport);
        Ok(client)
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    pub(crate) fn logger(&self) -> &RequestLogger {
        &self.logger
    }

    /// The HTTP connection, created on first use and reused afterwards
    fn transport(&self) -> Result<&Arc<dyn Transport>> {
        self.transport.get_or_try_init(|| {
            debug!("Opening HTTP connection to {}", self.credentials.origin());
            let transport = ReqwestTransport::new(&self.user_agent)?;
            Ok(Arc::new(transport) as Arc<dyn Transport>)
        })
    }

    /// Issue one request against this resource and normalize the response.
    ///
    /// `entity_id` fills the path segment after the resource name. A
    /// `fields_to_select` array in `params` becomes the `:(a,b)` selector;
    /// remaining params are sent as query parameters for GET/DELETE and as a
    /// JSON body for POST/PUT.
    pub async fn make_api_call(
        &self,
        method: HttpMethod,
        entity_id: Option<&str>,
        mut params: Params,
    ) -> Result<ApiResult> {
        let fields = request::take_fields_to_select(&mut params);
        let path = request::build_url(&self.credentials, &self.entity_name, entity_id, fields.as_deref());

        let (query, body) = if method.has_body() {
            let body = (!params.is_empty()).then(|| Value::Object(params));
            (Vec::new(), body)
        } else {
            (request::to_query_pairs(&params), None)
        };

        let request = HttpRequest {
            method,
            url: request::absolute_url(&self.credentials, &path),
            headers: self.request_headers(),
            query,
            body,
        };

        let transport = self.transport()?;
        let label = format!("{} {}", method, request::redact_token(&path));
        let response = self
            .retry_policy
            .execute(&label, || {
                let request = request.clone();
                let context = self.logger.log_request(&request);
                async move {
                    let response = transport.send(request).await?;
                    self.logger.log_response(&context, &response);
                    Ok::<_, TransportError>(response)
                }
            })
            .await?;

        Ok(ApiResult::from_response(response.status, &response.body))
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        let mut request_headers = vec![
            (headers::ACCEPT.to_string(), headers::CONTENT_TYPE_JSON.to_string()),
            (headers::USER_AGENT.to_string(), self.user_agent.clone()),
        ];
        request_headers.extend(self.credentials.auth_headers());
        request_headers
    }

    fn require(&self, allowed: bool, operation: &str) -> Result<()> {
        if !allowed {
            bail!("{} does not support {}", self.entity_name, operation);
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: impl fmt::Display) -> Result<ApiResult> {
        self.require(self.capabilities().read, "read")?;
        let id = require_id(id)?;
        self.make_api_call(HttpMethod::Get, Some(&id), Params::new()).await
    }

    /// Same as [`find_by_id`](Self::find_by_id) with a field selection
    pub async fn find_by_id_with_fields(&self, id: impl fmt::Display, fields: &[&str]) -> Result<ApiResult> {
        self.require(self.capabilities().read, "read")?;
        let id = require_id(id)?;
        let mut params = Params::new();
        params.insert(
            super::constants::FIELDS_TO_SELECT.to_string(),
            Value::from(fields.to_vec()),
        );
        self.make_api_call(HttpMethod::Get, Some(&id), params).await
    }

    pub async fn create(&self, params: Params) -> Result<ApiResult> {
        self.require(self.capabilities().create, "create")?;
        self.make_api_call(HttpMethod::Post, None, params).await
    }

    pub async fn update(&self, id: impl fmt::Display, params: Params) -> Result<ApiResult> {
        self.require(self.capabilities().update, "update")?;
        let id = require_id(id)?;
        self.make_api_call(HttpMethod::Put, Some(&id), params).await
    }

    pub async fn delete(&self, id: impl fmt::Display) -> Result<ApiResult> {
        self.require(self.capabilities().delete, "delete")?;
        let id = require_id(id)?;
        self.make_api_call(HttpMethod::Delete, Some(&id), Params::new()).await
    }

    /// Fetch a single page of the listing. Failure results are returned
    /// as-is for the caller to inspect.
    pub async fn chunk(&self, params: Params) -> Result<ApiResult> {
        self.require(self.capabilities().read, "read")?;
        self.make_api_call(HttpMethod::Get, None, params).await
    }

    /// Cursor over the whole listing, starting from `params`
    pub fn paginator(&self, params: Params) -> Result<Paginator<'_>> {
        self.require(self.capabilities().read, "read")?;
        Ok(Paginator::new(self, PageSource::Listing, params))
    }

    /// Lazily stream every item of the listing. Pages are fetched only as
    /// the stream is polled; a failed page ends the stream.
    pub fn each(&self, params: Params) -> Result<impl Stream<Item = Result<Value>> + '_> {
        Ok(self.paginator(params)?.into_stream())
    }

    /// Collect every item of the listing
    pub async fn all(&self, params: Params) -> Result<Vec<Value>> {
        self.each(params)?.try_collect().await
    }

    /// Search this resource by name (or e-mail address with
    /// `search_by_email`). A `term` already present in `params` is used when
    /// `term` is empty.
    pub fn find_by_name(
        &self,
        term: &str,
        search_by_email: bool,
        mut params: Params,
    ) -> Result<impl Stream<Item = Result<Value>> + '_> {
        self.require(self.capabilities().read, "read")?;

        if !term.is_empty() {
            params.insert(search::TERM.to_string(), Value::from(term));
        }
        let has_term = params
            .get(search::TERM)
            .and_then(Value::as_str)
            .is_some_and(|t| !t.is_empty());
        if !has_term {
            bail!("term is missing");
        }
        params
            .entry(search::SEARCH_BY_EMAIL)
            .or_insert_with(|| Value::from(u8::from(search_by_email)));

        let source = PageSource::SubPath(search::FIND_PATH.to_string());
        Ok(Paginator::new(self, source, params).into_stream())
    }

    /// Stream a related collection, e.g. `persons/{id}/deals`
    pub fn related(
        &self,
        id: impl fmt::Display,
        sub_resource: &str,
        params: Params,
    ) -> Result<impl Stream<Item = Result<Value>> + '_> {
        self.require(self.capabilities().read, "read")?;
        let id = require_id(id)?;
        if sub_resource.is_empty() {
            bail!("sub_resource must be provided");
        }

        let source = PageSource::SubPath(format!("{}/{}", id, sub_resource));
        Ok(Paginator::new(self, source, params).into_stream())
    }

    /// Deals linked to a person
    pub fn deals(&self, person_id: impl fmt::Display, params: Params) -> Result<impl Stream<Item = Result<Value>> + '_> {
        if self.kind != ResourceKind::Person {
            bail!("deals are only listed for persons, not {}", self.entity_name);
        }
        self.related(person_id, "deals", params)
    }

    /// Search result fields, `GET /searchResults/field`
    pub async fn field(&self, params: Params) -> Result<ApiResult> {
        if self.kind != ResourceKind::SearchResult {
            bail!("field search is only available on searchResults, not {}", self.entity_name);
        }
        self.make_api_call(HttpMethod::Get, Some("field"), params).await
    }
}

impl fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("kind", &self.kind)
            .field("entity_name", &self.entity_name)
            .field("credentials", &self.credentials)
            .field("user_agent", &self.user_agent)
            .field("connected", &self.transport.get().is_some())
            .finish()
    }
}

fn require_id(id: impl fmt::Display) -> Result<String> {
    let id = id.to_string();
    if id.trim().is_empty() {
        bail!("id must be provided");
    }
    Ok(id)
}
