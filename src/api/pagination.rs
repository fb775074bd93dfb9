//! Lazy, cursor-following enumeration of paged listings
//!
//! A `Paginator` owns the cursor state of one walk: the params sent with
//! every page (caller filters plus `start`), a buffer holding the rest of
//! the current page and a flag telling whether the server reported more
//! items. The next page is requested only once the buffer is empty and the
//! caller asks for another item, so dropping the paginator (or the stream
//! built from it) mid-page never triggers another request.
//!
//! The walk ends quietly when a page comes back unsuccessful, has no `data`
//! list, or reports `more_items_in_collection: false`. Only transport
//! failures that exhausted the retry policy surface as `Err`.

use super::client::ResourceClient;
use super::constants::pagination::START;
use super::request::Params;
use super::transport::HttpMethod;
use anyhow::Result;
use futures::Stream;
use log::{debug, warn};
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Instant;

/// Which single-page call the walk repeats
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// `GET /{resource}`
    Listing,
    /// `GET /{resource}/{path}`, e.g. `find` or `{id}/deals`
    SubPath(String),
}

pub struct Paginator<'a> {
    client: &'a ResourceClient,
    source: PageSource,
    params: Params,
    more: bool,
    buffer: VecDeque<Value>,
    pages: u32,
    items: u64,
    started: Instant,
}

impl<'a> Paginator<'a> {
    pub(crate) fn new(client: &'a ResourceClient, source: PageSource, params: Params) -> Self {
        Self {
            client,
            source,
            params,
            more: true,
            buffer: VecDeque::new(),
            pages: 0,
            items: 0,
            started: Instant::now(),
        }
    }

    /// Whether another item may be available without having fetched it yet
    pub fn has_more(&self) -> bool {
        !self.buffer.is_empty() || self.more
    }

    /// Number of pages requested so far
    pub fn pages_fetched(&self) -> u32 {
        self.pages
    }

    /// Next item of the walk, fetching the next page only when the current
    /// one is used up
    pub async fn next_item(&mut self) -> Result<Option<Value>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                self.items += 1;
                return Ok(Some(item));
            }
            if !self.more {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let params = self.params.clone();
        let response = match &self.source {
            PageSource::Listing => self.client.chunk(params).await,
            PageSource::SubPath(path) => {
                self.client
                    .make_api_call(HttpMethod::Get, Some(path.as_str()), params)
                    .await
            }
        };
        self.pages += 1;

        let result = match response {
            Ok(result) => result,
            Err(error) => {
                self.finish("transport error");
                return Err(error);
            }
        };

        if !result.success() {
            debug!(
                "Page {} of {} failed with status {:?}",
                self.pages,
                self.client.entity_name(),
                result.status()
            );
            self.finish("request failed");
            return Ok(());
        }

        let Some(items) = result.items() else {
            self.finish("no data");
            return Ok(());
        };
        self.buffer.extend(items.iter().cloned());

        if !result.more_items() {
            self.finish("no more items");
            return Ok(());
        }

        let current_start = self.current_start();
        match result.next_start() {
            Some(next_start) if next_start > current_start => {
                self.params.insert(START.to_string(), Value::from(next_start));
            }
            Some(next_start) => {
                warn!(
                    "{} returned next_start {} at start {}, stopping",
                    self.client.entity_name(),
                    next_start,
                    current_start
                );
                self.finish("next_start did not advance");
            }
            None => {
                warn!(
                    "{} reported more items without a next_start, stopping",
                    self.client.entity_name()
                );
                self.finish("missing next_start");
            }
        }
        Ok(())
    }

    /// Offset of the page just requested. Callers may pass `start` as a
    /// number or a numeric string.
    fn current_start(&self) -> u64 {
        match self.params.get(START) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        }
    }

    fn finish(&mut self, reason: &str) {
        self.more = false;
        self.client
            .logger()
            .log_pagination_end(self.pages, self.items + self.buffer.len() as u64, reason, self.started.elapsed());
    }

    /// Turn the cursor into a stream of items. A transport error is yielded
    /// once, after which the stream ends.
    pub fn into_stream(self) -> impl Stream<Item = Result<Value>> + 'a {
        futures::stream::unfold(self, |mut paginator| async move {
            match paginator.next_item().await {
                Ok(Some(item)) => Some((Ok(item), paginator)),
                Ok(None) => None,
                Err(error) => Some((Err(error), paginator)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resilience::RetryConfig;
    use crate::api::resource::ResourceKind;
    use crate::api::testing::ScriptedTransport;
    use crate::api::transport::TransportError;
    use crate::config::Config;
    use futures::{StreamExt, TryStreamExt};
    use serde_json::json;
    use std::sync::Arc;

    fn client() -> (ResourceClient, Arc<ScriptedTransport>) {
        let config = Config::default()
            .with_api_token("token")
            .with_retry(RetryConfig::disabled());
        let transport = Arc::new(ScriptedTransport::new());
        let client = ResourceClient::with_transport(ResourceKind::Deal, &config, transport.clone()).unwrap();
        (client, transport)
    }

    fn page(ids: &[u64], more: bool, next_start: Option<u64>) -> Value {
        let data: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
        let mut pagination = json!({"start": 0, "limit": ids.len(), "more_items_in_collection": more});
        if let Some(next_start) = next_start {
            pagination["next_start"] = json!(next_start);
        }
        json!({"success": true, "data": data, "additional_data": {"pagination": pagination}})
    }

    #[tokio::test]
    async fn test_next_start_advances_cursor() {
        let (client, transport) = client();
        transport.push_json(200, page(&[1, 2], true, Some(2)));
        transport.push_json(200, page(&[3], false, None));

        let items = client.all(Params::new()).await.unwrap();

        assert_eq!(items.len(), 3);
        let requests = transport.requests();
        assert!(requests[0].query.is_empty());
        assert_eq!(requests[1].query, vec![("start".to_string(), "2".to_string())]);
    }

    #[tokio::test]
    async fn test_caller_filters_are_kept_on_every_page() {
        let (client, transport) = client();
        transport.push_json(200, page(&[1], true, Some(1)));
        transport.push_json(200, page(&[2], false, None));

        let params = json!({"status": "open"}).as_object().cloned().unwrap();
        client.all(params).await.unwrap();

        for request in transport.requests() {
            assert!(request.query.contains(&("status".to_string(), "open".to_string())));
        }
    }

    #[tokio::test]
    async fn test_pages_are_fetched_on_demand() {
        let (client, transport) = client();
        transport.push_json(200, page(&[1, 2], true, Some(2)));
        transport.push_json(200, page(&[3, 4], false, None));

        let mut paginator = client.paginator(Params::new()).unwrap();
        assert_eq!(transport.request_count(), 0);

        paginator.next_item().await.unwrap();
        paginator.next_item().await.unwrap();
        assert_eq!(transport.request_count(), 1);

        paginator.next_item().await.unwrap();
        assert_eq!(transport.request_count(), 2);
        assert_eq!(paginator.pages_fetched(), 2);
    }

    #[tokio::test]
    async fn test_stopping_mid_page_skips_later_pages() {
        let (client, transport) = client();
        transport.push_json(200, page(&[1, 2, 3], true, Some(3)));
        transport.push_json(200, page(&[4], false, None));

        let first: Vec<Value> = client.each(Params::new()).unwrap().take(2).try_collect().await.unwrap();

        assert_eq!(first, vec![json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_next_start_stops() {
        let (client, transport) = client();
        transport.push_json(200, page(&[1], true, None));

        let items = client.all(Params::new()).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_stalled_next_start_stops() {
        let (client, transport) = client();
        transport.push_json(200, page(&[1], true, Some(0)));
        transport.push_json(200, page(&[2], true, Some(0)));

        let items = client.all(Params::new()).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(transport.request_count(), 1);
        assert_eq!(transport.pending(), 1);
    }

    #[tokio::test]
    async fn test_next_start_must_pass_caller_start() {
        let (client, transport) = client();
        transport.push_json(200, page(&[11, 12], true, Some(12)));
        transport.push_json(200, page(&[13], true, Some(10)));
        transport.push_json(200, page(&[14], false, None));

        let params = json!({"start": "10"}).as_object().cloned().unwrap();
        let items = client.all(params).await.unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_null_data_ends_walk() {
        let (client, transport) = client();
        transport.push_json(200, json!({"success": true, "data": null}));

        let mut paginator = client.paginator(Params::new()).unwrap();
        assert!(paginator.next_item().await.unwrap().is_none());
        assert!(!paginator.has_more());
    }

    #[tokio::test]
    async fn test_transport_error_is_yielded_once() {
        let (client, transport) = client();
        transport.push_json(200, page(&[1], true, Some(1)));
        transport.push_error(TransportError::Connect("refused".into()));

        let results: Vec<Result<Value>> = client.each(Params::new()).unwrap().collect().await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
