//! API constants for the Pipedrive REST API

/// Origin used in API token mode
pub const DEFAULT_ORIGIN: &str = "https://api.pipedrive.com";

/// Path prefix used in API token mode. OAuth mode talks to the tenant
/// domain without a version prefix.
pub const API_VERSION_PREFIX: &str = "/v1";

/// Query parameter carrying the API token
pub const API_TOKEN_PARAM: &str = "api_token";

/// Params key consumed by the request builder for field selection
pub const FIELDS_TO_SELECT: &str = "fields_to_select";

/// Default user agent sent with every request
pub fn default_user_agent() -> String {
    format!("pipedrive-cli/{}", env!("CARGO_PKG_VERSION"))
}

/// Keys of the normalized result map
pub mod result_keys {
    pub const SUCCESS: &str = "success";
    pub const NOT_AUTHORIZED: &str = "not_authorized";
    pub const FAILED: &str = "failed";
    pub const DATA: &str = "data";
    pub const ADDITIONAL_DATA: &str = "additional_data";
    pub const PAGINATION: &str = "pagination";
    pub const MORE_ITEMS: &str = "more_items_in_collection";
    pub const NEXT_START: &str = "next_start";
}

/// Pagination request params
pub mod pagination {
    pub const START: &str = "start";
    pub const LIMIT: &str = "limit";
}

/// Search params
pub mod search {
    pub const FIND_PATH: &str = "find";
    pub const TERM: &str = "term";
    pub const SEARCH_BY_EMAIL: &str = "search_by_email";
}

/// Standard headers
pub mod headers {
    pub const ACCEPT: &str = "Accept";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const USER_AGENT: &str = "User-Agent";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}
