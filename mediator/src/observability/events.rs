//! Canonical structured event names used across `mediator` and its adapters.

// Endpoint resolution and caching.
pub const ENDPOINT_RESOLVE_OK: &str = "endpoint_resolve_ok";
pub const ENDPOINT_RESOLVE_FAILED: &str = "endpoint_resolve_failed";
pub const ENDPOINT_CACHE_HIT: &str = "endpoint_cache_hit";
pub const ENDPOINT_CACHE_EVICT: &str = "endpoint_cache_evict";
pub const ENDPOINT_CACHE_RELEASE_UNKNOWN: &str = "endpoint_cache_release_unknown";

// Security resolution.
pub const SECURITY_KEY_STORE_LOAD: &str = "security_key_store_load";
pub const SECURITY_KEY_STORE_LOAD_FAILED: &str = "security_key_store_load_failed";
pub const SECURITY_TLS_CONTEXT_BUILT: &str = "security_tls_context_built";
pub const SECURITY_INLINE_CREDENTIALS: &str = "security_inline_credentials";

// Route lifecycle.
pub const ROUTE_ADD: &str = "route_add";
pub const ROUTE_START_BEGIN: &str = "route_start_begin";
pub const ROUTE_START_OK: &str = "route_start_ok";
pub const ROUTE_START_FAILED: &str = "route_start_failed";
pub const ROUTE_STOP_BEGIN: &str = "route_stop_begin";
pub const ROUTE_STOP_OK: &str = "route_stop_ok";
pub const ROUTE_STOP_DRAIN_TIMEOUT: &str = "route_stop_drain_timeout";
pub const ROUTE_REMOVE: &str = "route_remove";

// Exchange processing.
pub const EXCHANGE_CREATED: &str = "exchange_created";
pub const EXCHANGE_COMPLETED: &str = "exchange_completed";
pub const EXCHANGE_FAULTED: &str = "exchange_faulted";
pub const EXCHANGE_REJECTED: &str = "exchange_rejected";
pub const STEP_LOG: &str = "step_log";

// Consumers.
pub const CONSUMER_STARTED: &str = "consumer_started";
pub const CONSUMER_STOPPED: &str = "consumer_stopped";
pub const CONSUMER_CONNECTION_FAILED: &str = "consumer_connection_failed";

// Context lifecycle.
pub const CONTEXT_BUILT: &str = "context_built";
pub const CONTEXT_STARTED: &str = "context_started";
pub const CONTEXT_STOPPED: &str = "context_stopped";

// Document store adapter.
pub const MONGODB_CONNECT_OK: &str = "mongodb_connect_ok";
pub const MONGODB_CONNECT_FAILED: &str = "mongodb_connect_failed";
pub const MONGODB_CONNECTION_REUSE: &str = "mongodb_connection_reuse";
pub const MONGODB_AUTH_OK: &str = "mongodb_auth_ok";
pub const MONGODB_AUTH_FAILED: &str = "mongodb_auth_failed";
pub const MONGODB_OPERATION: &str = "mongodb_operation";

// HTTP adapter.
pub const HTTP_LISTENER_BOUND: &str = "http_listener_bound";
pub const HTTP_LISTENER_CLOSED: &str = "http_listener_closed";
pub const HTTP_REQUEST_RECEIVED: &str = "http_request_received";
pub const HTTP_REQUEST_REJECTED: &str = "http_request_rejected";
pub const HTTP_TLS_HANDSHAKE_FAILED: &str = "http_tls_handshake_failed";
pub const HTTP_CLIENT_REQUEST: &str = "http_client_request";
pub const HTTP_CLIENT_FAILED: &str = "http_client_failed";
