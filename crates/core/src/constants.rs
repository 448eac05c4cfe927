/// Constants used throughout the tracker codebase
// Collector endpoints
pub const DEVELOPMENT_ENDPOINT: &str = "https://c-dev.surfside.io";
pub const PRODUCTION_ENDPOINT: &str = "https://c.surfside.io";
pub const DEFAULT_POST_PATH: &str = "/com.snowplowanalytics.snowplow/tp2";
pub const POST_CONTENT_TYPE: &str = "application/json; charset=utf-8";

// Defaults used by the demo
pub const DEFAULT_NAMESPACE: &str = "iosTracker";
pub const DEFAULT_APP_ID: &str = "surfside-demo";
pub const DEFAULT_PLATFORM: &str = "mob";

// Envelope schemas
pub const PAYLOAD_DATA_SCHEMA: &str =
    "iglu:com.snowplowanalytics.snowplow/payload_data/jsonschema/1-0-4";
pub const UNSTRUCT_EVENT_SCHEMA: &str =
    "iglu:com.snowplowanalytics.snowplow/unstruct_event/jsonschema/1-0-0";
pub const CONTEXTS_SCHEMA: &str = "iglu:com.snowplowanalytics.snowplow/contexts/jsonschema/1-0-1";

// Built-in event schemas
pub const SCREEN_VIEW_SCHEMA: &str =
    "iglu:com.snowplowanalytics.mobile/screen_view/jsonschema/1-0-0";
pub const LINK_CLICK_SCHEMA: &str =
    "iglu:com.snowplowanalytics.snowplow/link_click/jsonschema/1-0-1";
pub const COMMERCE_ACTION_SCHEMA: &str = "iglu:com.surfside/commerce_action/jsonschema/1-0-0";
pub const SOURCE_EVENT_SCHEMA: &str = "iglu:com.surfside/source/jsonschema/1-0-0";
pub const DEBUG_EVENT_SCHEMA: &str = "iglu:com.example/test_event/jsonschema/1-0-0";

// Context entity schemas
pub const LOCATION_CONTEXT_SCHEMA: &str = "iglu:com.surfside/location/jsonschema/1-0-0";
pub const SOURCE_CONTEXT_SCHEMA: &str = "iglu:com.surfside/source/jsonschema/1-0-0";
pub const SEGMENT_CONTEXT_SCHEMA: &str = "iglu:com.surfside/segment/jsonschema/1-0-0";
pub const PRODUCT_CONTEXT_SCHEMA: &str = "iglu:com.surfside/product/jsonschema/1-0-0";

// Environment variable names
pub const SURFSIDE_NAMESPACE_VAR: &str = "SURFSIDE_NAMESPACE";
pub const SURFSIDE_ENDPOINT_VAR: &str = "SURFSIDE_ENDPOINT";
pub const SURFSIDE_ENVIRONMENT_VAR: &str = "SURFSIDE_ENVIRONMENT";
pub const SURFSIDE_ACCOUNT_ID_VAR: &str = "SURFSIDE_ACCOUNT_ID";
pub const SURFSIDE_SOURCE_ID_VAR: &str = "SURFSIDE_SOURCE_ID";
pub const SURFSIDE_BATCH_SIZE_VAR: &str = "SURFSIDE_BATCH_SIZE";
pub const SURFSIDE_MAX_RETRIES_VAR: &str = "SURFSIDE_MAX_RETRIES";
pub const SURFSIDE_REQUEST_TIMEOUT_MS_VAR: &str = "SURFSIDE_REQUEST_TIMEOUT_MS";
pub const SURFSIDE_LOG_VAR: &str = "SURFSIDE_LOG";
