/// Endpoint receiving published events.
pub const LOG_ENDPOINT: &str = "https://api.logsnag.com/v1/log";
/// Endpoint receiving user identifications.
pub const IDENTIFY_ENDPOINT: &str = "https://api.logsnag.com/v1/identify";

pub const JSON_CONTENT_TYPE: &str = "application/json";
