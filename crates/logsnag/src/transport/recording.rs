use crate::{
    IdentifyOptions, PublishOptions,
    transport::{OutboundRequest, Transport, TransportError},
};
use futures_util::future::BoxFuture;
use http::{HeaderMap, Method, Uri};
use std::sync::{Arc, Mutex, PoisonError};

/// A transport that records requests instead of sending them.
///
/// A request is recorded when its future is first polled.
///
/// Useful as a stand-in for [`HttpTransport`](crate::transport) in tests of code
/// using a [`LogSnagClient`](crate::LogSnagClient).
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    fail_with: Option<Arc<str>>,
}

/// A request captured by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: Method,
    /// Request target.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl RecordingTransport {
    /// Record requests and report success.
    pub fn succeeding() -> Self {
        Self {
            requests: Arc::default(),
            fail_with: None,
        }
    }

    /// Record requests and report a transport error with `message`.
    pub fn failing(message: impl Into<Arc<str>>) -> Self {
        Self {
            requests: Arc::default(),
            fail_with: Some(message.into()),
        }
    }

    /// All requests recorded so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Bodies of recorded publish requests.
    pub fn publishes(&self) -> Vec<PublishOptions> {
        self.requests()
            .iter()
            .filter_map(RecordedRequest::publish_options)
            .collect()
    }

    /// Bodies of recorded identify requests.
    ///
    /// Any body that does not decode as a publish is taken as an identify.
    pub fn identifications(&self) -> Vec<IdentifyOptions> {
        self.requests()
            .iter()
            .filter(|r| r.publish_options().is_none())
            .filter_map(RecordedRequest::identify_options)
            .collect()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::succeeding()
    }
}

impl RecordedRequest {
    /// The body as generic JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// The body decoded as publish options.
    pub fn publish_options(&self) -> Option<PublishOptions> {
        serde_json::from_slice(&self.body).ok()
    }

    /// The body decoded as identify options.
    pub fn identify_options(&self) -> Option<IdentifyOptions> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Value of header `name` as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'static, Result<bool, TransportError>> {
        let requests = self.requests.clone();
        let fail_with = self.fail_with.clone();

        // recorded on first poll, so a dropped call leaves no trace
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(RecordedRequest {
                    method: parts.method,
                    uri: parts.uri,
                    headers: parts.headers,
                    body,
                });

            match fail_with {
                None => Ok(true),
                Some(message) => Err(TransportError::other(message.to_string())),
            }
        })
    }
}
