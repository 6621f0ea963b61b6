//! LogSnag client

pub use self::builder::{LogSnagClientBuilder, LogSnagClientBuilderError};
pub use self::headers::{IDENTIFY_ENDPOINT, LOG_ENDPOINT};
use crate::{
    IdentifyOptions, PublishOptions,
    identity::{IdentityResolver, StorageError},
    transport::{OutboundRequest, Transport, TransportError},
};
use futures_util::{
    StreamExt, TryStreamExt, future,
    stream::{self, BoxStream},
};
use http::{
    Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use std::sync::Arc;
use tracing::Instrument;

mod builder;
pub(crate) mod headers;

/// A client for reporting events and user identities to LogSnag.
///
/// Cloning is cheap; clones share configuration, transport and storage.
#[derive(Clone)]
pub struct LogSnagClient {
    inner: Arc<LogSnagClientInner>,
}

struct LogSnagClientInner {
    project: String,
    authorization: String,
    transport: Arc<dyn Transport>,
    identity: IdentityResolver,
    enable_trace: bool,
    print_internal_error: bool,
}

/// Error type for LogSnag client operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LogSnagClientError {
    /// The request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The request could not be assembled, e.g. the token is not a valid header value.
    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),
    /// The anonymous user id could not be read or persisted.
    #[error("failed to resolve anonymous user id: {0}")]
    Storage(#[from] StorageError),
    /// The transport failed to deliver the request.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// One-item stream carrying the outcome of a stream-style call.
pub type ResponseStream = BoxStream<'static, Result<bool, LogSnagClientError>>;

#[derive(Debug, Clone, Copy)]
enum Operation {
    Publish,
    Identify,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Publish => "publish",
            Operation::Identify => "identify",
        }
    }
}

impl LogSnagClient {
    /// Create a new client builder.
    pub fn builder() -> LogSnagClientBuilder {
        LogSnagClientBuilder::default()
    }

    /// Create a client sending over HTTPS with the enabled HTTP backend.
    ///
    /// The anonymous user id is persisted with [`FileStore::platform_default`](crate::FileStore::platform_default).
    #[cfg(any(feature = "reqwest", feature = "nyquest"))]
    #[cfg_attr(docsrs, doc(cfg(any(feature = "reqwest", feature = "nyquest"))))]
    pub fn new(project: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_transport(project, token, crate::transport::HttpTransport::new())
    }

    /// Create a client sending through `transport`.
    ///
    /// The anonymous user id is persisted with [`FileStore::platform_default`](crate::FileStore::platform_default).
    pub fn with_transport(
        project: impl Into<String>,
        token: impl Into<String>,
        transport: impl Transport,
    ) -> Self {
        let token = token.into();
        Self {
            inner: Arc::new(LogSnagClientInner {
                project: project.into(),
                authorization: format!("Bearer {token}"),
                transport: Arc::new(transport),
                identity: IdentityResolver::new(crate::FileStore::platform_default()),
                enable_trace: true,
                print_internal_error: false,
            }),
        }
    }

    /// The project slug stamped into every request.
    pub fn project(&self) -> &str {
        &self.inner.project
    }

    /// Publish an event.
    ///
    /// Resolves to `true` when LogSnag accepted it.
    pub async fn publish(&self, options: &PublishOptions) -> Result<bool, LogSnagClientError> {
        let request = self.publish_request(options);
        self.dispatch(Operation::Publish, request).await
    }

    /// Publish an event, delivering the outcome as a stream.
    ///
    /// The request is built immediately, including anonymous user id resolution,
    /// and sent when the stream is first polled.
    pub fn publish_as_stream(&self, options: &PublishOptions) -> ResponseStream {
        let request = self.publish_request(options);
        self.dispatch_stream(Operation::Publish, request)
    }

    /// Identify a user.
    ///
    /// Resolves to `true` when LogSnag accepted it.
    pub async fn identify(&self, options: &IdentifyOptions) -> Result<bool, LogSnagClientError> {
        let request = self.identify_request(options);
        self.dispatch(Operation::Identify, request).await
    }

    /// Identify a user, delivering the outcome as a stream.
    pub fn identify_as_stream(&self, options: &IdentifyOptions) -> ResponseStream {
        let request = self.identify_request(options);
        self.dispatch_stream(Operation::Identify, request)
    }

    /// Build the request [`publish`](Self::publish) and
    /// [`publish_as_stream`](Self::publish_as_stream) send for `options`.
    pub fn publish_request(
        &self,
        options: &PublishOptions,
    ) -> Result<OutboundRequest, LogSnagClientError> {
        let body = serde_json::to_vec(&self.stamp_publish(options)?)?;
        Ok(self.build_request(LOG_ENDPOINT, body)?)
    }

    /// Build the request [`identify`](Self::identify) and
    /// [`identify_as_stream`](Self::identify_as_stream) send for `options`.
    pub fn identify_request(
        &self,
        options: &IdentifyOptions,
    ) -> Result<OutboundRequest, LogSnagClientError> {
        let body = serde_json::to_vec(&self.stamp_identify(options))?;
        Ok(self.build_request(IDENTIFY_ENDPOINT, body)?)
    }

    fn stamp_publish(&self, options: &PublishOptions) -> Result<PublishOptions, StorageError> {
        let mut stamped = options.clone();
        stamped.project = Some(self.inner.project.clone());
        if options.wants_generated_user_id() {
            stamped.user_id = self.inner.identity.resolve_user_id(true)?;
        }
        stamped.auto_add_user_id = false;
        Ok(stamped)
    }

    fn stamp_identify(&self, options: &IdentifyOptions) -> IdentifyOptions {
        let mut stamped = options.clone();
        stamped.project = Some(self.inner.project.clone());
        stamped
    }

    fn build_request(&self, url: &'static str, body: Vec<u8>) -> http::Result<OutboundRequest> {
        http::Request::builder()
            .method(Method::POST)
            .uri(url)
            .header(CONTENT_TYPE, headers::JSON_CONTENT_TYPE)
            .header(AUTHORIZATION, self.inner.authorization.as_str())
            .body(body)
    }

    async fn dispatch(
        &self,
        op: Operation,
        request: Result<OutboundRequest, LogSnagClientError>,
    ) -> Result<bool, LogSnagClientError> {
        let fut = async move {
            let request = request?;
            self.inner
                .transport
                .send(request)
                .await
                .map_err(LogSnagClientError::from)
        };
        let res = if self.inner.enable_trace {
            let span = match op {
                Operation::Publish => tracing::trace_span!("publish", target = LOG_ENDPOINT),
                Operation::Identify => {
                    tracing::trace_span!("identify", target = IDENTIFY_ENDPOINT)
                }
            };
            fut.instrument(span).await
        } else {
            fut.await
        };
        res.map_err(|e| self.report(op, e))
    }

    fn dispatch_stream(
        &self,
        op: Operation,
        request: Result<OutboundRequest, LogSnagClientError>,
    ) -> ResponseStream {
        let stream = match request {
            Ok(request) => self
                .inner
                .transport
                .send_stream(request)
                .map_err(LogSnagClientError::from)
                .boxed(),
            Err(e) => stream::once(future::ready(Err(e))).boxed(),
        };
        let client = self.clone();
        stream.map_err(move |e| client.report(op, e)).boxed()
    }

    fn report(&self, op: Operation, err: LogSnagClientError) -> LogSnagClientError {
        if self.inner.enable_trace {
            tracing::error!(operation = op.name(), err = ?err);
        } else if self.inner.print_internal_error {
            eprintln!("[logsnag] error in {}: {err}", op.name());
        }
        err
    }
}
