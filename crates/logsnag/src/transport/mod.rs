//! The boundary that moves a built request to LogSnag and reports the outcome.
use futures_util::{
    StreamExt,
    future::BoxFuture,
    stream::{self, BoxStream},
};
use std::sync::Arc;

#[cfg(any(feature = "reqwest", feature = "nyquest"))]
mod imp;
mod recording;

#[cfg(any(feature = "reqwest", feature = "nyquest"))]
pub use self::imp::HttpTransport;
pub use self::recording::{RecordedRequest, RecordingTransport};

/// A fully built request: method, target, headers and JSON body.
pub type OutboundRequest = http::Request<Vec<u8>>;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// Non-successful HTTP response from LogSnag.
    #[error("http error [{status}] {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: Box<str>,
    },
    /// Error from the HTTP backend.
    #[cfg(any(feature = "reqwest", feature = "nyquest"))]
    #[error("http client error: {0}")]
    Imp(#[from] imp::Error),
    /// Error from a custom transport.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl TransportError {
    /// Wrap an arbitrary error from a custom transport.
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Other(err.into())
    }
}

/// Sends requests to LogSnag.
///
/// Both methods resolve to `Ok(true)` when the request was accepted.
pub trait Transport: Send + Sync + 'static {
    /// Send a request and resolve once with the outcome.
    fn send(&self, request: OutboundRequest) -> BoxFuture<'static, Result<bool, TransportError>>;

    /// Send a request, delivering the outcome as a one-item stream.
    ///
    /// The request is not sent until the stream is polled; dropping the stream first
    /// cancels it.
    fn send_stream(
        &self,
        request: OutboundRequest,
    ) -> BoxStream<'static, Result<bool, TransportError>> {
        stream::once(self.send(request)).boxed()
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'static, Result<bool, TransportError>> {
        (**self).send(request)
    }

    fn send_stream(
        &self,
        request: OutboundRequest,
    ) -> BoxStream<'static, Result<bool, TransportError>> {
        (**self).send_stream(request)
    }
}
