use crate::transport::{OutboundRequest, Transport, TransportError};
use futures_util::future::BoxFuture;

cfg_if::cfg_if! {
    if #[cfg(feature = "reqwest")] {
        mod reqwest;
        pub(crate) use self::reqwest::*;
    } else if #[cfg(feature = "nyquest")] {
        mod nyquest;
        pub(crate) use self::nyquest::*;
    }
}

pub(crate) const USER_AGENT_VALUE: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Sends requests over HTTPS with a process-wide HTTP client.
///
/// The client is created on first use and shared by every `HttpTransport`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

impl HttpTransport {
    /// Create a transport using the enabled HTTP backend.
    pub fn new() -> Self {
        Self
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'static, Result<bool, TransportError>> {
        Box::pin(async move {
            let http_client = HttpClient::get_or_try_init().await?;
            let res = http_client.execute(request).await?;
            let status = res.status();
            if !status.is_success() {
                let message = res.text().await?;
                tracing::trace!(%status, %message);
                return Err(TransportError::Http {
                    status: status.into(),
                    message: message.into_boxed_str(),
                });
            }
            tracing::trace!(%status);
            Ok(true)
        })
    }
}
