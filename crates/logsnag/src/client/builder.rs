use crate::{
    client::{LogSnagClient, LogSnagClientInner},
    identity::{IdentityResolver, KeyValueStore},
    transport::Transport,
};
use std::sync::Arc;

/// Builder error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LogSnagClientBuilderError {
    /// Missing required field in the builder.
    #[error("missing required field: {0}")]
    Missing(&'static str),
}

/// Builder for creating a LogSnag client with required and optional parameters.
pub struct LogSnagClientBuilder {
    project: Option<String>,
    token: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn KeyValueStore>>,
    enable_trace: bool,
    print_internal_error: bool,
}

type Result<T, E = LogSnagClientBuilderError> = std::result::Result<T, E>;

impl Default for LogSnagClientBuilder {
    fn default() -> Self {
        Self {
            project: None,
            token: None,
            transport: None,
            store: None,
            enable_trace: true,
            print_internal_error: false,
        }
    }
}

impl LogSnagClientBuilder {
    /// Set the project slug events are reported to.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the API token, sent as a bearer credential.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the transport requests are sent through.
    ///
    /// Defaults to [`HttpTransport`](crate::transport::HttpTransport) when an HTTP
    /// backend feature is enabled; required otherwise.
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the store the anonymous user id is persisted in.
    ///
    /// Defaults to [`FileStore::platform_default`](crate::FileStore::platform_default).
    pub fn store(mut self, store: impl KeyValueStore) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Enable or disable tracing for the client.
    ///
    /// Enabled by default.
    /// If enabled, client will log via [`tracing`](https://docs.rs/tracing/latest/tracing/) crate.
    pub fn enable_trace(mut self, enable_trace: bool) -> Self {
        self.enable_trace = enable_trace;
        self
    }

    /// Enable or disable printing errors to stderr.
    ///
    /// Disabled by default.
    /// If enabled and tracing is not enabled, client will print errors to stderr.
    pub fn print_internal_error(mut self, print_internal_error: bool) -> Self {
        self.print_internal_error = print_internal_error;
        self
    }

    /// Build the client with the provided configuration.
    pub fn build(self) -> Result<LogSnagClient> {
        let project = self
            .project
            .ok_or(LogSnagClientBuilderError::Missing("project"))?;
        let token = self
            .token
            .ok_or(LogSnagClientBuilderError::Missing("token"))?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(crate::FileStore::platform_default()));

        Ok(LogSnagClient {
            inner: Arc::new(LogSnagClientInner {
                project,
                authorization: format!("Bearer {token}"),
                transport,
                identity: IdentityResolver::new(store),
                enable_trace: self.enable_trace,
                print_internal_error: self.print_internal_error,
            }),
        })
    }
}

#[cfg(any(feature = "reqwest", feature = "nyquest"))]
fn default_transport() -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(crate::transport::HttpTransport::new()))
}

#[cfg(not(any(feature = "reqwest", feature = "nyquest")))]
fn default_transport() -> Result<Arc<dyn Transport>> {
    Err(LogSnagClientBuilderError::Missing("transport"))
}
