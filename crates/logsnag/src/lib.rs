//! Client for [LogSnag](https://logsnag.com), an event tracking service.
//!
//! A [`LogSnagClient`] reports two kinds of facts to LogSnag: an event happened
//! ([`publish`](LogSnagClient::publish)), and a user has some properties
//! ([`identify`](LogSnagClient::identify)). Every operation is available both as a
//! future and as a one-item [`ResponseStream`]; the two shapes send identical requests.
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), logsnag::LogSnagClientError> {
//! use logsnag::{LogSnagClient, PublishOptions};
//!
//! let client = LogSnagClient::new("my-project", "my-token");
//! let ok = client
//!     .publish(
//!         &PublishOptions::new("waitlist", "User Joined")
//!             .with_icon("🎉")
//!             .with_auto_add_user_id(true),
//!     )
//!     .await?;
//! assert!(ok);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! ### Http backend
//!
//! - `reqwest`: use [`reqwest`] as the HTTP backend without enabling any TLS features.
//!   - `reqwest-default-tls` (default): use [`reqwest`] with its default TLS provider.
//!   - `reqwest-rustls`: use [`reqwest`] as the HTTP backend and [`rustls`] TLS provider.
//! - [`nyquest`]: A platform native HTTP client, provides smaller binary size.
//!
//!   To use this, you need to register the http client provider in your application, see
//!   <https://docs.rs/nyquest-preset/latest/nyquest_preset/#quick-start> for more details.
//!
//! Without any backend enabled, a [`Transport`] must be supplied to the client.
//!
//! [`reqwest`]: https://docs.rs/reqwest
//! [`rustls`]: https://docs.rs/rustls
//! [`nyquest`]: https://docs.rs/nyquest
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod client;
pub mod identity;
mod options;
pub mod transport;

pub use client::{
    IDENTIFY_ENDPOINT, LOG_ENDPOINT, LogSnagClient, LogSnagClientBuilder,
    LogSnagClientBuilderError, LogSnagClientError, ResponseStream,
};
pub use identity::{FileStore, IdentityResolver, KeyValueStore, MemoryStore, StorageError};
pub use options::{IdentifyOptions, PublishOptions};
pub use transport::{OutboundRequest, RecordingTransport, Transport, TransportError};

#[cfg(test)]
#[cfg_attr(test, ctor::ctor)]
fn init() {
    // Initialize the tracing subscriber for tests
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .init();
}
