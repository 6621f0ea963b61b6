use crate::transport::{OutboundRequest, imp::USER_AGENT_VALUE};
use async_lock::OnceCell;
use std::fmt;

static HTTP_CLIENT: OnceCell<HttpClient> = OnceCell::new();

#[derive(Clone)]
pub(crate) struct HttpClient {
    inner: reqwest::Client,
}

pub(crate) struct Response {
    inner: reqwest::Response,
}

pub(crate) struct StatusCode {
    inner: http::StatusCode,
}

pub type Error = reqwest::Error;
type Result<T, E = Error> = std::result::Result<T, E>;

impl HttpClient {
    async fn new() -> Result<Self> {
        Ok(Self {
            inner: reqwest::ClientBuilder::new()
                .user_agent(USER_AGENT_VALUE)
                .https_only(true)
                .build()?,
        })
    }

    pub async fn get_or_try_init() -> Result<&'static Self> {
        HTTP_CLIENT.get_or_try_init(HttpClient::new).await
    }

    pub async fn execute(&self, request: OutboundRequest) -> Result<Response> {
        let request = reqwest::Request::try_from(request)?;
        Ok(Response {
            inner: self.inner.execute(request).await?,
        })
    }
}

impl Response {
    pub fn status(&self) -> StatusCode {
        StatusCode {
            inner: self.inner.status(),
        }
    }

    pub async fn text(self) -> Result<String> {
        self.inner.text().await
    }
}

impl StatusCode {
    pub(crate) fn is_success(&self) -> bool {
        self.inner.is_success()
    }
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> u16 {
        status.inner.as_u16()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
