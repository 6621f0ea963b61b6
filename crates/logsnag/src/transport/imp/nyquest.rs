use crate::{
    client::headers::JSON_CONTENT_TYPE,
    transport::{OutboundRequest, imp::USER_AGENT_VALUE},
};
use async_lock::OnceCell;
use http::header::CONTENT_TYPE;
use std::fmt;

static HTTP_CLIENT: OnceCell<HttpClient> = OnceCell::new();

#[derive(Clone)]
pub(crate) struct HttpClient {
    inner: nyquest::AsyncClient,
}

pub(crate) struct Response {
    inner: nyquest::r#async::Response,
}

pub(crate) struct StatusCode {
    inner: nyquest::StatusCode,
}

pub type Error = nyquest::Error;
type Result<T, E = Error> = std::result::Result<T, E>;

impl HttpClient {
    async fn new() -> Result<Self> {
        Ok(Self {
            inner: nyquest::ClientBuilder::default()
                .user_agent(USER_AGENT_VALUE)
                .build_async()
                .await?,
        })
    }

    pub async fn get_or_try_init() -> Result<&'static Self> {
        HTTP_CLIENT.get_or_try_init(HttpClient::new).await
    }

    pub async fn execute(&self, request: OutboundRequest) -> Result<Response> {
        let (parts, body) = request.into_parts();

        // nyquest attaches the content type to the body
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(JSON_CONTENT_TYPE)
            .to_owned();

        let mut inner: nyquest::r#async::Request =
            nyquest::Request::post(parts.uri.to_string());
        for (name, value) in parts.headers.iter() {
            if *name == CONTENT_TYPE {
                continue;
            }
            if let Ok(value) = value.to_str() {
                inner = inner.with_header(name.as_str().to_owned(), value.to_owned());
            }
        }
        let inner = inner.with_body(nyquest::Body::bytes(body, content_type));

        let res = self.inner.request(inner).await?;
        Ok(Response { inner: res })
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
        self.inner.is_successful()
    }
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> u16 {
        status.inner.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
