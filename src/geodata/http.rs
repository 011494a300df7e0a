use std::time::Duration;

use tracing::debug;

use crate::geodata::provider::ProviderError;

const USER_AGENT: &str = concat!("cartopress/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal blocking HTTP seam so providers can be exercised with canned
/// responses in tests.
pub trait HttpClient {
    /// GET `url` with query parameters, returning the response body.
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, ProviderError>;

    /// POST a form body to `url`, returning the response body.
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>, ProviderError>;
}

/// Production client over `reqwest::blocking`.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::transport(format!("building http client: {e}")))?;
        Ok(Self { client })
    }

    fn read_ok(response: reqwest::blocking::Response) -> Result<Vec<u8>, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::transport(format!(
                "upstream returned {status}"
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| ProviderError::transport(format!("reading body: {e}")))?;
        Ok(bytes.to_vec())
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, ProviderError> {
        debug!(url, "http get");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| ProviderError::transport(format!("GET {url}: {e}")))?;
        Self::read_ok(response)
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>, ProviderError> {
        debug!(url, "http post");
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .map_err(|e| ProviderError::transport(format!("POST {url}: {e}")))?;
        Self::read_ok(response)
    }
}
