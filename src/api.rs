//! Generic REST client for the application API.

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;

use crate::{Error, Result};

/// The client user agent. Concatenates the package name and version,
/// e.g. `creative-hub/0.1.0`.
pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A thin wrapper over [`reqwest::Client`] that always sends session cookies,
/// speaks JSON, and surfaces non-success responses as [`Error`] values
/// carrying the server's body text. No retries and no timeouts; a caller that
/// no longer wants a result simply discards it (see the generation counters
/// in [`crate::work_view`]).
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Create a client rooted at the given API base URL.
    pub fn new(mut base: Url) -> Result<Self> {
        // `Url::join` resolves against the base's last `/`; without this a
        // base of `http://host/api` would drop its own path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            // The cookie store carries the session across calls, the way a
            // browser's `credentials: include` would.
            .cookie_store(true)
            .build()?;

        Ok(Self { http, base })
    }

    fn url(&self, path: &str) -> Result<Url> {
        // Absolute URLs pass through untouched; everything else is resolved
        // against the API base.
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.parse()?);
        }
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// `GET path`, decoding the JSON response into `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        debug!(%url, "api get");
        let res = self.http.get(url).send().await?;
        decode(res).await
    }

    /// `POST path` with a JSON body, decoding the JSON response into `T`.
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
        let url = self.url(path)?;
        debug!(%url, "api post");
        let res = self.http.post(url).json(body).send().await?;
        decode(res).await
    }

    /// `PUT path` with a JSON body, decoding the JSON response into `T`.
    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
        let url = self.url(path)?;
        debug!(%url, "api put");
        let res = self.http.put(url).json(body).send().await?;
        decode(res).await
    }

    /// `PATCH path` with a JSON body, decoding the JSON response into `T`.
    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
        let url = self.url(path)?;
        debug!(%url, "api patch");
        let res = self.http.patch(url).json(body).send().await?;
        decode(res).await
    }

    /// `DELETE path`. The response body is ignored beyond the status check.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        debug!(%url, "api delete");
        let res = self.http.delete(url).send().await?;
        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = res.text().await.unwrap_or_default();
            Err(Error::from_status(status, message))
        }
    }
}

/// Decode a response into `T`, or into the matching [`Error`] variant.
///
/// Decoding happens on the body text rather than via `Response::json` so
/// that a shape mismatch is reported as [`Error::Decode`] and never conflated
/// with a transport failure.
pub(crate) async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T> {
    let status = res.status();
    if !status.is_success() {
        let message = res.text().await.unwrap_or_default();
        return Err(Error::from_status(status, message));
    }

    let body = res.text().await?;
    serde_json::from_str(&body).map_err(Error::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base.parse().unwrap()).unwrap()
    }

    #[test]
    fn a_base_without_a_trailing_slash_keeps_its_path() {
        let api = client("http://host/api");
        assert_eq!(
            api.url("/works/w1").unwrap().as_str(),
            "http://host/api/works/w1"
        );
        // Same result as the already-normalized form.
        let api = client("http://host/api/");
        assert_eq!(
            api.url("/works/w1").unwrap().as_str(),
            "http://host/api/works/w1"
        );
    }

    #[test]
    fn absolute_urls_bypass_the_base() {
        let api = client("http://host/api");
        assert_eq!(
            api.url("http://elsewhere/x").unwrap().as_str(),
            "http://elsewhere/x"
        );
    }
}
