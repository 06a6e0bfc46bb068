//! HTTP plumbing shared by the admin and doctor endpoints.

use std::sync::Arc;
use std::time::Duration;

use clinic_admin_core::Role;
use reqwest::header::HeaderValue;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::{Deserialize, DeserializeOwned};
use tracing::{debug, instrument};
use url::Url;

use super::ApiError;
use super::types::{Ack, ImageUpload};
use crate::config::ClientConfig;

/// Fallback message when the backend rejects a request without saying why.
const UNKNOWN_FAILURE: &str = "Request failed";

/// Clinic backend client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_timeout(config.backend_url.clone(), config.http_timeout)
    }

    /// Create a client for an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner { client, base_url }),
        })
    }

    /// Base URL every API path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, role: Role, action: &str) -> Result<Url, ApiError> {
        let path = format!("api/{}/{action}", role.api_scope());
        Ok(self.inner.base_url.join(&path)?)
    }

    /// Execute an authenticated GET.
    #[instrument(skip(self, token), fields(role = %role))]
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        role: Role,
        token: &SecretString,
        action: &str,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(role, action)?;
        let response = self
            .inner
            .client
            .get(url)
            .header(role.header_name(), token_header(token)?)
            .send()
            .await?;
        read_envelope(response).await
    }

    /// Execute an authenticated JSON POST.
    #[instrument(skip(self, token, body), fields(role = %role))]
    pub(crate) async fn post<T, B>(
        &self,
        role: Role,
        token: &SecretString,
        action: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(role, action)?;
        let response = self
            .inner
            .client
            .post(url)
            .header(role.header_name(), token_header(token)?)
            .json(body)
            .send()
            .await?;
        read_envelope(response).await
    }

    /// Execute an unauthenticated JSON POST (login).
    #[instrument(skip(self, body), fields(role = %role))]
    pub(crate) async fn post_anonymous<T, B>(
        &self,
        role: Role,
        action: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(role, action)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        read_envelope(response).await
    }

    /// Execute an authenticated multipart POST with text fields and one image.
    #[instrument(skip(self, token, fields, image), fields(role = %role, file = %image.file_name))]
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        role: Role,
        token: &SecretString,
        action: &str,
        fields: Vec<(&'static str, String)>,
        image: ImageUpload,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(role, action)?;

        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.mime_type)?;
        let form = fields
            .into_iter()
            .fold(Form::new().part("image", part), |form, (name, value)| {
                form.text(name, value)
            });

        let response = self
            .inner
            .client
            .post(url)
            .header(role.header_name(), token_header(token)?)
            .multipart(form)
            .send()
            .await?;
        read_envelope(response).await
    }
}

fn token_header(token: &SecretString) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(token.expose_secret())
        .map_err(|e| ApiError::InvalidRequest(format!("token is not a valid header value: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Decode a response body, honouring the `success` flag before the HTTP
/// status.
async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body: serde_json::Value = response.json().await?;

    let ack = Ack::deserialize(&body)?;
    if !ack.success {
        debug!(status = %status, message = ?ack.message, "Backend rejected request");
        return Err(ApiError::Rejected(
            ack.message.unwrap_or_else(|| UNKNOWN_FAILURE.to_string()),
        ));
    }

    Ok(T::deserialize(&body)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::with_timeout(Url::parse(base).unwrap(), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoints_are_scoped_by_role() {
        let client = client("http://localhost:4000/");
        assert_eq!(
            client.endpoint(Role::Admin, "all-doctors").unwrap().as_str(),
            "http://localhost:4000/api/admin/all-doctors"
        );
        assert_eq!(
            client.endpoint(Role::Doctor, "profile").unwrap().as_str(),
            "http://localhost:4000/api/doctor/profile"
        );
    }

    #[test]
    fn test_token_header_is_sensitive() {
        let value = token_header(&SecretString::from("abc.def.ghi")).unwrap();
        assert!(value.is_sensitive());
        assert!(token_header(&SecretString::from("line\nbreak")).is_err());
    }

    #[test]
    fn test_empty_token_is_still_sent() {
        // The backend, not the client, rejects a missing token.
        assert!(token_header(&SecretString::from("")).is_ok());
    }
}
