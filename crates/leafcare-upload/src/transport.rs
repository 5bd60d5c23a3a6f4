//! Service endpoints and the HTTP transport seam.

use std::time::Duration;

use leafcare_core::CapturedImage;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use thiserror::Error;
use url::Url;

/// Multipart field name carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Default bound on one request, including body transfer.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved URLs of the diagnosis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    base: Url,
    upload: Url,
    history: Url,
}

impl ServiceEndpoints {
    /// Resolves `/upload` and `/history` against a base URL.
    ///
    /// A base path without trailing slash is treated as a directory, so
    /// `https://host/api` resolves to `https://host/api/upload`.
    ///
    /// # Errors
    /// Returns [`EndpointError`] when the URL does not parse, is not http(s),
    /// or cannot be a base.
    pub fn from_base(base: &str) -> Result<Self, EndpointError> {
        let mut base =
            Url::parse(base.trim()).map_err(|error| EndpointError::Parse(error.to_string()))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(EndpointError::UnsupportedScheme(base.scheme().to_string()));
        }
        if base.cannot_be_a_base() {
            return Err(EndpointError::Parse("url cannot be a base".to_string()));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        let upload = base
            .join("upload")
            .map_err(|error| EndpointError::Parse(error.to_string()))?;
        let history = base
            .join("history")
            .map_err(|error| EndpointError::Parse(error.to_string()))?;

        Ok(Self {
            base,
            upload,
            history,
        })
    }

    /// Normalized base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `POST` target for image uploads.
    pub fn upload(&self) -> &Url {
        &self.upload
    }

    /// `GET` target for diagnosis history.
    pub fn history(&self) -> &Url {
        &self.history
    }
}

/// Raw HTTP response handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl HttpResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract transport used by the upload controller and history viewer.
pub trait DiagnosisTransport: Send + Sync {
    /// Posts one image as a single-part multipart body.
    ///
    /// # Errors
    /// Returns [`TransportError`] when no response was received.
    fn post_image(&self, endpoint: &Url, image: &CapturedImage)
    -> Result<HttpResponse, TransportError>;

    /// Issues a `GET` request.
    ///
    /// # Errors
    /// Returns [`TransportError`] when no response was received.
    fn get(&self, endpoint: &Url) -> Result<HttpResponse, TransportError>;
}

/// Blocking `reqwest` transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns [`TransportError::Client`] when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Client(error.to_string()))?;
        Ok(Self { client })
    }
}

impl DiagnosisTransport for HttpTransport {
    fn post_image(
        &self,
        endpoint: &Url,
        image: &CapturedImage,
    ) -> Result<HttpResponse, TransportError> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.filename().to_string())
            .mime_str(image.mime_type())
            .map_err(|error| TransportError::Client(error.to_string()))?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(endpoint.clone())
            .multipart(form)
            .send()
            .map_err(classify_reqwest_error)?;
        read_response(response)
    }

    fn get(&self, endpoint: &Url) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(endpoint.clone())
            .send()
            .map_err(classify_reqwest_error)?;
        read_response(response)
    }
}

fn read_response(response: Response) -> Result<HttpResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response.text().map_err(classify_reqwest_error)?;
    Ok(HttpResponse { status, body })
}

fn classify_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::TimedOut
    } else {
        TransportError::Unreachable(error.to_string())
    }
}

/// Endpoint configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// URL failed to parse.
    #[error("invalid service url: {0}")]
    Parse(String),
    /// URL scheme is neither http nor https.
    #[error("service url must use http or https, got {0}")]
    UnsupportedScheme(String),
}

/// Failures where no HTTP response was obtained.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, or broken body transfer.
    #[error("service unreachable: {0}")]
    Unreachable(String),
    /// Request exceeded the configured timeout.
    #[error("request timed out")]
    TimedOut,
    /// Request could not be built.
    #[error("http client failure: {0}")]
    Client(String),
}
