use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use std::io::Write;
use tokio_util::io::ReaderStream;

use crate::types::{
    ApiError, ChatData, ConvertData, ConvertOptions, Envelope, FailureKind, StatusData, UploadData,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL of the conversion service's API, e.g. `http://host:5000/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applied to small calls (status, convert-start, chat). Uploads and
    /// downloads run without an overall deadline.
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Outbound calls to the conversion service. No logic beyond request
/// shaping; callers interpret the results.
#[async_trait::async_trait]
pub trait ConversionApi: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadData, ApiError>;
    async fn upload_url(&self, url: &str) -> Result<UploadData, ApiError>;
    async fn start_conversion(
        &self,
        file_id: &str,
        output_format: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertData, ApiError>;
    async fn job_status(&self, job_id: &str) -> Result<StatusData, ApiError>;
    async fn chat(&self, message: &str, response_id: Option<&str>) -> Result<ChatData, ApiError>;
    fn download_url(&self, job_id: &str) -> String;
    /// Streams the finished output to `dest` via a temp file in the same
    /// directory, renamed into place on success.
    async fn download_to(&self, job_id: &str, dest: &Path) -> Result<PathBuf, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ApiError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let client = self.build_client()?;
        let response = client
            .post(self.endpoint(path))
            .timeout(self.settings.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_envelope(response).await
    }
}

#[async_trait::async_trait]
impl ConversionApi for ReqwestApi {
    async fn upload(&self, path: &Path) -> Result<UploadData, ApiError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        let len = file
            .metadata()
            .await
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?
            .len();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = reqwest::multipart::Part::stream_with_length(body, len).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let client = self.build_client()?;
        let response = client
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_envelope(response).await
    }

    async fn upload_url(&self, url: &str) -> Result<UploadData, ApiError> {
        self.post_json("/upload-url", &serde_json::json!({ "url": url }))
            .await
    }

    async fn start_conversion(
        &self,
        file_id: &str,
        output_format: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertData, ApiError> {
        self.post_json(
            "/convert",
            &serde_json::json!({
                "file_id": file_id,
                "output_format": output_format,
                "options": options,
            }),
        )
        .await
    }

    async fn job_status(&self, job_id: &str) -> Result<StatusData, ApiError> {
        let client = self.build_client()?;
        let response = client
            .get(self.endpoint(&format!("/status/{job_id}")))
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_envelope(response).await
    }

    async fn chat(&self, message: &str, response_id: Option<&str>) -> Result<ChatData, ApiError> {
        self.post_json(
            "/chat",
            &serde_json::json!({
                "message": message,
                "response_id": response_id,
            }),
        )
        .await
    }

    fn download_url(&self, job_id: &str) -> String {
        self.endpoint(&format!("/download/{job_id}"))
    }

    async fn download_to(&self, job_id: &str, dest: &Path) -> Result<PathBuf, ApiError> {
        let client = self.build_client()?;
        let response = client
            .get(self.download_url(job_id))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        crate::store::ensure_dir(dir)
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            tmp.write_all(&chunk)
                .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        }
        tmp.flush()
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        tmp.persist(dest)
            .map_err(|err| ApiError::new(FailureKind::Io, err.error.to_string()))?;
        Ok(dest.to_path_buf())
    }
}

/// Decodes the service envelope, preferring the service-provided message for
/// non-success responses and falling back to the HTTP status.
async fn decode_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;

    match serde_json::from_slice::<Envelope<T>>(&bytes) {
        Ok(envelope) => {
            if envelope.success {
                envelope
                    .data
                    .ok_or_else(|| ApiError::new(FailureKind::Decode, "missing data in envelope"))
            } else {
                let message = envelope
                    .error
                    .and_then(|err| err.message)
                    .unwrap_or_else(|| "The service reported an error".to_string());
                Err(ApiError::new(FailureKind::Service, message))
            }
        }
        Err(_) if !status.is_success() => Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        )),
        Err(err) => Err(ApiError::new(FailureKind::Decode, err.to_string())),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
