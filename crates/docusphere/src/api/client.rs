// reqwest implementation of `DocumentApi`.
//
// Endpoints are built by appending percent-encoded path segments to the
// configured base URL, so department labels and document ids never need
// manual escaping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{ApiError, DocumentApi, UploadRequest};
use crate::config::ApiConfig;
use crate::models::{Document, ErrorBody, Notification, QnaPair, QuestionCreate, UploadResponse};

pub struct HttpDocumentApi {
    http: Client,
    base_url: Url,
    page_limit: u32,
}

impl HttpDocumentApi {
    pub fn new(base_url: &str, timeout: Duration, page_limit: u32) -> Result<Self, ApiError> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: trimmed.to_string(),
                message: "URL cannot carry a path".to_string(),
            });
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            page_limit,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(config.trimmed_base_url(), config.timeout(), config.page_limit)
    }

    /// Join `segments` onto the base path. A trailing `""` segment yields a
    /// trailing slash (`/documents/`).
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base URLs are rejected in `new`, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn paged(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair("skip", "0")
            .append_pair("limit", &self.page_limit.to_string());
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().await?;
        decode(url, response).await
    }
}

/// Read the body of a 2xx response, mapping other statuses to
/// `ApiError::Http`.
async fn read_body(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Http {
            status: status.as_u16(),
            detail: error_detail(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            }),
        });
    }
    Ok(body)
}

async fn decode<T: DeserializeOwned>(url: Url, response: Response) -> Result<T, ApiError> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode {
        endpoint: url.path().to_string(),
        message: e.to_string(),
    })
}

/// Extract `detail` from an error body. Validation errors carry a structured
/// detail, which is rendered as JSON.
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl DocumentApi for HttpDocumentApi {
    async fn list_all_documents(&self) -> Result<Vec<Document>, ApiError> {
        let mut url = self.endpoint(&["documents", ""]);
        self.paged(&mut url);
        self.get_json(url).await
    }

    async fn list_department_documents(
        &self,
        department: &str,
    ) -> Result<Vec<Document>, ApiError> {
        let mut url = self.endpoint(&["documents", department]);
        self.paged(&mut url);
        self.get_json(url).await
    }

    async fn upload_document(&self, request: UploadRequest) -> Result<UploadResponse, ApiError> {
        let url = self.endpoint(&["documents", "upload"]);
        info!(
            "Uploading {} ({} bytes) for {}",
            request.file_name,
            request.bytes.len(),
            request.department
        );

        let form = Form::new()
            .text("title", request.title)
            .text("department", request.department)
            .text("user_id", request.user_id)
            .part("file", Part::bytes(request.bytes).file_name(request.file_name));

        let response = self.http.post(url.clone()).multipart(form).send().await?;
        decode(url, response).await
    }

    async fn list_questions(&self, document_id: &str) -> Result<Vec<QnaPair>, ApiError> {
        let url = self.endpoint(&["documents", document_id, "questions"]);
        self.get_json(url).await
    }

    async fn create_question(
        &self,
        document_id: &str,
        question_text: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["documents", document_id, "questions"]);
        debug!("POST {}", url);
        let response = self
            .http
            .post(url.clone())
            .json(&QuestionCreate { question_text })
            .send()
            .await?;
        read_body(response).await.map(|_| ())
    }

    async fn list_notifications(&self, department: &str) -> Result<Vec<Notification>, ApiError> {
        let url = self.endpoint(&["notifications", department]);
        self.get_json(url).await
    }
}
