//! HTTP boundary to the analysis service.
//!
//! One call per submission: a multipart POST whose outcome is folded into
//! `Result<AnalysisResult, SubmitError>` before it reaches the controller.

mod response;

pub use response::{decode_failure, decode_success};

use crate::error::SubmitError;
use crate::model::{AnalysisResult, ClientConfig, SubmissionRequest};
use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Anything that can carry a submission to the analysis service.
pub trait AnalysisTransport {
    fn analyze(
        &self,
        request: SubmissionRequest,
    ) -> impl Future<Output = Result<AnalysisResult, SubmitError>> + Send;
}

/// reqwest-backed transport posting to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms));

        if let Some(path) = cfg.certificate_path.as_deref() {
            let cert = load_certificate(path)?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build().context("build HTTP client")?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Load a PEM or DER certificate, trying PEM first.
fn load_certificate(path: &std::path::Path) -> Result<reqwest::Certificate> {
    let raw = std::fs::read(path)
        .with_context(|| format!("read certificate {}", path.display()))?;
    reqwest::Certificate::from_pem(&raw)
        .or_else(|_| reqwest::Certificate::from_der(&raw))
        .with_context(|| format!("parse certificate {}", path.display()))
}

/// Build the multipart body with the fixed field names the service expects.
pub fn build_form(request: SubmissionRequest) -> Result<Form, SubmitError> {
    let SubmissionRequest { document, weights } = request;
    let len = document.bytes.len() as u64;
    let part = Part::stream_with_length(document.bytes, len)
        .file_name(document.file_name)
        .mime_str(document.mime.as_ref())?;

    let mut form = Form::new().part("file", part);
    for (name, value) in weights.fields() {
        form = form.text(name, value.to_string());
    }
    Ok(form)
}

impl AnalysisTransport for HttpTransport {
    async fn analyze(&self, request: SubmissionRequest) -> Result<AnalysisResult, SubmitError> {
        let size = request.document.bytes.len();
        let file_name = request.document.file_name.clone();
        let form = build_form(request)?;

        info!(endpoint = %self.endpoint, file = %file_name, bytes = size, "submitting analysis request");
        let resp = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        debug!(status = status.as_u16(), body_len = body.len(), "analysis response received");

        if status.is_success() {
            decode_success(&body)
        } else {
            Err(decode_failure(status.as_u16(), &body))
        }
    }
}
