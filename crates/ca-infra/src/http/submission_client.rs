//! Multipart POST of a [`CompositePayload`] to the registration service.

use std::time::Duration;

use async_trait::async_trait;
use ca_core::ports::{SubmissionTransportPort, TransportError, TransportResponse};
use ca_core::submission::{
    CompositePayload, COMPANY_REQUEST_CONTENT_TYPE, COMPANY_REQUEST_PART, RECAPTCHA_TOKEN_PART,
};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info_span, Instrument};

pub struct HttpSubmissionTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmissionTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// The request body is left to reqwest, which sets
    /// `multipart/form-data; boundary=...` itself.
    fn build_form(&self, payload: &CompositePayload) -> Result<Form, TransportError> {
        let company_request = Part::bytes(payload.company_request_json().to_vec())
            .mime_str(COMPANY_REQUEST_CONTENT_TYPE)
            .map_err(|err| self.request_error(err))?;

        let mut form = Form::new()
            .part(COMPANY_REQUEST_PART, company_request)
            .text(
                RECAPTCHA_TOKEN_PART,
                payload.recaptcha_token().as_str().to_owned(),
            );

        for attachment in payload.attachments() {
            let part = Part::bytes(attachment.file.data.to_vec())
                .file_name(attachment.file.name.clone())
                .mime_str(attachment.file.mime.as_str())
                .map_err(|err| self.request_error(err))?;
            form = form.part(attachment.part_name(), part);
        }

        Ok(form)
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        let endpoint = self.endpoint.clone();
        let detail = err.to_string();
        if err.is_connect() {
            TransportError::Connect { endpoint, detail }
        } else if err.is_timeout() {
            TransportError::Timeout { endpoint, detail }
        } else {
            TransportError::Request { endpoint, detail }
        }
    }

    fn request_error(&self, err: reqwest::Error) -> TransportError {
        TransportError::Request {
            endpoint: self.endpoint.clone(),
            detail: err.to_string(),
        }
    }
}

#[async_trait]
impl SubmissionTransportPort for HttpSubmissionTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn submit(&self, payload: &CompositePayload) -> Result<TransportResponse, TransportError> {
        let span = info_span!(
            "infra.http.submission.submit",
            endpoint = %self.endpoint,
            parts = payload.part_names().len()
        );

        async {
            let form = self.build_form(payload)?;
            let response = self
                .client
                .post(&self.endpoint)
                .multipart(form)
                .send()
                .await
                .map_err(|err| self.classify(err))?;

            let status = response.status().as_u16();
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    debug!(error = %err, "response body unreadable");
                    String::new()
                }
            };
            debug!(status, body_len = body.len(), "submission response received");

            Ok(TransportResponse { status, body })
        }
        .instrument(span)
        .await
    }
}
