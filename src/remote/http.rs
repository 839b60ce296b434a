use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;

use crate::canvas::ImageFormatKind;

use super::{
    CancelToken, EditRequest, EditService, ImagePayload, RemoteError, RemoteResult,
    SegmentationRequest, SegmentationService, UpscaleRequest, UpscaleService,
};

const EDIT_PATH: &str = "v1/images/edit";
const SEGMENT_PATH: &str = "v1/images/segment";
const UPSCALE_PATH: &str = "v1/images/upscale";

/// Multipart/HTTP client for an image service exposing edit, segment and upscale routes.
#[derive(Debug, Clone)]
pub struct HttpImageService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpImageService {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> RemoteResult<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(RemoteError::InvalidRequest {
                message: format!("endpoint must be an http(s) URL: {endpoint}"),
            });
        }

        // `None` also lifts the blocking client's built-in 30s limit.
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(network_error)?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let request = self.client.post(format!("{}/{path}", self.endpoint));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn send(&self, path: &str, form: Form, cancel: &CancelToken) -> RemoteResult<Vec<u8>> {
        cancel.check()?;
        tracing::debug!(endpoint = %self.endpoint, path, "sending image request");
        let response = self.post(path).multipart(form).send().map_err(network_error)?;
        cancel.check()?;
        read_image_response(response)
    }
}

impl EditService for HttpImageService {
    fn edit(&self, request: &EditRequest, cancel: &CancelToken) -> RemoteResult<Vec<u8>> {
        let mut form = Form::new()
            .text("prompt", request.prompt())
            .text("style", request.style.as_str())
            .part("image", image_part(&request.image, "image")?)
            .part(
                "mask",
                image_part(&ImagePayload::png(request.mask_png.clone()), "mask")?,
            );
        if let Some(negative) = request
            .negative_instruction
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            form = form.text("negative_prompt", negative.to_string());
        }
        self.send(EDIT_PATH, form, cancel)
    }
}

impl SegmentationService for HttpImageService {
    fn segment(
        &self,
        request: &SegmentationRequest,
        cancel: &CancelToken,
    ) -> RemoteResult<Vec<u8>> {
        let form = Form::new().part("image", image_part(&request.image, "image")?);
        self.send(SEGMENT_PATH, form, cancel)
    }
}

impl UpscaleService for HttpImageService {
    fn upscale(&self, request: &UpscaleRequest, cancel: &CancelToken) -> RemoteResult<Vec<u8>> {
        let form = Form::new()
            .text("scale", request.factor.value().to_string())
            .part(
                "image",
                image_part(&ImagePayload::png(request.image_png.clone()), "image")?,
            );
        self.send(UPSCALE_PATH, form, cancel)
    }
}

fn image_part(payload: &ImagePayload, stem: &str) -> RemoteResult<Part> {
    let extension = match payload.format {
        ImageFormatKind::Png => "png",
        ImageFormatKind::Jpeg => "jpg",
        ImageFormatKind::Webp => "webp",
    };
    Part::bytes(payload.bytes.clone())
        .file_name(format!("{stem}.{extension}"))
        .mime_str(payload.mime_type())
        .map_err(|err| RemoteError::InvalidRequest {
            message: err.to_string(),
        })
}

fn read_image_response(response: Response) -> RemoteResult<Vec<u8>> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    let body = response.bytes().map_err(network_error)?;

    if !status.is_success() {
        return Err(RemoteError::Provider {
            status: status.as_u16(),
            message: provider_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string()),
        });
    }
    if body.is_empty() || is_json {
        if let Some(message) = provider_message(&body) {
            tracing::warn!(%message, "service answered without an image");
        }
        return Err(RemoteError::MissingPayload);
    }
    Ok(body.to_vec())
}

/// Human-readable message from a JSON error body (`{"error": {"message": ..}}`,
/// `{"error": ".."}` or `{"message": ".."}`), falling back to short plain text.
pub(super) fn provider_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        let message = value
            .pointer("/error/message")
            .or_else(|| value.get("error"))
            .or_else(|| value.get("message"))
            .and_then(serde_json::Value::as_str);
        return message.map(str::to_string);
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    (!text.is_empty() && text.len() <= 512).then(|| text.to_string())
}

fn network_error(err: reqwest::Error) -> RemoteError {
    RemoteError::Network {
        message: err.to_string(),
    }
}
