//! Generation service implementation: caching, retries, quota tracking and
//! payload extraction for every media lane.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::validation::validate_request;
use super::GenerationService;
use crate::auth::AuthManager;
use crate::cache::{CacheKey, ResponseCache};
use crate::config::{MediaConfig, ModelProfile};
use crate::error::{map_failure, ErrorKind, GenerationError, MediaResult, RawFailure};
use crate::media::wav;
use crate::observability::{Logger, MediaMetrics};
use crate::resilience::{RateLimitTracker, RetryPolicy};
use crate::transport::{endpoints, HttpMethod, HttpTransport, RequestBuilder, ResponseParser};
use crate::types::{
    default_safety_settings, AudioOutput, Blob, Content, FinishReason, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, GenerationOutput, GenerationRequest, ImageOutput,
    MediaKind, Part, ResponseModality, SpeechConfig, TextOutput,
};

/// Per-model state: which model serves the lane, its cache and its quota.
struct Lane {
    profile: ModelProfile,
    cache: ResponseCache<GenerationOutput>,
    tracker: RateLimitTracker,
}

impl Lane {
    fn new(config: &MediaConfig, kind: MediaKind) -> Self {
        let profile = config.profile(kind).clone();
        Self {
            cache: ResponseCache::new(config.cache_ttl),
            tracker: RateLimitTracker::new(profile.limits),
            profile,
        }
    }
}

/// Cache key of a request.
///
/// The normalized prompt is always part of the key. Edits add a digest of the
/// reference image, text adds the locale and audio adds the locale and voice.
pub fn cache_key(request: &GenerationRequest, default_voice: &str) -> CacheKey {
    let key = CacheKey::for_prompt(request.prompt());

    match request {
        GenerationRequest::Image(image) => match image.reference() {
            Some(reference) => {
                let digest = Sha256::digest(reference.data());
                let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
                key.with_discriminator(&format!("edit:{hex}"))
            }
            None => key,
        },
        GenerationRequest::Text(text) => key.with_discriminator(text.locale().code()),
        GenerationRequest::Audio(audio) => key
            .with_discriminator(audio.locale().code())
            .with_discriminator(audio.voice().unwrap_or(default_voice)),
    }
}

/// Implementation of the [`GenerationService`].
pub struct GenerationServiceImpl {
    config: Arc<MediaConfig>,
    transport: Arc<dyn HttpTransport>,
    request_builder: RequestBuilder,
    retry_policy: RetryPolicy,
    image: Lane,
    text: Lane,
    audio: Lane,
    logger: Arc<dyn Logger>,
    metrics: MediaMetrics,
}

impl GenerationServiceImpl {
    /// Create a new generation service.
    pub fn new(
        config: Arc<MediaConfig>,
        transport: Arc<dyn HttpTransport>,
        auth_manager: Arc<dyn AuthManager>,
        logger: Arc<dyn Logger>,
        metrics: MediaMetrics,
    ) -> Self {
        let request_builder = RequestBuilder::new(
            config.base_url.clone(),
            config.api_version.clone(),
            auth_manager.clone_box(),
        );

        Self {
            retry_policy: RetryPolicy::new(config.retry),
            image: Lane::new(&config, MediaKind::Image),
            text: Lane::new(&config, MediaKind::Text),
            audio: Lane::new(&config, MediaKind::Audio),
            config,
            transport,
            request_builder,
            logger,
            metrics,
        }
    }

    /// Replace the retry policy derived from the configuration.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    fn lane(&self, kind: MediaKind) -> &Lane {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Text => &self.text,
            MediaKind::Audio => &self.audio,
        }
    }

    /// The response cache of a lane.
    pub fn cache(&self, kind: MediaKind) -> &ResponseCache<GenerationOutput> {
        &self.lane(kind).cache
    }

    /// The quota tracker of a lane.
    pub fn tracker(&self, kind: MediaKind) -> &RateLimitTracker {
        &self.lane(kind).tracker
    }

    /// The model profile serving a lane.
    pub fn profile(&self, kind: MediaKind) -> &ModelProfile {
        &self.lane(kind).profile
    }

    /// Builds the `generateContent` body for a request.
    pub fn build_payload(&self, request: &GenerationRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::text(request.prompt())];

        let params = request.params();
        let mut generation_config = GenerationConfig {
            temperature: Some(params.temperature),
            top_p: Some(params.top_p),
            max_output_tokens: Some(params.max_output_tokens),
            ..Default::default()
        };

        match request {
            GenerationRequest::Image(image) => {
                if let Some(reference) = image.reference() {
                    parts.push(Part::inline(reference.mime_type(), STANDARD.encode(reference.data())));
                }
                generation_config.response_modalities =
                    Some(vec![ResponseModality::Text, ResponseModality::Image]);
            }
            GenerationRequest::Audio(audio) => {
                let voice = audio.voice().unwrap_or(&self.config.voice);
                generation_config.response_modalities = Some(vec![ResponseModality::Audio]);
                generation_config.speech_config = Some(SpeechConfig::prebuilt(voice));
            }
            GenerationRequest::Text(_) => {}
        }

        GenerateContentRequest {
            contents: vec![Content::user(parts)],
            generation_config,
            safety_settings: default_safety_settings(),
        }
    }

    /// Sends `body` until it succeeds, fails terminally, or `cancel` fires.
    async fn execute(
        &self,
        kind: MediaKind,
        body: &GenerateContentRequest,
        cancel: &CancellationToken,
    ) -> MediaResult<GenerateContentResponse> {
        let lane = self.lane(kind);
        let path = endpoints::generate_content(&lane.profile.model);
        let mut attempt = 0u32;

        loop {
            let http_request = self
                .request_builder
                .build_request(HttpMethod::Post, &path, Some(body))?;

            let sent = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                sent = self.transport.send(http_request) => sent,
            };

            let error = match sent {
                Ok(response) => match ResponseParser::parse_response(response) {
                    Ok(parsed) => return Ok(parsed),
                    Err(error) => error,
                },
                Err(transport_error) => map_failure(RawFailure::Transport(transport_error)),
            };

            if error.kind() == ErrorKind::RateLimited {
                lane.tracker.on_rate_limited();
                self.metrics.record_rate_limit(kind);
            }

            let Some(delay) = self.retry_policy.should_retry(error.kind(), attempt) else {
                return Err(error);
            };

            attempt += 1;
            self.logger.warn(
                "Generation attempt failed, retrying",
                json!({
                    "kind": kind.as_str(),
                    "model": lane.profile.model,
                    "attempt": attempt,
                    "delay_ms": delay.as_millis() as u64,
                    "retry_after_hint_ms": error.retry_after().map(|d| d.as_millis() as u64),
                    "error": error.to_string(),
                }),
            );
            self.metrics.record_retry(kind, attempt);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Rejects blocked prompts and candidates that did not finish normally.
    fn check_finish(&self, kind: MediaKind, response: &GenerateContentResponse) -> MediaResult<()> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            self.metrics.record_stopped(kind, reason);
            return Err(GenerationError::Stopped {
                reason: format!("prompt blocked ({reason})"),
            });
        }

        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| GenerationError::malformed("response has no candidates"))?;

        match candidate.finish_reason {
            Some(FinishReason::Stop) => Ok(()),
            Some(reason) => {
                self.metrics.record_stopped(kind, reason.as_str());
                Err(GenerationError::Stopped {
                    reason: reason.to_string(),
                })
            }
            None => Err(GenerationError::malformed("first candidate has no finish reason")),
        }
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> MediaResult<GenerationOutput> {
        validate_request(request)?;

        let kind = request.kind();
        let lane = self.lane(kind);
        let key = cache_key(request, &self.config.voice);

        if let Some(hit) = lane.cache.get(&key) {
            self.metrics.record_cache_lookup(kind, true);
            self.logger.debug(
                "Serving generation from cache",
                json!({"kind": kind.as_str(), "key": key.as_str()}),
            );
            return Ok(hit);
        }
        self.metrics.record_cache_lookup(kind, false);

        let body = self.build_payload(request);
        let response = self.execute(kind, &body, cancel).await?;

        lane.tracker.on_success(self.config.tokens_per_call);
        self.metrics.record_quota(kind, &lane.tracker.current());
        if let Some(usage) = &response.usage_metadata {
            self.metrics.record_tokens(kind, usage);
        }

        self.check_finish(kind, &response)?;
        let output = extract_output(kind, &lane.profile.model, response)?;

        self.metrics.record_payload(kind, output.payload_len());
        lane.cache.put(key, output.clone());

        Ok(output)
    }
}

fn first_inline<'a>(parts: &'a [Part], media_type: &str) -> Option<&'a Blob> {
    parts
        .iter()
        .filter_map(Part::as_inline_data)
        .find(|blob| {
            blob.mime_type
                .parse::<mime::Mime>()
                .is_ok_and(|m| m.type_().as_str() == media_type)
        })
}

fn decode_blob(blob: &Blob) -> MediaResult<Bytes> {
    let data = STANDARD.decode(blob.data.trim())?;
    if data.is_empty() {
        return Err(GenerationError::malformed("inline payload is empty"));
    }
    Ok(Bytes::from(data))
}

/// Pulls the lane's payload out of the first candidate.
fn extract_output(
    kind: MediaKind,
    model: &str,
    response: GenerateContentResponse,
) -> MediaResult<GenerationOutput> {
    let GenerateContentResponse {
        candidates,
        model_version,
        ..
    } = response;

    let parts = candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    match kind {
        MediaKind::Image => {
            let blob = first_inline(&parts, "image")
                .ok_or_else(|| GenerationError::malformed("first candidate has no inline image"))?;
            Ok(GenerationOutput::Image(ImageOutput {
                data: decode_blob(blob)?,
                mime_type: blob.mime_type.clone(),
                model_version,
            }))
        }
        MediaKind::Text => {
            let text: String = parts.iter().filter_map(Part::as_text).collect();
            if text.trim().is_empty() {
                return Err(GenerationError::malformed("first candidate has no text"));
            }
            Ok(GenerationOutput::Text(TextOutput {
                text,
                model: model_version.unwrap_or_else(|| model.to_string()),
            }))
        }
        MediaKind::Audio => {
            let blob = first_inline(&parts, "audio")
                .ok_or_else(|| GenerationError::malformed("first candidate has no inline audio"))?;
            let data = decode_blob(blob)?;
            let sample_rate = wav::parse_sample_rate(&blob.mime_type);
            Ok(GenerationOutput::Audio(AudioOutput {
                duration: wav::estimate_duration(data.len(), sample_rate),
                data,
                mime_type: blob.mime_type.clone(),
                sample_rate,
            }))
        }
    }
}

#[async_trait]
impl GenerationService for GenerationServiceImpl {
    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> MediaResult<GenerationOutput> {
        let kind = request.kind();
        let start = Instant::now();

        self.logger.debug(
            "Starting generation",
            json!({
                "kind": kind.as_str(),
                "model": self.lane(kind).profile.model,
                "prompt_chars": request.prompt().chars().count(),
                "locale": request.locale().map(|l| l.code()),
            }),
        );

        let result = self.run(&request, cancel).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        self.metrics
            .record_generation(kind, result.as_ref().err().map(GenerationError::kind), duration_ms);

        match &result {
            Ok(output) => self.logger.info(
                "Generation completed",
                json!({
                    "kind": kind.as_str(),
                    "duration_ms": duration_ms,
                    "payload_bytes": output.payload_len(),
                }),
            ),
            Err(GenerationError::Cancelled) => self.logger.info(
                "Generation cancelled",
                json!({"kind": kind.as_str(), "duration_ms": duration_ms}),
            ),
            Err(error) => self.logger.error(
                "Generation failed",
                json!({
                    "kind": kind.as_str(),
                    "error_kind": error.kind().as_str(),
                    "error": error.to_string(),
                    "duration_ms": duration_ms,
                }),
            ),
        }

        result
    }
}
