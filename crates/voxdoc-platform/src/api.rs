//! HTTP adapter for the companion backend.
//!
//! One client implements every remote port: document extraction,
//! answer generation, the combined call-turn pipeline, the voice
//! catalog, and remote synthesis. Uses browser `fetch()` via gloo-net
//! for WASM compatibility.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use web_sys::{Blob, BlobPropertyBag, FormData};

use voxdoc_core::ports::{
    AnswerPort, CallPipelinePort, CallTurnReply, DocumentPort, RawSynthesis, SynthesisPort,
    VoiceCatalogPort,
};
use voxdoc_types::{
    document::Document,
    message::{Message, Role},
    voice::VoiceProfile,
    Result, VoxError,
};

use crate::js_interop;

/// Character bound enforced by the synthesis provider; longer replies
/// are truncated before the request leaves the client.
const MAX_SYNTHESIS_CHARS: usize = 2900;

pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Audio references from the backend are server-relative.
    fn absolute_audio(&self, audio_url: &str) -> String {
        if audio_url.starts_with("http://") || audio_url.starts_with("https://") {
            audio_url.to_string()
        } else {
            self.url(audio_url)
        }
    }
}

// ─── Document extraction ─────────────────────────────────────

#[async_trait(?Send)]
impl DocumentPort for ApiClient {
    async fn upload(&self, bytes: &[u8], filename: &str) -> Result<Document> {
        let form = multipart_form("file", bytes, filename, "application/pdf")?;
        let response = Request::post(&self.url("/upload-pdf"))
            .body(form)
            .map_err(|e| VoxError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| VoxError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(VoxError::Extraction(error_detail(response).await));
        }
        let data: UploadResponse = response
            .json()
            .await
            .map_err(|e| VoxError::Extraction(e.to_string()))?;
        Ok(Document {
            file_id: data.file_id,
            filename: data.filename,
            extracted_length: data.text_length,
            summary: data.summary,
        })
    }
}

// ─── Answer generation ───────────────────────────────────────

#[async_trait(?Send)]
impl AnswerPort for ApiClient {
    async fn chat(
        &self,
        message: &str,
        file_id: Option<&str>,
        language: &str,
        history: &[Message],
    ) -> Result<String> {
        let body = ChatRequestBody {
            message,
            file_id,
            language,
            chat_history: history.iter().map(HistoryEntry::from).collect(),
        };
        let response = Request::post(&self.url("/chat"))
            .json(&body)
            .map_err(|e| VoxError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| VoxError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(VoxError::Answer(error_detail(response).await));
        }
        let data: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| VoxError::Answer(e.to_string()))?;
        Ok(data.response)
    }
}

// ─── Combined call pipeline ──────────────────────────────────

#[async_trait(?Send)]
impl CallPipelinePort for ApiClient {
    async fn call_turn(
        &self,
        audio: &[u8],
        file_id: &str,
        language: &str,
        voice_id: &str,
    ) -> Result<CallTurnReply> {
        let url = format!(
            "{}?file_id={}&language={}&voice_id={}",
            self.url("/call-with-pdf"),
            file_id,
            language,
            voice_id
        );
        let filename = format!("utterance-{}.webm", Uuid::new_v4());
        let form = multipart_form("audio", audio, &filename, "audio/webm")?;

        let response = Request::post(&url)
            .body(form)
            .map_err(|e| VoxError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| VoxError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(VoxError::Pipeline(error_detail(response).await));
        }
        let data: CallTurnResponse = response
            .json()
            .await
            .map_err(|e| VoxError::Pipeline(e.to_string()))?;

        if data.status == "voice_synthesis_failed" {
            log::warn!(
                "Call turn came back text-only: {}",
                data.error.as_deref().unwrap_or("synthesis unavailable")
            );
        }
        Ok(CallTurnReply {
            recognized_text: data.user_message,
            response_text: data.ai_response,
            audio_ref: data.audio_url.map(|u| self.absolute_audio(&u)),
        })
    }
}

// ─── Voice catalog ───────────────────────────────────────────

#[async_trait(?Send)]
impl VoiceCatalogPort for ApiClient {
    async fn list_voices(&self, language: Option<&str>) -> Vec<VoiceProfile> {
        let response = match Request::get(&self.url("/voices")).send().await {
            Ok(response) if response.ok() => response,
            Ok(response) => {
                log::warn!("Voice catalog returned HTTP {}", response.status());
                return Vec::new();
            }
            Err(e) => {
                log::warn!("Voice catalog unreachable: {}", e);
                return Vec::new();
            }
        };
        let data: VoicesResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Voice catalog payload unreadable: {}", e);
                return Vec::new();
            }
        };

        data.voices
            .into_iter()
            .filter(|row| language.map_or(true, |l| row.language.eq_ignore_ascii_case(l)))
            .map(VoiceProfile::from)
            .collect()
    }
}

// ─── Remote synthesis ────────────────────────────────────────

#[async_trait(?Send)]
impl SynthesisPort for ApiClient {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        language: &str,
        speed: f32,
    ) -> Result<RawSynthesis> {
        let text = truncate_for_provider(text);
        let body = SynthesisRequestBody {
            text: &text,
            voice_id,
            language,
            speed,
        };
        let response = Request::post(&self.url("/synthesize-voice"))
            .json(&body)
            .map_err(|e| VoxError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| VoxError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(VoxError::Synthesis(error_detail(response).await));
        }
        let data: SynthesisResponseBody = response
            .json()
            .await
            .map_err(|e| VoxError::Synthesis(e.to_string()))?;

        match data.audio_url {
            Some(audio_url) if data.status == "success" => Ok(RawSynthesis::Audio {
                audio_ref: self.absolute_audio(&audio_url),
            }),
            _ => Ok(RawSynthesis::FallbackText {
                detail: format!("provider status: {}", data.status),
            }),
        }
    }
}

// ─── Request/response DTOs ───────────────────────────────────

#[derive(Deserialize)]
struct UploadResponse {
    file_id: String,
    filename: String,
    text_length: usize,
    summary: String,
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_id: Option<&'a str>,
    language: &'a str,
    chat_history: Vec<HistoryEntry>,
}

#[derive(Serialize)]
struct HistoryEntry {
    role: &'static str,
    content: String,
    timestamp: String,
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            },
            content: message.content.clone(),
            timestamp: message.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponseBody {
    response: String,
}

#[derive(Deserialize)]
struct CallTurnResponse {
    user_message: String,
    ai_response: String,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<VoiceRow>,
}

#[derive(Deserialize)]
struct VoiceRow {
    voice_id: String,
    name: String,
    language: String,
    #[serde(default)]
    gender: String,
    #[serde(default)]
    style: String,
}

impl From<VoiceRow> for VoiceProfile {
    fn from(row: VoiceRow) -> Self {
        // A voice whose id speaks another primary subtag than the row's
        // language is a provider-side cross-language fallback
        let primary = row.language.split('-').next().unwrap_or_default();
        let cross_language_fallback = !row
            .voice_id
            .to_ascii_lowercase()
            .starts_with(&primary.to_ascii_lowercase());
        Self {
            voice_id: row.voice_id,
            language: row.language,
            display_name: row.name,
            gender: row.gender,
            style: row.style,
            cross_language_fallback,
        }
    }
}

#[derive(Serialize)]
struct SynthesisRequestBody<'a> {
    text: &'a str,
    voice_id: &'a str,
    language: &'a str,
    speed: f32,
}

#[derive(Deserialize)]
struct SynthesisResponseBody {
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

// ─── Helpers ─────────────────────────────────────────────────

fn multipart_form(field: &str, bytes: &[u8], filename: &str, mime: &str) -> Result<FormData> {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::of1(&array.buffer());
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_buffer_source_sequence_and_options(parts.as_ref(), &options)
        .map_err(js_interop)?;
    let form = FormData::new().map_err(js_interop)?;
    form.append_with_blob_and_filename(field, &blob, filename)
        .map_err(js_interop)?;
    Ok(form)
}

/// Pull the human-readable detail string out of a backend error
/// payload; fall back to the bare status when the body is opaque.
async fn error_detail(response: Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => format!("HTTP {}: {}", status, detail_text(body.detail)),
        Err(_) => format!("HTTP {}", status),
    }
}

fn detail_text(detail: serde_json::Value) -> String {
    match detail {
        serde_json::Value::String(s) => s,
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| serde_json::Value::Object(map).to_string()),
        other => other.to_string(),
    }
}

fn truncate_for_provider(text: &str) -> String {
    if text.chars().count() <= MAX_SYNTHESIS_CHARS {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_SYNTHESIS_CHARS).collect();
    truncated.push_str("...");
    log::warn!("Synthesis text truncated to {} characters", MAX_SYNTHESIS_CHARS);
    truncated
}
