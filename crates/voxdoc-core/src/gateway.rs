//! Voice synthesis gateway.
//!
//! Resolves a voice for a language (exact tag, then primary-subtag
//! prefix, then a labeled cross-language fallback; never fails) and
//! wraps the remote provider so ordinary unavailability becomes a
//! tagged "no audio" outcome instead of an error. Callers branch on
//! the tag to pick the local alternate path or stay text-only.

use std::cell::RefCell;
use std::rc::Rc;

use voxdoc_types::{
    voice::{fallback_catalog, speed_for_language, VoiceProfile},
    Result, VoxError,
};

use crate::ports::{RawSynthesis, SynthesisPort, VoiceCatalogPort};

/// What a synthesis request produced.
#[derive(Debug, Clone)]
pub enum SynthesisOutcome {
    /// A playable reference
    Audio { audio_ref: String },
    /// Provider unavailable or answered with a non-audio artifact
    Unavailable { reason: String },
}

pub struct VoiceGateway {
    catalog: Rc<dyn VoiceCatalogPort>,
    synthesis: Rc<dyn SynthesisPort>,
    /// Remote catalog, fetched once; the static table backs a miss
    cached_voices: RefCell<Option<Vec<VoiceProfile>>>,
}

impl VoiceGateway {
    pub fn new(catalog: Rc<dyn VoiceCatalogPort>, synthesis: Rc<dyn SynthesisPort>) -> Self {
        Self {
            catalog,
            synthesis,
            cached_voices: RefCell::new(None),
        }
    }

    /// Resolve a usable voice for a language tag. Total: unknown tags
    /// get a cross-language fallback that still reports the requested
    /// language for display.
    pub async fn resolve_voice(&self, language: &str) -> VoiceProfile {
        let voices = self.voices().await;

        if let Some(voice) = voices
            .iter()
            .find(|v| v.language.eq_ignore_ascii_case(language))
        {
            return voice.clone();
        }

        let primary = primary_subtag(language);
        if let Some(voice) = voices
            .iter()
            .find(|v| primary_subtag(&v.language).eq_ignore_ascii_case(primary))
        {
            return voice.clone();
        }

        log::info!("No voice for {}; using cross-language fallback", language);
        VoiceProfile::cross_language(language)
    }

    /// Synthesize text with a resolved profile. Provider failure and
    /// fallback-text artifacts are tagged `Unavailable`; only caller
    /// contract violations (empty text, blank voice) are errors.
    pub async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceProfile,
        speed: Option<f32>,
    ) -> Result<SynthesisOutcome> {
        if text.trim().is_empty() {
            return Err(VoxError::EmptyInput("synthesis text"));
        }
        if voice.voice_id.is_empty() {
            return Err(VoxError::EmptyInput("voice id"));
        }
        let speed = speed.unwrap_or_else(|| speed_for_language(&voice.language));

        match self
            .synthesis
            .synthesize(text, &voice.voice_id, &voice.language, speed)
            .await
        {
            Ok(RawSynthesis::Audio { audio_ref }) => Ok(SynthesisOutcome::Audio { audio_ref }),
            Ok(RawSynthesis::FallbackText { detail }) => {
                log::warn!("Provider returned fallback text instead of audio: {}", detail);
                Ok(SynthesisOutcome::Unavailable { reason: detail })
            }
            Err(e) => {
                log::warn!("Remote synthesis unavailable: {}", e);
                Ok(SynthesisOutcome::Unavailable {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn voices(&self) -> Vec<VoiceProfile> {
        if let Some(cached) = self.cached_voices.borrow().as_ref() {
            return cached.clone();
        }
        let remote = self.catalog.list_voices(None).await;
        let voices = if remote.is_empty() {
            log::info!("Voice catalog empty; using static fallback table");
            fallback_catalog()
        } else {
            remote
        };
        *self.cached_voices.borrow_mut() = Some(voices.clone());
        voices
    }
}

fn primary_subtag(language: &str) -> &str {
    language.split('-').next().unwrap_or(language)
}
