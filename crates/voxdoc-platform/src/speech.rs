//! Local alternate synthesis via the browser's `speechSynthesis`.
//!
//! Used when the remote provider reports "no audio". Speaks
//! immediately and leaves no replayable reference; errors only when
//! the runtime lacks the capability altogether.

use wasm_bindgen::JsCast;
use web_sys::{SpeechSynthesis, SpeechSynthesisUtterance, SpeechSynthesisVoice};

use voxdoc_core::ports::LocalSpeechPort;
use voxdoc_types::{Result, VoxError};

use crate::js_error_text;

pub struct WebSpeech;

impl WebSpeech {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSpeechPort for WebSpeech {
    fn speak(&self, text: &str, language: &str, voice_hint: Option<&str>) -> Result<()> {
        let synth = synthesis()?;
        let utterance = SpeechSynthesisUtterance::new_with_text(text)
            .map_err(|e| VoxError::Unsupported(js_error_text(&e)))?;
        utterance.set_lang(language);
        if let Some(voice) = pick_voice(&synth, language, voice_hint) {
            utterance.set_voice(Some(&voice));
        }

        // One utterance at a time; a newer reply supersedes
        synth.cancel();
        synth.speak(&utterance);
        Ok(())
    }

    fn cancel(&self) {
        if let Ok(synth) = synthesis() {
            synth.cancel();
        }
    }
}

fn synthesis() -> Result<SpeechSynthesis> {
    let window = web_sys::window().ok_or_else(|| VoxError::Unsupported("no window".to_string()))?;
    window
        .speech_synthesis()
        .map_err(|_| VoxError::Unsupported("speechSynthesis missing".to_string()))
}

/// Prefer a voice matching the hint by name, then any voice for the
/// language; None lets the browser pick its default.
fn pick_voice(
    synth: &SpeechSynthesis,
    language: &str,
    voice_hint: Option<&str>,
) -> Option<SpeechSynthesisVoice> {
    let voices = synth.get_voices();
    let mut language_match = None;
    for value in voices.iter() {
        let voice: SpeechSynthesisVoice = value.unchecked_into();
        if let Some(hint) = voice_hint {
            if voice.name().to_ascii_lowercase().contains(&hint.to_ascii_lowercase()) {
                return Some(voice);
            }
        }
        if language_match.is_none() && voice.lang().eq_ignore_ascii_case(language) {
            language_match = Some(voice);
        }
    }
    language_match
}
