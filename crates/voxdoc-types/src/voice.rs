use serde::{Deserialize, Serialize};

/// Voice used when nothing better matches a requested language.
/// This identifier mirrors the provider catalog but is configuration,
/// not contract; swapping it breaks nothing else.
pub const DEFAULT_VOICE_ID: &str = "en-US-julia";

/// A resolved (voice, language, display metadata) tuple used for
/// synthesis. `cross_language_fallback` marks profiles whose audible
/// voice does not match the requested language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub voice_id: String,
    pub language: String,
    pub display_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub cross_language_fallback: bool,
}

impl VoiceProfile {
    /// Labeled cross-language fallback: reports the requested language
    /// for display while audibly defaulting to a known-good voice.
    pub fn cross_language(language: &str) -> Self {
        Self {
            voice_id: DEFAULT_VOICE_ID.to_string(),
            language: language.to_string(),
            display_name: "Julia (cross-language fallback)".to_string(),
            gender: "female".to_string(),
            style: "Conversational".to_string(),
            cross_language_fallback: true,
        }
    }
}

/// Language tags the app offers, with display names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en-US", "English (US)"),
    ("en-GB", "English (UK)"),
    ("es-ES", "Spanish (Spain)"),
    ("es-MX", "Spanish (Mexico)"),
    ("fr-FR", "French"),
    ("de-DE", "German"),
    ("it-IT", "Italian"),
    ("pt-BR", "Portuguese (Brazil)"),
    ("ja-JP", "Japanese"),
    ("ko-KR", "Korean"),
    ("zh-CN", "Chinese (Simplified)"),
    ("hi-IN", "Hindi"),
    ("ar-SA", "Arabic"),
    ("nl-NL", "Dutch"),
    ("ru-RU", "Russian"),
];

/// Recommended speech speed per language tag; 1.0 when unlisted.
pub fn speed_for_language(language: &str) -> f32 {
    match language {
        "en-GB" | "fr-FR" | "de-DE" | "zh-CN" | "ar-SA" => 0.9,
        "es-ES" | "ja-JP" | "ko-KR" | "hi-IN" => 0.95,
        _ => 1.0,
    }
}

/// Static voice catalog used when the remote catalog is unreachable or
/// returns nothing. Every supported language resolves to at least one
/// profile here, even if only a labeled cross-language fallback.
pub fn fallback_catalog() -> Vec<VoiceProfile> {
    let native = [
        ("en-US-julia", "en-US", "Julia", "female", "Conversational"),
        ("en-US-adam", "en-US", "Adam", "male", "Professional"),
        ("en-US-sarah", "en-US", "Sarah", "female", "Friendly"),
        ("en-GB-olivia", "en-GB", "Olivia", "female", "Elegant"),
        ("en-GB-william", "en-GB", "William", "male", "Distinguished"),
    ];
    let mut catalog: Vec<VoiceProfile> = native
        .iter()
        .map(|(id, lang, name, gender, style)| VoiceProfile {
            voice_id: (*id).to_string(),
            language: (*lang).to_string(),
            display_name: (*name).to_string(),
            gender: (*gender).to_string(),
            style: (*style).to_string(),
            cross_language_fallback: false,
        })
        .collect();

    for (tag, _) in SUPPORTED_LANGUAGES {
        if !catalog.iter().any(|v| v.language == *tag) {
            catalog.push(VoiceProfile::cross_language(tag));
        }
    }
    catalog
}
