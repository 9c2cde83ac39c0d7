#[cfg(test)]
mod tests {
    use crate::audio::*;
    use crate::call::*;
    use crate::config::*;
    use crate::document::Document;
    use crate::message::*;
    use crate::session::*;
    use crate::voice::*;
    use chrono::{Duration, Utc};

    fn doc() -> Document {
        Document {
            file_id: "doc1".to_string(),
            filename: "report.pdf".to_string(),
            extracted_length: 1234,
            summary: "A quarterly report".to_string(),
        }
    }

    // ─── Message Tests ───────────────────────────────────────

    #[test]
    fn test_message_user() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(msg.audio_ref.is_none());
    }

    #[test]
    fn test_message_with_audio() {
        let msg = Message::assistant("Hi there").with_audio("/audio/a1.mp3");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.audio_ref.as_deref(), Some("/audio/a1.mp3"));
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), r#""system""#);
    }

    #[test]
    fn test_message_serialization_roundtrip() {
        let msg = Message::user("what is this about?").with_audio("a1");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_message_audio_ref_omitted_when_absent() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert!(!json.contains("audio_ref"));
    }

    // ─── Session Tests ───────────────────────────────────────

    #[test]
    fn test_session_new_is_untitled() {
        let session = Session::new("session-1");
        assert_eq!(session.title, UNTITLED);
        assert!(session.subtitle.is_empty());
        assert!(session.messages.is_empty());
        assert!(session.document.is_none());
    }

    #[test]
    fn test_session_title_from_first_user_message() {
        let mut session = Session::new("session-1");
        session.append(Message::assistant("greeting"));
        assert_eq!(session.title, UNTITLED);
        session.append(Message::user("Summarize chapter two for me"));
        assert_eq!(session.title, "Summarize chapter two for me");
    }

    #[test]
    fn test_session_title_truncated() {
        let mut session = Session::new("session-1");
        let long = "x".repeat(80);
        session.append(Message::user(long));
        assert_eq!(session.title.chars().count(), 41); // 40 chars + ellipsis
        assert!(session.title.ends_with('…'));
    }

    #[test]
    fn test_session_title_set_once() {
        let mut session = Session::new("session-1");
        session.append(Message::user("first"));
        session.append(Message::user("second"));
        assert_eq!(session.title, "first");
    }

    #[test]
    fn test_session_append_updates_activity() {
        let mut session = Session::new("session-1");
        let before = session.last_activity_at;
        session.append(Message::user("hello"));
        assert!(session.last_activity_at >= before);
        assert_eq!(session.messages.len(), 1);
    }

    #[test]
    fn test_session_append_preserves_prior_messages() {
        let mut session = Session::new("session-1");
        session.append(Message::user("one"));
        let snapshot = session.messages.clone();
        session.append(Message::assistant("two"));
        assert_eq!(session.messages.len(), 2);
        assert_eq!(&session.messages[..1], &snapshot[..]);
        assert_eq!(session.messages[1].content, "two");
    }

    #[test]
    fn test_session_bind_sets_subtitle() {
        let mut session = Session::new("session-1");
        session.bind(doc());
        assert_eq!(session.subtitle, "report.pdf (1234 chars)");
        assert_eq!(session.document_id(), Some("doc1"));
    }

    #[test]
    fn test_session_serialization_roundtrip() {
        let mut session = Session::new("session-7");
        session.append(Message::user("q"));
        session.append(Message::assistant("a").with_audio("/audio/x.mp3"));
        session.bind(doc());
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_session_summary() {
        let mut session = Session::new("session-1");
        session.append(Message::user("hello"));
        let summary = SessionSummary::from(&session);
        assert_eq!(summary.id, "session-1");
        assert_eq!(summary.message_count, 1);
        assert_eq!(summary.title, "hello");
    }

    // ─── Call Tests ──────────────────────────────────────────

    #[test]
    fn test_call_state_active() {
        assert!(!CallState::Idle.is_active());
        assert!(!CallState::Ended.is_active());
        assert!(CallState::Connected.is_active());
        assert!(CallState::Listening.is_active());
        assert!(CallState::Processing.is_active());
        assert!(CallState::Speaking.is_active());
    }

    #[test]
    fn test_turn_entry_constructors() {
        assert_eq!(TurnEntry::user("hi").speaker, Speaker::User);
        assert_eq!(TurnEntry::assistant("hello").speaker, Speaker::Assistant);
        assert_eq!(TurnEntry::system("boom").speaker, Speaker::System);
    }

    #[test]
    fn test_format_elapsed_zero_padding() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(5), "00:05");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(600), "10:00");
    }

    #[test]
    fn test_format_elapsed_past_an_hour() {
        // no hour component; minutes keep incrementing
        assert_eq!(format_elapsed(3600), "60:00");
        assert_eq!(format_elapsed(3725), "62:05");
    }

    #[test]
    fn test_elapsed_seconds_recomputed() {
        let started = Utc::now();
        let now = started + Duration::seconds(83);
        assert_eq!(elapsed_seconds(started, now), 83);
    }

    #[test]
    fn test_elapsed_seconds_clock_skew_clamps_to_zero() {
        let started = Utc::now();
        let now = started - Duration::seconds(5);
        assert_eq!(elapsed_seconds(started, now), 0);
    }

    // ─── Voice Tests ─────────────────────────────────────────

    #[test]
    fn test_fallback_catalog_covers_all_languages() {
        let catalog = fallback_catalog();
        for (tag, _) in SUPPORTED_LANGUAGES {
            assert!(
                catalog.iter().any(|v| v.language == *tag),
                "no voice for {}",
                tag
            );
        }
    }

    #[test]
    fn test_fallback_catalog_labels_cross_language_rows() {
        let catalog = fallback_catalog();
        let spanish = catalog.iter().find(|v| v.language == "es-ES").unwrap();
        assert!(spanish.cross_language_fallback);
        assert_eq!(spanish.voice_id, DEFAULT_VOICE_ID);

        let english = catalog.iter().find(|v| v.language == "en-US").unwrap();
        assert!(!english.cross_language_fallback);
    }

    #[test]
    fn test_cross_language_profile_reports_requested_language() {
        let profile = VoiceProfile::cross_language("sw-KE");
        assert_eq!(profile.language, "sw-KE");
        assert_eq!(profile.voice_id, DEFAULT_VOICE_ID);
        assert!(profile.cross_language_fallback);
    }

    #[test]
    fn test_speed_for_language() {
        assert_eq!(speed_for_language("en-US"), 1.0);
        assert_eq!(speed_for_language("fr-FR"), 0.9);
        assert_eq!(speed_for_language("ja-JP"), 0.95);
        assert_eq!(speed_for_language("xx-XX"), 1.0);
    }

    // ─── Playback Tests ──────────────────────────────────────

    #[test]
    fn test_playback_terminal_states() {
        assert!(!PlaybackState::Loading.is_terminal());
        assert!(!PlaybackState::Playing.is_terminal());
        assert!(PlaybackState::Ended.is_terminal());
        assert!(PlaybackState::Stopped.is_terminal());
        assert!(PlaybackState::Errored(PlaybackErrorKind::Decode).is_terminal());
    }

    #[test]
    fn test_playback_error_messages_are_distinct() {
        let kinds = [
            PlaybackErrorKind::FormatUnsupported,
            PlaybackErrorKind::Network,
            PlaybackErrorKind::Decode,
            PlaybackErrorKind::Aborted,
            PlaybackErrorKind::PermissionDenied,
        ];
        for a in &kinds {
            for b in &kinds {
                if a != b {
                    assert_ne!(a.user_message(), b.user_message());
                }
            }
        }
    }

    // ─── Config Tests ────────────────────────────────────────

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.voice.language, "en-US");
        assert!(config.voice.speak_replies);
        assert_eq!(config.storage.backend, StorageBackendType::Auto);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = AppConfig::default();
        config.voice.voice_id = Some("en-GB-olivia".to_string());
        config.voice.speed = Some(0.9);
        config.storage.backend = StorageBackendType::LocalStorage;
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.voice.voice_id.as_deref(), Some("en-GB-olivia"));
        assert_eq!(back.storage.backend, StorageBackendType::LocalStorage);
    }

    #[test]
    fn test_storage_backend_labels() {
        for backend in StorageBackendType::all() {
            assert!(!backend.label().is_empty());
        }
    }
}
