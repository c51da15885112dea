//! Tests of the HTTP adapter against a mock server.

use spinify_sync::{
    config::ServerSettings,
    error::RemoteError,
    externals::remote::adapters::HttpRemote,
    internals::core::ports::{PlaybackPort, PresencePort, ToneArmPort, TurntablePort},
};
use common::api::{SyncReason, ToneArmMoveRequest, TurntableStartRequest};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(url: impl Into<String>) -> ServerSettings {
    ServerSettings {
        base_url: url.into(),
        ..Default::default()
    }
}

async fn remote() -> (MockServer, HttpRemote) {
    let server = MockServer::start().await;
    let remote = HttpRemote::new(&settings(server.uri())).unwrap();
    (server, remote)
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_trailing_slash_is_removed() {
        let remote = HttpRemote::new(&settings("http://turntable.local:8000/")).unwrap();
        assert_eq!(remote.base_url(), "http://turntable.local:8000");
    }

    #[test]
    fn test_url_without_scheme_rejected() {
        match HttpRemote::new(&settings("turntable.local:8000")) {
            Err(RemoteError::InvalidUrl(msg)) => assert!(msg.contains("http://")),
            Err(e) => panic!("Expected InvalidUrl error, got: {:?}", e),
            Ok(_) => panic!("Expected InvalidUrl error"),
        }
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(matches!(
            HttpRemote::new(&settings("")),
            Err(RemoteError::InvalidUrl(_))
        ));
    }
}

// =============================================================================
// Read Tests
// =============================================================================

mod reads {
    use super::*;

    #[tokio::test]
    async fn test_current_medium() {
        let (server, remote) = remote().await;
        Mock::given(method("GET"))
            .and(path("/api/nfc/current"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "uid": "04:a2:19:b2",
                "spotify_uri": "spotify:album:4aawyAB9vmqN3uQ7FjRGTy",
                "record_name": "Global Warming",
                "record_cover_url": null
            })))
            .mount(&server)
            .await;

        let presence = remote.current_medium().await.unwrap();
        assert!(presence.is_present());
        assert_eq!(
            presence.player_uri(),
            Some("spotify:album:4aawyAB9vmqN3uQ7FjRGTy")
        );
        assert_eq!(presence.record_name.as_deref(), Some("Global Warming"));
    }

    #[tokio::test]
    async fn test_empty_reader() {
        let (server, remote) = remote().await;
        Mock::given(method("GET"))
            .and(path("/api/nfc/current"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "uid": null,
                "spotify_uri": null,
                "record_name": null,
                "record_cover_url": null
            })))
            .mount(&server)
            .await;

        assert!(!remote.current_medium().await.unwrap().is_present());
    }

    #[tokio::test]
    async fn test_playback_state() {
        let (server, remote) = remote().await;
        Mock::given(method("GET"))
            .and(path("/api/playback"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "is_playing": true,
                "context_uri": "spotify:album:4aawyAB9vmqN3uQ7FjRGTy",
                "track_index": 3,
                "position_ms": 61000,
                "duration_ms": 215000,
                "track_name": "Hotel Room Service"
            })))
            .mount(&server)
            .await;

        let state = remote.playback_state().await.unwrap();
        assert!(state.is_playing);
        assert_eq!(state.track_index, 3);
        assert_eq!(state.track_name, "Hotel Room Service");
        assert_eq!(state.artist_name, "");
    }

    #[tokio::test]
    async fn test_no_content_is_an_empty_success() {
        let (server, remote) = remote().await;
        Mock::given(method("GET"))
            .and(path("/api/playback"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let state = remote.playback_state().await.unwrap();
        assert!(!state.is_playing);
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_decode_error() {
        let (server, remote) = remote().await;
        Mock::given(method("GET"))
            .and(path("/api/motors/tone-arm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        assert!(matches!(
            remote.tone_arm_position().await,
            Err(RemoteError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_sync_report() {
        let (server, remote) = remote().await;
        Mock::given(method("POST"))
            .and(path("/api/motors/tone-arm/sync"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "reason": "cooldown"
            })))
            .mount(&server)
            .await;

        let report = remote.sync_tone_arm().await.unwrap();
        assert!(!report.ok);
        assert_eq!(report.reason, Some(SyncReason::Cooldown));
    }
}

// =============================================================================
// Failure Convention Tests
// =============================================================================

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_detail_is_the_message() {
        let (server, remote) = remote().await;
        Mock::given(method("POST"))
            .and(path("/api/playback/start"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "detail": "Spotify not linked. Use the Connect page to log in."
            })))
            .mount(&server)
            .await;

        let error = remote.start_playback(None).await.unwrap_err();
        assert_eq!(
            error,
            RemoteError::Status {
                status: 503,
                message: "Spotify not linked. Use the Connect page to log in.".into()
            }
        );
    }

    #[tokio::test]
    async fn test_raw_body_without_detail() {
        let (server, remote) = remote().await;
        Mock::given(method("POST"))
            .and(path("/api/playback/stop"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let error = remote.stop_playback().await.unwrap_err();
        assert_eq!(error.user_message(), "Internal Server Error");
    }

    #[tokio::test]
    async fn test_reason_phrase_without_body() {
        let (server, remote) = remote().await;
        Mock::given(method("GET"))
            .and(path("/api/playback"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let error = remote.playback_state().await.unwrap_err();
        assert_eq!(error.user_message(), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_refusal_in_success_body() {
        let (server, remote) = remote().await;
        Mock::given(method("POST"))
            .and(path("/api/motors/tone-arm"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "error": "Provide steps or angle_deg"
            })))
            .mount(&server)
            .await;

        let error = remote
            .move_tone_arm(ToneArmMoveRequest::relative(4, true))
            .await
            .unwrap_err();
        assert_eq!(
            error,
            RemoteError::Rejected(Some("Provide steps or angle_deg".into()))
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        let remote = HttpRemote::new(&settings("http://127.0.0.1:1")).unwrap();
        assert!(matches!(
            remote.current_medium().await,
            Err(RemoteError::Transport(_))
        ));
    }
}

// =============================================================================
// Command Body Tests
// =============================================================================

mod commands {
    use super::*;

    #[tokio::test]
    async fn test_start_with_context() {
        let (server, remote) = remote().await;
        Mock::given(method("POST"))
            .and(path("/api/playback/start"))
            .and(body_json(serde_json::json!({
                "context_uri": "spotify:album:4aawyAB9vmqN3uQ7FjRGTy"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        remote
            .start_playback(Some("spotify:album:4aawyAB9vmqN3uQ7FjRGTy".into()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_resume_sends_empty_body() {
        let (server, remote) = remote().await;
        Mock::given(method("POST"))
            .and(path("/api/playback/start"))
            .and(body_json(serde_json::json!({})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        remote.start_playback(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_jog_body() {
        let (server, remote) = remote().await;
        Mock::given(method("POST"))
            .and(path("/api/motors/tone-arm"))
            .and(body_json(serde_json::json!({
                "position": "relative",
                "steps": -9,
                "from_settings": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        remote
            .move_tone_arm(ToneArmMoveRequest::relative(-9, true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_turntable_start_body() {
        let (server, remote) = remote().await;
        Mock::given(method("POST"))
            .and(path("/api/motors/turntable/start"))
            .and(body_json(serde_json::json!({"direction": -1, "speed_rpm": 45.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        remote
            .start_turntable(TurntableStartRequest {
                direction: -1,
                speed_rpm: Some(45.0),
            })
            .await
            .unwrap();
    }
}
