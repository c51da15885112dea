use async_trait::async_trait;
use common::api::{
    Acknowledgement, ErrorBody, MediumPresence, PlaybackState, StartPlaybackRequest,
    ToneArmMoveRequest, ToneArmPosition, ToneArmSyncReport, TurntableStartRequest, TurntableState,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, trace};

use crate::{
    config::ServerSettings,
    error::RemoteError,
    internals::core::ports::{PlaybackPort, PresencePort, RemoteResult, ToneArmPort, TurntablePort},
};

/// Client of the playback controller's HTTP API. Implements every remote
/// port.
pub struct HttpRemote {
    http: Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(settings: &ServerSettings) -> RemoteResult<Self> {
        let base_url = normalize_base_url(&settings.base_url)?;

        let http = Client::builder()
            .timeout(settings.request_timeout())
            .connect_timeout(settings.connect_timeout())
            .user_agent(format!("spinify-sync/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send `request` and resolve the failure convention. Returns the body of
    /// a 2xx response, `None` for 204.
    async fn execute(&self, request: RequestBuilder) -> RemoteResult<Option<String>> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.text().await.map_err(transport_error)?;
        if status.is_success() {
            Ok(Some(body))
        } else {
            let message = failure_message(status, &body);
            debug!("Request failed with {}: {}", status, message);
            Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn get<T>(&self, path: &str) -> RemoteResult<T>
    where
        T: DeserializeOwned + Default,
    {
        trace!("GET {}", path);
        match self.execute(self.http.get(self.url(path))).await? {
            Some(body) => decode(&body),
            None => Ok(T::default()),
        }
    }

    /// POST to a command endpoint and check its acknowledgement.
    async fn command(&self, path: &str, body: Option<&(impl Serialize + Sync)>) -> RemoteResult<()> {
        trace!("POST {}", path);
        let mut request = self.http.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        match self.execute(request).await? {
            Some(body) => acknowledge(&body),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PresencePort for HttpRemote {
    async fn current_medium(&self) -> RemoteResult<MediumPresence> {
        self.get("/api/nfc/current").await
    }
}

#[async_trait]
impl PlaybackPort for HttpRemote {
    async fn playback_state(&self) -> RemoteResult<PlaybackState> {
        self.get("/api/playback").await
    }

    async fn start_playback(&self, context_uri: Option<String>) -> RemoteResult<()> {
        let body = StartPlaybackRequest { context_uri };
        self.command("/api/playback/start", Some(&body)).await
    }

    async fn stop_playback(&self) -> RemoteResult<()> {
        self.command("/api/playback/stop", None::<&()>).await
    }
}

#[async_trait]
impl ToneArmPort for HttpRemote {
    async fn sync_tone_arm(&self) -> RemoteResult<ToneArmSyncReport> {
        trace!("POST /api/motors/tone-arm/sync");
        let request = self.http.post(self.url("/api/motors/tone-arm/sync"));
        match self.execute(request).await? {
            Some(body) => decode(&body),
            None => Ok(ToneArmSyncReport::default()),
        }
    }

    async fn tone_arm_position(&self) -> RemoteResult<ToneArmPosition> {
        self.get("/api/motors/tone-arm").await
    }

    async fn move_tone_arm(&self, request: ToneArmMoveRequest) -> RemoteResult<()> {
        self.command("/api/motors/tone-arm", Some(&request)).await
    }
}

#[async_trait]
impl TurntablePort for HttpRemote {
    async fn turntable_state(&self) -> RemoteResult<TurntableState> {
        self.get("/api/motors/turntable").await
    }

    async fn start_turntable(&self, request: TurntableStartRequest) -> RemoteResult<()> {
        self.command("/api/motors/turntable/start", Some(&request))
            .await
    }

    async fn stop_turntable(&self) -> RemoteResult<()> {
        self.command("/api/motors/turntable/stop", None::<&()>)
            .await
    }
}

fn normalize_base_url(url: &str) -> RemoteResult<String> {
    let url = url.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(RemoteError::InvalidUrl("URL cannot be empty".into()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(RemoteError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }
    Ok(url.to_string())
}

fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Transport(format!("Request timed out: {}", e))
    } else if e.is_connect() {
        RemoteError::Transport(format!("Server unreachable: {}", e))
    } else {
        RemoteError::Transport(e.to_string())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> RemoteResult<T> {
    serde_json::from_str(body).map_err(|e| RemoteError::Decode(e.to_string()))
}

/// A 2xx body that isn't an acknowledgement still counts as success.
fn acknowledge(body: &str) -> RemoteResult<()> {
    match serde_json::from_str::<Acknowledgement>(body) {
        Ok(ack) if !ack.ok => Err(RemoteError::Rejected(ack.error)),
        Ok(_) => Ok(()),
        Err(e) => {
            trace!("Unrecognized command response ({}), treating as success.", e);
            Ok(())
        }
    }
}

/// User message of a non-2xx response: the body's `detail`, else the raw
/// body, else the status reason.
fn failure_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .filter(|d| !d.trim().is_empty());
    if let Some(detail) = detail {
        return detail;
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
