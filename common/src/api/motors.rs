use serde::{Deserialize, Serialize};

/// Response of `GET /api/motors/tone-arm`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct ToneArmPosition {
    /// 0 is home, positive values point toward the end of the record.
    pub steps_from_home: i64,
    pub angle_deg: f64,
    pub total_steps_per_rev: u32,
}

/// How `steps` in a [`ToneArmMoveRequest`] is interpreted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    Absolute,
    #[default]
    Relative,
}

/// Body of `POST /api/motors/tone-arm`. The server honours `angle_deg`
/// first, then `steps`, and refuses a body carrying neither.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ToneArmMoveRequest {
    pub position: PositionMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_deg: Option<f64>,

    /// Calibration moves turn the motor without updating the server's
    /// logical position, so the physical home can be corrected.
    pub from_settings: bool,
}

impl ToneArmMoveRequest {
    /// Move by a signed number of steps.
    pub fn relative(steps: i64, from_settings: bool) -> Self {
        Self {
            position: PositionMode::Relative,
            steps: Some(steps),
            angle_deg: None,
            from_settings,
        }
    }

    /// Move to an absolute angle, 0 being home.
    pub fn to_angle(angle_deg: f64) -> Self {
        Self {
            position: PositionMode::Absolute,
            steps: None,
            angle_deg: Some(angle_deg),
            from_settings: false,
        }
    }
}

/// Why the server did not (or did) move the actuators on a resync.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncReason {
    /// A local playback start happened moments ago.
    Cooldown,
    NoSpotify,
    PlaybackError,
    NoPlayback,
    Paused,
    NoNfc,
    NoMapping,
    ContextMismatch,
    ContextPositionUnavailable,
    RotationScan,
    #[serde(other)]
    Other,
}

/// Response of `POST /api/motors/tone-arm/sync`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ToneArmSyncReport {
    pub ok: bool,
    pub reason: Option<SyncReason>,

    /// Position through the whole album, 0.0 to 1.0.
    pub fraction: Option<f64>,
    pub track_index: Option<u32>,
    pub total_tracks: Option<u32>,
}

/// Response of `GET /api/motors/turntable`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct TurntableState {
    pub is_spinning: bool,

    /// 1 or -1.
    pub direction: i8,
    pub speed_rpm: f64,
}

/// Body of `POST /api/motors/turntable/start`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TurntableStartRequest {
    pub direction: i8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_rpm: Option<f64>,
}

impl Default for TurntableStartRequest {
    fn default() -> Self {
        Self {
            direction: 1,
            speed_rpm: None,
        }
    }
}
