use serde::{Deserialize, Deserializer, Serialize};

/// Response of `GET /api/playback`. The server answers with an all-default
/// body when nothing is playing or the streaming account is not linked.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PlaybackState {
    pub is_playing: bool,

    /// URI of the album or playlist being played.
    pub context_uri: Option<String>,
    pub context_image_url: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub track_uri: String,

    /// Zero based index of the track within its album.
    pub track_index: u32,
    pub position_ms: u64,
    pub duration_ms: u64,
    #[serde(deserialize_with = "null_as_empty")]
    pub track_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub album_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub artist_name: String,
}

/// The streaming service sometimes sends `null` for a missing name.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /api/playback/start`. Without a context the server resumes
/// whatever was last playing.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StartPlaybackRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_uri: Option<String>,
}
