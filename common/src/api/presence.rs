use serde::{Deserialize, Serialize};

/// Response of `GET /api/nfc/current`. Every field is `None` when no
/// medium is on the reader.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MediumPresence {
    /// UID of the scanned tag.
    pub uid: Option<String>,

    /// Player URI mapped to the tag, if a mapping exists.
    pub spotify_uri: Option<String>,

    /// Display name of the mapped record.
    pub record_name: Option<String>,

    /// Cover art of the mapped record.
    pub record_cover_url: Option<String>,
}

impl MediumPresence {
    /// A medium is present when the reader reported a tag UID.
    pub fn is_present(&self) -> bool {
        self.uid.is_some()
    }

    /// The mapped player URI, treating an empty string as unmapped.
    pub fn player_uri(&self) -> Option<&str> {
        self.spotify_uri.as_deref().filter(|uri| !uri.is_empty())
    }
}
