use std::fmt::Display;

use common::api::{MediumPresence, PlaybackState};

/// Last successfully fetched remote state. Presence and playback are
/// always replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub presence: MediumPresence,
    pub playback: PlaybackState,
}

impl RemoteSnapshot {
    pub fn has_medium(&self) -> bool {
        self.presence.is_present()
    }

    /// True when anything at all is playing.
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing
    }

    /// Player URI mapped to the medium on the reader.
    pub fn medium_player_uri(&self) -> Option<&str> {
        self.presence.player_uri()
    }

    /// True only when the remote player is playing the context mapped to
    /// the medium on the reader. Another album playing doesn't count.
    pub fn is_this_medium_playing(&self) -> bool {
        match (self.medium_player_uri(), self.playback.context_uri.as_deref()) {
            (Some(medium_uri), Some(context_uri)) => {
                self.playback.is_playing && medium_uri == context_uri
            }
            _ => false,
        }
    }
}

impl Display for RemoteSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Snapshot | medium:{}, playing:{}, context:{}, track:{}>",
            self.presence.uid.as_deref().unwrap_or("-"),
            self.playback.is_playing,
            self.playback.context_uri.as_deref().unwrap_or("-"),
            self.playback.track_index + 1,
        )
    }
}

/// What the dashboard renders from: the snapshot (absent until the first
/// successful refresh) and the last refresh error, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotState {
    pub snapshot: Option<RemoteSnapshot>,
    pub error: Option<String>,
}

impl SnapshotState {
    pub fn is_playing(&self) -> bool {
        self.snapshot.as_ref().is_some_and(RemoteSnapshot::is_playing)
    }

    pub fn has_medium(&self) -> bool {
        self.snapshot.as_ref().is_some_and(RemoteSnapshot::has_medium)
    }

    pub fn is_this_medium_playing(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(RemoteSnapshot::is_this_medium_playing)
    }

    pub fn medium_player_uri(&self) -> Option<&str> {
        self.snapshot
            .as_ref()
            .and_then(RemoteSnapshot::medium_player_uri)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const ALBUM: &str = "spotify:album:6dVIqQ8qmQ5GBnJ9shOYGE";
    pub(crate) const OTHER_ALBUM: &str = "spotify:album:1ATL5GLyefJaxhQzSPVrLX";

    pub(crate) fn snapshot(
        medium_uri: Option<&str>,
        is_playing: bool,
        context_uri: Option<&str>,
    ) -> RemoteSnapshot {
        RemoteSnapshot {
            presence: MediumPresence {
                uid: Some("04:a2:19:b2".into()),
                spotify_uri: medium_uri.map(str::to_string),
                record_name: Some("Test Record".into()),
                record_cover_url: None,
            },
            playback: PlaybackState {
                is_playing,
                context_uri: context_uri.map(str::to_string),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_this_medium_playing_truth_table() {
        for medium_uri in [None, Some(ALBUM)] {
            for is_playing in [false, true] {
                for context_uri in [None, Some(ALBUM), Some(OTHER_ALBUM)] {
                    let expected =
                        is_playing && medium_uri.is_some() && context_uri == medium_uri;
                    let s = snapshot(medium_uri, is_playing, context_uri);
                    assert_eq!(
                        s.is_this_medium_playing(),
                        expected,
                        "medium={:?} playing={} context={:?}",
                        medium_uri,
                        is_playing,
                        context_uri
                    );
                }
            }
        }
    }

    #[test]
    fn test_unmapped_medium_is_never_playing() {
        let s = snapshot(None, true, None);
        assert!(s.is_playing());
        assert!(!s.is_this_medium_playing());

        let s = snapshot(Some(""), true, Some(""));
        assert!(!s.is_this_medium_playing());
    }

    #[test]
    fn test_state_without_snapshot() {
        let state = SnapshotState::default();
        assert!(!state.is_playing());
        assert!(!state.has_medium());
        assert!(!state.is_this_medium_playing());
        assert_eq!(state.medium_player_uri(), None);
    }

    #[test]
    fn test_no_medium_on_reader() {
        let s = RemoteSnapshot::default();
        assert!(!s.has_medium());
        assert!(!s.is_this_medium_playing());
    }
}
