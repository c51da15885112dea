use serde::{Deserialize, Serialize};

/// Generic `{ok, error?}` answer of command endpoints. A body without `ok`
/// counts as accepted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    #[serde(default = "accepted")]
    pub ok: bool,

    /// Set by endpoints that report a refusal in a 2xx body.
    #[serde(default)]
    pub error: Option<String>,
}

fn accepted() -> bool {
    true
}

/// Body of any non-2xx response. `detail` is the message meant for the user.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}
