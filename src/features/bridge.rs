//! Cross-document signaling: open and close requests posted from other frames
//! or scripts, and the routing of open requests to a host-provided handler.

use crate::features::auth::Mode;
use serde::Deserialize;
use serde_json::{Value, json};

pub const OPEN_MESSAGE: &str = "LANDING_AUTH_OPEN";
pub const CLOSE_MESSAGE: &str = "LANDING_AUTH_CLOSE";
/// `CustomEvent` dispatched on `window` once the bridge is installed.
pub const READY_EVENT: &str = "landing-auth-ready";

/// Global functions exposed on `window`.
pub const OPEN_FUNCTION: &str = "openAuthModal";
pub const CLOSE_FUNCTION: &str = "closeAuthModal";
/// Optional host hooks that take over open and close requests.
pub const HOST_OPEN_HOOK: &str = "__landingAuthOpen";
pub const HOST_CLOSE_HOOK: &str = "__landingAuthClose";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    #[serde(rename = "LANDING_AUTH_OPEN")]
    Open {
        #[serde(default)]
        mode: Value,
    },
    #[serde(rename = "LANDING_AUTH_CLOSE")]
    Close,
}

impl BridgeMessage {
    /// Parses posted message data. Anything that is not one of the two known
    /// messages is ignored.
    pub fn parse(data: &Value) -> Option<Self> {
        BridgeMessage::deserialize(data).ok()
    }

    /// Mode of an open request; non-string modes fall back to login.
    pub fn mode(&self) -> Option<Mode> {
        match self {
            BridgeMessage::Open { mode } => Some(Mode::parse(mode.as_str().unwrap_or_default())),
            BridgeMessage::Close => None,
        }
    }
}

/// Payload posted to the parent frame when the dialog opens inside an iframe.
pub fn open_message(mode: Mode) -> Value {
    json!({ "type": OPEN_MESSAGE, "mode": mode.as_str() })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenRoute {
    /// The host page handles the request through its hook.
    Delegate,
    /// The dialog opens here; an embedded page also tells its parent.
    Local { notify_parent: bool },
}

pub fn open_route(has_host_hook: bool, embedded: bool) -> OpenRoute {
    if has_host_hook {
        OpenRoute::Delegate
    } else {
        OpenRoute::Local {
            notify_parent: embedded,
        }
    }
}
