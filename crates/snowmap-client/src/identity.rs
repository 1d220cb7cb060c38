//! Authentication readiness
//!
//! The first fetch must wait for the identity provider to report a signed-in
//! user. The provider keeps an [`IdentityHandle`]; the session waits on the
//! matching [`IdentityGate`].

use crate::error::{ClientError, ClientResult};
use tokio::sync::watch;

/// Provider side: flips readiness
#[derive(Debug)]
pub struct IdentityHandle {
    tx: watch::Sender<bool>,
}

impl IdentityHandle {
    pub fn set_ready(&self, ready: bool) {
        self.tx.send_replace(ready);
    }
}

/// Session side: waits for readiness
#[derive(Debug, Clone)]
pub struct IdentityGate {
    rx: watch::Receiver<bool>,
}

impl IdentityGate {
    /// A gate closed until the returned handle marks it ready
    pub fn new() -> (IdentityHandle, IdentityGate) {
        let (tx, rx) = watch::channel(false);
        (IdentityHandle { tx }, IdentityGate { rx })
    }

    /// A gate that is already open
    pub fn ready() -> IdentityGate {
        let (_tx, rx) = watch::channel(true);
        IdentityGate { rx }
    }

    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the user is authenticated
    pub async fn wait_ready(&mut self) -> ClientResult<()> {
        self.rx
            .wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| ClientError::IdentityUnavailable)
    }
}
