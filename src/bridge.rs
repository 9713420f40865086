use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::error::BridgeError;
use crate::model::Fid;

/// Contract with the embedding host platform (the Farcaster client). The
/// engine only ever talks to the host through this trait; everything degrades
/// to guest-mode behavior when the host is absent.
pub trait HostBridge {
    /// Whether the host has announced itself yet. Cheap, safe to poll.
    fn is_available(&self) -> bool;

    /// The signed-in viewer, if the host knows one.
    fn user(&self) -> Result<Option<Fid>, BridgeError>;

    /// Tells the host the UI has finished mounting.
    fn ready(&self) -> Result<(), BridgeError>;

    /// Opens the host's compose surface pre-filled with text and an embedded
    /// link.
    fn compose_cast(&self, text: &str, embed_url: &str) -> Result<(), BridgeError>;

    /// Asks the host to pin/install this app.
    fn add_mini_app(&self) -> Result<(), BridgeError>;
}

/// Waits for the host to announce itself, checking at a fixed interval until
/// the timeout elapses. Returns false when the host never shows up.
pub async fn wait_for_host(
    bridge: &impl HostBridge,
    interval: Duration,
    timeout: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if bridge.is_available() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(interval).await;
    }
}

/// Resolves the viewer's identity, polling for host availability first.
/// `None` means guest mode: either the host never announced itself within the
/// timeout, or it has no signed-in user, or the lookup failed.
pub async fn resolve_identity(
    bridge: &impl HostBridge,
    interval: Duration,
    timeout: Duration,
) -> Option<Fid> {
    if !wait_for_host(bridge, interval, timeout).await {
        info!("host platform not detected, running in guest mode");
        return None;
    }
    match bridge.user() {
        Ok(user) => user,
        Err(e) => {
            error!("failed to resolve viewer identity: {e}");
            None
        }
    }
}

/// Fires the one-time ready signal. Attempted unconditionally, even when
/// identity resolution came up empty; on failure, retried once after the
/// fixed delay. Never raises.
pub async fn signal_ready(bridge: &impl HostBridge, retry_delay: Duration) {
    if let Err(e) = bridge.ready() {
        warn!("ready signal failed, retrying once: {e}");
        sleep(retry_delay).await;
        if let Err(e) = bridge.ready() {
            error!("ready signal retry failed: {e}");
        }
    }
}

/// Best-effort request to pin this app in the host. Failures are logged and
/// otherwise ignored.
pub fn request_install(bridge: &impl HostBridge) {
    if let Err(e) = bridge.add_mini_app() {
        info!("install request declined: {e}");
    }
}

/// Opens the host compose surface. Reports `Unavailable` instead of raising
/// when there is no host to talk to; the caller surfaces the failure.
pub fn compose_cast(
    bridge: &impl HostBridge,
    text: &str,
    embed_url: &str,
) -> Result<(), BridgeError> {
    if !bridge.is_available() {
        return Err(BridgeError::Unavailable);
    }
    bridge.compose_cast(text, embed_url)
}
