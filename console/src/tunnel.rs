//! Public tunnel collaborator for exposing a local callback.
//!
//! Establishing a real tunnel is out of scope; [`StubTunnel`] reports a fixed
//! public URL without any network activity. Real implementations plug in
//! behind the [`Tunnel`] trait.

use async_trait::async_trait;
use tracing::info;

use crate::error::TunnelError;

/// URL the stub tunnel reports while running.
pub const STUB_TUNNEL_URL: &str = "https://random-subdomain.loca.lt";

/// Snapshot of a tunnel's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TunnelStatus {
    pub running: bool,
    pub url: Option<String>,
    pub error: Option<String>,
}

impl TunnelStatus {
    /// A running tunnel reachable at `url`.
    #[must_use]
    pub fn running(url: impl Into<String>) -> Self {
        Self {
            running: true,
            url: Some(url.into()),
            error: None,
        }
    }
}

/// A tunnel that can expose a local endpoint publicly.
#[async_trait]
pub trait Tunnel: Send + Sync + std::fmt::Debug {
    /// Starts the tunnel and returns its new status.
    async fn start(&mut self) -> Result<TunnelStatus, TunnelError>;

    /// Stops the tunnel. Stopping a stopped tunnel is not an error.
    async fn stop(&mut self) -> Result<(), TunnelError>;

    /// Current status.
    fn status(&self) -> TunnelStatus;
}

/// Tunnel that pretends to start instantly.
#[derive(Debug, Default)]
pub struct StubTunnel {
    status: TunnelStatus,
}

impl StubTunnel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Tunnel for StubTunnel {
    async fn start(&mut self) -> Result<TunnelStatus, TunnelError> {
        self.status = TunnelStatus::running(STUB_TUNNEL_URL);
        info!(url = STUB_TUNNEL_URL, "Tunnel started");
        Ok(self.status.clone())
    }

    async fn stop(&mut self) -> Result<(), TunnelError> {
        if self.status.running {
            info!("Tunnel stopped");
        }
        self.status = TunnelStatus::default();
        Ok(())
    }

    fn status(&self) -> TunnelStatus {
        self.status.clone()
    }
}
