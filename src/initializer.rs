//! Sequential port initialization.
//!
//! Devices are opened strictly one after another, in registry order, with a
//! fixed pause after each attempt. Opening many OS serial handles back to
//! back is unreliable on common platforms. A failed open is logged and never
//! retried. Once every device has been attempted the transport is started,
//! exactly once, however many opens failed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bridge::Event;
use crate::device::{DeviceHandle, DeviceId};
use crate::port::{DeviceStream, PortError, PortOpener, PortSettings};
use crate::registry::OpenTarget;

/// Progress of the initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Idle,
    Opening(DeviceId),
    Opened(DeviceId),
    FailedOpen(DeviceId),
    AllAttempted,
    TransportStarted,
}

/// Outcome counts once every device has been attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitSummary {
    pub opened: usize,
    pub failed: usize,
}

pub struct PortInitializer {
    opener: Arc<dyn PortOpener>,
    targets: Vec<OpenTarget>,
    delay: Duration,
    events: mpsc::UnboundedSender<Event>,
    state: InitState,
}

impl PortInitializer {
    pub fn new(
        opener: Arc<dyn PortOpener>,
        targets: Vec<OpenTarget>,
        delay: Duration,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            opener,
            targets,
            delay,
            events,
            state: InitState::Idle,
        }
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    /// Attempt every device in order, then hand the summary to `start_transport`.
    pub async fn run<F, Fut>(mut self, start_transport: F) -> Fut::Output
    where
        F: FnOnce(InitSummary) -> Fut,
        Fut: Future,
    {
        let summary = self.open_all().await;

        self.transition(InitState::TransportStarted);
        start_transport(summary).await
    }

    async fn open_all(&mut self) -> InitSummary {
        let mut summary = InitSummary::default();
        let targets = std::mem::take(&mut self.targets);

        for target in targets {
            self.transition(InitState::Opening(target.id));

            match self.open(&target).await {
                Ok(stream) => {
                    info!(device = target.id, name = %target.name, port = %target.port_name, "Port opened");
                    let handle = DeviceHandle::spawn(target.id, stream, self.events.clone());
                    let _ = self.events.send(Event::PortOpened {
                        device: target.id,
                        handle,
                    });
                    summary.opened += 1;
                    self.transition(InitState::Opened(target.id));
                }
                Err(e) => {
                    warn!(device = target.id, name = %target.name, port = %target.port_name, error = %e, "Port failed to open");
                    let _ = self.events.send(Event::PortFailed {
                        device: target.id,
                        reason: e.to_string(),
                    });
                    summary.failed += 1;
                    self.transition(InitState::FailedOpen(target.id));
                }
            }

            tokio::time::sleep(self.delay).await;
        }

        self.transition(InitState::AllAttempted);
        let _ = self.events.send(Event::InitializationComplete);
        summary
    }

    async fn open(&self, target: &OpenTarget) -> Result<Box<dyn DeviceStream>, PortError> {
        let settings: PortSettings = target.settings.parse()?;
        debug!(device = target.id, settings = %settings, "Opening port");
        self.opener.open(&target.port_name, &settings).await
    }

    fn transition(&mut self, next: InitState) {
        debug!(from = ?self.state, to = ?next, "Initializer state");
        self.state = next;
    }
}
