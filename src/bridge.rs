//! The bridge event loop.
//!
//! One task owns the device registry and the connection manager. Everything
//! else (device readers, the port initializer, websocket sessions, file
//! operations) talks to it through [`Event`]s, so no state here is shared or
//! locked.
//!
//! ```text
//! initializer ─┐
//! device I/O  ─┼──> mpsc<Event> ──> Bridge ──> devices / session / log
//! websocket   ─┤
//! file ops    ─┘
//! ```

use std::future::Future;
use std::ops::ControlFlow;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::device::{DeviceHandle, DeviceId};
use crate::error::{bad_device, RouteError, RouteResult};
use crate::gateway::FileGateway;
use crate::registry::{DeviceConfig, DeviceRegistry};
use crate::router::{decode, device_frame, device_line, Command};
use crate::session::{ConnectionManager, SessionHandle};

/// Everything the bridge loop reacts to.
#[derive(Debug)]
pub enum Event {
    /// The initializer opened a device.
    PortOpened {
        device: DeviceId,
        handle: DeviceHandle,
    },
    /// The initializer gave up on a device.
    PortFailed { device: DeviceId, reason: String },
    /// Every device has been attempted.
    InitializationComplete,
    /// A websocket session connected.
    SessionOpened(SessionHandle),
    /// A websocket session disconnected.
    SessionClosed(Uuid),
    /// A text frame arrived on a session.
    SessionFrame { session: Uuid, text: String },
    /// A device produced a line.
    DeviceLine { device: DeviceId, line: String },
    /// A finished file operation's reply or failure text.
    Report(String),
    /// Close every device, acknowledge, and stop the loop.
    Shutdown(oneshot::Sender<()>),
}

/// Owner of the registry and the current session.
#[derive(Debug)]
pub struct Bridge {
    registry: DeviceRegistry,
    connections: ConnectionManager,
    gateway: FileGateway,
    events: mpsc::UnboundedSender<Event>,
}

impl Bridge {
    /// `events` must feed the receiver later passed to [`Bridge::run`];
    /// file operations report back through it.
    pub fn new(
        registry: DeviceRegistry,
        gateway: FileGateway,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            registry,
            connections: ConnectionManager::new(),
            gateway,
            events,
        }
    }

    /// Process events until shutdown.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Event>) {
        while let Some(event) = rx.recv().await {
            if self.handle(event).await.is_break() {
                break;
            }
        }
        debug!("Bridge loop stopped");
    }

    /// Apply one event.
    pub async fn handle(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::PortOpened { device, handle } => {
                self.registry.install(device, handle);
            }
            Event::PortFailed { device, reason } => {
                self.registry.mark_failed(device, reason);
            }
            Event::InitializationComplete => {
                info!(
                    open = self.registry.open_count(),
                    configured = self.registry.len(),
                    "Device initialization finished"
                );
                for line in self.registry.describe() {
                    info!("  {}", line);
                }
            }
            Event::SessionOpened(session) => {
                info!(session = %session.id(), "Control session connected");
                self.connections.attach(session);
            }
            Event::SessionClosed(id) => {
                if self.connections.detach(id) {
                    info!(session = %id, "Control session disconnected");
                } else {
                    debug!(session = %id, "Superseded session disconnected");
                }
            }
            Event::SessionFrame { session, text } => {
                debug!(session = %session, frame = %text, "Session frame");
                self.dispatch(&text);
            }
            Event::DeviceLine { device, line } => {
                self.connections.send_to_client(&device_frame(device, &line));
            }
            Event::Report(text) => {
                self.connections.send_to_client(&text);
            }
            Event::Shutdown(ack) => {
                info!("Closing open devices");
                self.registry.close_all().await;
                let _ = ack.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Decode and carry out one session frame, reporting failures to the session.
    pub fn dispatch(&mut self, text: &str) {
        let Some(command) = decode(text) else {
            return;
        };

        if let Err(e) = self.route(command) {
            warn!(error = %e, "Rejected session frame");
            self.connections.send_to_client(&e.to_string());
        }
    }

    fn route(&self, command: Command) -> RouteResult<()> {
        match command {
            Command::Device { token, id, payload } => {
                let id = id
                    .filter(|&id| id < self.registry.len())
                    .ok_or_else(|| bad_device(&token, self.registry.len()))?;
                if let Some(device) = self.registry.get(id) {
                    write_device(id, device, device_line(&payload));
                }
            }
            Command::Broadcast { payload } => {
                let line = device_line(&payload);
                for (id, device) in self.registry.iter() {
                    write_device(id, device, line.clone());
                }
            }
            Command::GetFileList { path } => {
                let gateway = self.gateway.clone();
                self.spawn_file_op(async move { gateway.list(&path).await.map(Some) });
            }
            Command::GetFile { path } => {
                let gateway = self.gateway.clone();
                self.spawn_file_op(async move { gateway.read(&path).await.map(Some) });
            }
            Command::PutFile { path, contents } => {
                let gateway = self.gateway.clone();
                self.spawn_file_op(async move {
                    gateway.write(&path, &contents).await.map(|()| None)
                });
            }
            Command::Unknown { token } => return Err(RouteError::UnknownCommand(token)),
        }
        Ok(())
    }

    /// Run a file operation off the loop; its reply (if any) or failure
    /// comes back as [`Event::Report`].
    fn spawn_file_op<F>(&self, op: F)
    where
        F: Future<Output = RouteResult<Option<String>>> + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            let report = match op.await {
                Ok(Some(reply)) => reply,
                Ok(None) => return,
                Err(e) => {
                    warn!(error = %e, "File operation failed");
                    e.to_string()
                }
            };
            let _ = events.send(Event::Report(report));
        });
    }
}

/// Queue `line` for one device; a device that never opened just logs.
fn write_device(id: DeviceId, device: &DeviceConfig, line: Vec<u8>) {
    if let Err(e) = device.write(line) {
        warn!(device = id, port = %device.port_name, error = %e, "Device write dropped");
    }
}
