use crate::media::{CaptureDevice, CaptureHandle, Facing};
use crate::session::{CameraCommand, SessionConfig, next_event, sleep_until_opt};
use crate::signaling::{PeerEndpoint, Switchboard};
use crate::transport::{ControlChannel, MediaBridge, PeerEvent};
use lovelens_core::{ControlMessage, Layout, LensError, Mode, PeerId, RoomCode, Slot, StreamId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Registering,
    AwaitingHost,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// No host is registered for the room yet.
    HostUnreachable,
    ChannelClosed,
    RegistrationFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Off,
    Starting,
    Live,
    /// The user refused access. Only an explicit restart tries again.
    Denied,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraStatus {
    pub state: CameraState,
    pub slot: Slot,
    pub peer_id: PeerId,
    pub host_id: PeerId,
    /// Last mode pushed by the host.
    pub mode: Option<Mode>,
    pub facing: Facing,
    pub capture: CaptureState,
    pub stream: Option<StreamId>,
    pub last_disconnect: Option<DisconnectReason>,
    pub attempts: u32,
    pub calls_placed: u32,
}

type CaptureResult = (u64, Result<CaptureHandle, LensError>);

pub struct CameraSession {
    slot: Slot,
    peer_id: PeerId,
    host_id: PeerId,
    config: SessionConfig,
    switchboard: Switchboard,
    endpoint: Option<PeerEndpoint>,
    channel: Option<ControlChannel>,
    bridge: MediaBridge,
    state: CameraState,
    mode: Option<Mode>,
    last_disconnect: Option<DisconnectReason>,
    attempts: u32,
    calls_placed: u32,
    retry_at: Option<Instant>,
    device: Arc<dyn CaptureDevice>,
    facing: Facing,
    capture: Option<CaptureHandle>,
    capture_state: CaptureState,
    // bumped on every (re)start so late results of an older open are discarded
    capture_epoch: u64,
    capture_task: Option<JoinHandle<()>>,
    capture_tx: mpsc::UnboundedSender<CaptureResult>,
    capture_rx: mpsc::UnboundedReceiver<CaptureResult>,
    commands: mpsc::Receiver<CameraCommand>,
    status: watch::Sender<CameraStatus>,
}

impl CameraSession {
    /// Starts a camera for `slot` in `room`. The identifier is generated here
    /// once and kept across every retry.
    pub fn spawn(
        switchboard: &Switchboard,
        room: RoomCode,
        slot: Slot,
        config: SessionConfig,
        device: Arc<dyn CaptureDevice>,
    ) -> CameraHandle {
        let identity = config.identity(room);
        let peer_id = identity.camera_id(slot);
        let host_id = identity.host_id();

        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (capture_tx, capture_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(CameraStatus {
            state: CameraState::Idle,
            slot,
            peer_id: peer_id.clone(),
            host_id: host_id.clone(),
            mode: None,
            facing: Facing::default(),
            capture: CaptureState::Off,
            stream: None,
            last_disconnect: None,
            attempts: 0,
            calls_placed: 0,
        });

        let session = CameraSession {
            slot,
            peer_id: peer_id.clone(),
            host_id,
            config,
            switchboard: switchboard.clone(),
            endpoint: None,
            channel: None,
            bridge: MediaBridge::new(switchboard.clone(), peer_id.clone()),
            state: CameraState::Idle,
            mode: None,
            last_disconnect: None,
            attempts: 0,
            calls_placed: 0,
            retry_at: None,
            device,
            facing: Facing::default(),
            capture: None,
            capture_state: CaptureState::Off,
            capture_epoch: 0,
            capture_task: None,
            capture_tx,
            capture_rx,
            commands: cmd_rx,
            status: status_tx,
        };
        let task = tokio::spawn(session.run());

        CameraHandle {
            peer_id,
            commands: cmd_tx,
            status: status_rx,
            task,
        }
    }

    async fn run(mut self) {
        info!(camera = %self.peer_id, host = %self.host_id, "Camera session started");

        self.start_capture();
        self.attempt();
        self.publish();

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(CameraCommand::Leave) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },

                event = next_event(&mut self.endpoint) => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        self.endpoint = None;
                        self.disconnect(DisconnectReason::RegistrationFailed);
                    }
                },

                Some((epoch, result)) = self.capture_rx.recv() => self.on_capture(epoch, result),

                _ = sleep_until_opt(self.retry_at) => {
                    self.retry_at = None;
                    self.attempt();
                }
            }

            self.publish();
        }

        self.teardown();
    }

    /// One connection attempt: register if needed, then dial the host.
    fn attempt(&mut self) {
        self.state = CameraState::Registering;
        self.attempts += 1;

        if self.endpoint.is_some() {
            self.dial();
            return;
        }

        match self.switchboard.register(self.peer_id.clone()) {
            // dialing starts once the broker confirms with Open
            Ok(endpoint) => self.endpoint = Some(endpoint),
            Err(e) => {
                warn!(camera = %self.peer_id, "Registration failed: {}", e);
                self.disconnect(DisconnectReason::RegistrationFailed);
            }
        }
    }

    fn dial(&mut self) {
        let Some(endpoint) = &self.endpoint else {
            return;
        };

        match ControlChannel::dial(endpoint, &self.host_id) {
            Ok(channel) => {
                self.channel = Some(channel);
                self.state = CameraState::AwaitingHost;
            }
            Err(LensError::PeerUnavailable(_)) => {
                info!(
                    host = %self.host_id,
                    retry_in = ?self.config.retry_delay,
                    "Host not found, retrying"
                );
                self.disconnect(DisconnectReason::HostUnreachable);
            }
            Err(e) => {
                warn!(host = %self.host_id, "Dial failed: {}", e);
                self.disconnect(DisconnectReason::ChannelClosed);
            }
        }
    }

    fn disconnect(&mut self, reason: DisconnectReason) {
        self.channel = None;
        self.state = CameraState::Disconnected;
        self.last_disconnect = Some(reason);
        self.retry_at = Some(Instant::now() + self.config.retry_delay);
    }

    fn handle_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::Open(_) => {
                if self.state == CameraState::Registering {
                    self.dial();
                }
            }

            PeerEvent::ConnectionOpen { link } => {
                let Some(channel) = self.channel.as_mut().filter(|c| c.link() == link) else {
                    return;
                };
                channel.mark_open();
                self.state = CameraState::Connected;
                info!(camera = %self.peer_id, "Connected to host");

                if let Err(e) = channel.send(&ControlMessage::Hello { source: self.slot }) {
                    warn!("Failed to announce slot: {}", e);
                }
                self.maybe_call();
            }

            PeerEvent::Data { link, payload } => {
                let Some(channel) = self.channel.as_ref().filter(|c| c.link() == link) else {
                    return;
                };
                match channel.receive(&payload) {
                    Ok(ControlMessage::Status { mode }) => {
                        debug!(%mode, "Host mode");
                        self.mode = Some(mode);
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Ignoring control message: {}", e),
                }
            }

            PeerEvent::ConnectionClosed { link } => {
                let Some(channel) = self.channel.as_mut().filter(|c| c.link() == link) else {
                    return;
                };
                channel.mark_closed();
                info!(camera = %self.peer_id, "Control link to host closed");
                self.disconnect(DisconnectReason::ChannelClosed);
            }

            PeerEvent::Call { call, remote, .. } => {
                debug!(%remote, "Cameras do not receive media");
                self.switchboard.hang_up(call);
            }

            PeerEvent::CallAnswered { call } => debug!(%call, "Host answered"),

            PeerEvent::CallClosed { call } => {
                if self.bridge.on_call_closed(call) {
                    debug!(%call, "Media call ended");
                }
            }

            PeerEvent::Connection { link, remote } => {
                debug!(%remote, "Refusing inbound control link");
                self.switchboard.disconnect(link);
            }
        }
    }

    fn handle_command(&mut self, cmd: CameraCommand) {
        match cmd {
            CameraCommand::SendLayout { layout, reply } => {
                let _ = reply.send(self.send_layout(layout));
            }
            CameraCommand::ToggleFacing => {
                self.facing = self.facing.toggled();
                self.start_capture();
            }
            CameraCommand::RestartCapture => self.start_capture(),
            CameraCommand::Leave => {}
        }
    }

    fn send_layout(&self, layout: Layout) -> Result<(), LensError> {
        let channel = self.channel.as_ref().ok_or(LensError::ChannelNotOpen)?;
        channel.send(&ControlMessage::Command {
            source: self.slot,
            layout,
        })
    }

    /// Stops the current capture and its call, then opens the device again.
    fn start_capture(&mut self) {
        self.capture_epoch += 1;
        if let Some(task) = self.capture_task.take() {
            task.abort();
        }
        if self.capture.take().is_some() {
            self.bridge.hang_up();
        }
        self.capture_state = CaptureState::Starting;

        let epoch = self.capture_epoch;
        let facing = self.facing;
        let device = self.device.clone();
        let tx = self.capture_tx.clone();
        self.capture_task = Some(tokio::spawn(async move {
            let result = device.open(facing).await;
            let _ = tx.send((epoch, result));
        }));
    }

    fn on_capture(&mut self, epoch: u64, result: Result<CaptureHandle, LensError>) {
        if epoch != self.capture_epoch {
            return;
        }
        self.capture_task = None;

        match result {
            Ok(handle) => {
                info!(facing = ?handle.facing(), stream = %handle.stream().id(), "Capture live");
                self.capture = Some(handle);
                self.capture_state = CaptureState::Live;
                self.maybe_call();
            }
            Err(LensError::MediaPermissionDenied) => {
                warn!(camera = %self.peer_id, "Camera access denied");
                self.capture_state = CaptureState::Denied;
            }
            Err(e) => {
                warn!(camera = %self.peer_id, "Capture failed: {}", e);
                self.capture_state = CaptureState::Failed;
            }
        }
    }

    /// Calls the host with the current stream, once per stream and session.
    fn maybe_call(&mut self) {
        if self.state != CameraState::Connected {
            return;
        }
        let Some(capture) = &self.capture else {
            return;
        };

        match self.bridge.ensure_call(&self.host_id, &capture.stream()) {
            Ok(true) => self.calls_placed += 1,
            Ok(false) => {}
            Err(e) => warn!(host = %self.host_id, "Media call failed: {}", e),
        }
    }

    fn snapshot(&self) -> CameraStatus {
        CameraStatus {
            state: self.state,
            slot: self.slot,
            peer_id: self.peer_id.clone(),
            host_id: self.host_id.clone(),
            mode: self.mode,
            facing: self.facing,
            capture: self.capture_state,
            stream: self.capture.as_ref().map(|c| c.stream().id()),
            last_disconnect: self.last_disconnect,
            attempts: self.attempts,
            calls_placed: self.calls_placed,
        }
    }

    fn publish(&self) {
        self.status.send_replace(self.snapshot());
    }

    fn teardown(&mut self) {
        self.capture_epoch += 1;
        if let Some(task) = self.capture_task.take() {
            task.abort();
        }
        self.capture = None;
        self.bridge.hang_up();
        self.channel = None;
        self.endpoint = None;
        self.retry_at = None;
        self.state = CameraState::Idle;
        self.capture_state = CaptureState::Off;
        self.publish();

        info!(camera = %self.peer_id, "Camera session ended");
    }
}

/// Control surface of a running [`CameraSession`].
pub struct CameraHandle {
    peer_id: PeerId,
    commands: mpsc::Sender<CameraCommand>,
    status: watch::Receiver<CameraStatus>,
    task: JoinHandle<()>,
}

impl CameraHandle {
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    async fn send(&self, cmd: CameraCommand) -> Result<(), LensError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| LensError::SessionEnded)
    }

    /// Asks the host to switch layout. Fails with `ChannelNotOpen` while the
    /// camera is not connected.
    pub async fn send_layout(&self, layout: Layout) -> Result<(), LensError> {
        let (reply, rx) = oneshot::channel();
        self.send(CameraCommand::SendLayout { layout, reply }).await?;
        rx.await.map_err(|_| LensError::SessionEnded)?
    }

    pub async fn toggle_facing(&self) -> Result<(), LensError> {
        self.send(CameraCommand::ToggleFacing).await
    }

    pub async fn restart_capture(&self) -> Result<(), LensError> {
        self.send(CameraCommand::RestartCapture).await
    }

    pub fn status(&self) -> CameraStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CameraStatus> {
        self.status.clone()
    }

    /// Ends the session, releasing the identifier and the capture device.
    pub async fn leave(self) {
        let _ = self.commands.send(CameraCommand::Leave).await;
        let _ = self.task.await;
    }
}
