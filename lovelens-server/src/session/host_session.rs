use crate::judge::{CommentaryBoard, InferenceService, JudgeInvoker};
use crate::media::MediaStream;
use crate::session::{
    HostCommand, LayoutDirector, SessionConfig, join_opt, next_event, sleep_until_opt,
};
use crate::signaling::{PeerEndpoint, Switchboard};
use crate::transport::{ConnectionRegistry, ControlChannel, PeerEvent, SlotFeed, SlotFeeds};
use bytes::Bytes;
use lovelens_core::{
    CallId, Commentary, ControlMessage, Language, Layout, LensError, LinkId, Mode, PeerId,
    RoomCode, Slot, StreamId,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Idle,
    Listening,
}

/// Snapshot of the host display, published after every event.
#[derive(Debug, Clone, PartialEq)]
pub struct HostStatus {
    pub state: HostState,
    pub room: RoomCode,
    pub host_id: PeerId,
    pub mode: Mode,
    pub layout: Layout,
    pub language: Language,
    pub feeds: [Option<StreamId>; 2],
    pub connections: usize,
    pub commentary: Option<Commentary>,
    pub analyzing: bool,
}

impl HostStatus {
    pub fn is_online(&self, slot: Slot) -> bool {
        self.feeds[slot.index()].is_some()
    }
}

/// The display peer of a room.
///
/// Registers the room's host identifier, answers camera calls receive-only,
/// tracks control links and keeps every open link in sync with the mode.
/// All state lives in the session task; the [`HostHandle`] only sends
/// commands and reads published snapshots.
pub struct HostSession {
    room: RoomCode,
    host_id: PeerId,
    switchboard: Switchboard,
    endpoint: Option<PeerEndpoint>,
    registry: ConnectionRegistry,
    feeds: SlotFeeds,
    state: HostState,
    mode: Mode,
    director: LayoutDirector,
    language: Language,
    judge: JudgeInvoker,
    board: CommentaryBoard,
    analysis: Option<JoinHandle<Commentary>>,
    pending_reply: Option<oneshot::Sender<Result<Commentary, LensError>>>,
    commands: mpsc::Receiver<HostCommand>,
    status: watch::Sender<HostStatus>,
}

impl HostSession {
    /// Registers the host identifier for `room` and starts listening.
    /// Fails with `IdTaken` when the room already has a host.
    pub fn spawn(
        switchboard: &Switchboard,
        room: RoomCode,
        config: SessionConfig,
        inference: Arc<dyn InferenceService>,
    ) -> Result<HostHandle, LensError> {
        let host_id = config.identity(room.clone()).host_id();
        let endpoint = switchboard.register(host_id.clone())?;

        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (status_tx, status_rx) = watch::channel(HostStatus {
            state: HostState::Listening,
            room: room.clone(),
            host_id: host_id.clone(),
            mode: Mode::default(),
            layout: Layout::default(),
            language: Language::default(),
            feeds: [None, None],
            connections: 0,
            commentary: None,
            analyzing: false,
        });

        let session = HostSession {
            room,
            host_id: host_id.clone(),
            switchboard: switchboard.clone(),
            endpoint: Some(endpoint),
            registry: ConnectionRegistry::new(),
            feeds: SlotFeeds::new(),
            state: HostState::Listening,
            mode: Mode::default(),
            director: LayoutDirector::new(),
            language: Language::default(),
            judge: JudgeInvoker::new(inference),
            board: CommentaryBoard::new(config.commentary_ttl),
            analysis: None,
            pending_reply: None,
            commands: cmd_rx,
            status: status_tx,
        };
        let task = tokio::spawn(session.run());

        Ok(HostHandle {
            host_id,
            commands: cmd_tx,
            status: status_rx,
            task,
        })
    }

    async fn run(mut self) {
        info!(host = %self.host_id, "Host session listening");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(HostCommand::Leave) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },

                event = next_event(&mut self.endpoint) => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        warn!(host = %self.host_id, "Host identifier released");
                        break;
                    }
                },

                verdict = join_opt(&mut self.analysis) => self.finish_analysis(verdict),

                _ = sleep_until_opt(self.board.deadline()) => {
                    if self.board.expire(Instant::now()) {
                        debug!("Commentary cleared");
                    }
                }
            }

            self.publish();
        }

        self.teardown();
    }

    fn handle_command(&mut self, cmd: HostCommand) {
        match cmd {
            HostCommand::SetMode(mode) => self.set_mode(mode),
            HostCommand::SetLayout(layout) => {
                self.director.apply(None, layout);
            }
            HostCommand::SetLanguage(language) => self.language = language,
            HostCommand::Judge { reply } => self.start_analysis(reply),
            HostCommand::Leave => {}
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        let delivered = self.registry.broadcast(&ControlMessage::Status { mode });
        info!(%mode, cameras = delivered, "Mode changed");
    }

    fn handle_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::Open(id) => info!(host = %id, "Host registered"),

            PeerEvent::Connection { link, remote } => {
                let Some(endpoint) = &self.endpoint else {
                    return;
                };
                debug!(%remote, %link, "Incoming control link");
                self.registry
                    .insert(ControlChannel::accept(endpoint, link, remote));
            }

            PeerEvent::ConnectionOpen { link } => {
                let mode = self.mode;
                let Some(channel) = self.registry.open(link) else {
                    return;
                };
                info!(remote = %channel.remote(), "Control link open");
                if let Err(e) = channel.send(&ControlMessage::Status { mode }) {
                    warn!(remote = %channel.remote(), "Failed to push mode: {}", e);
                }
            }

            PeerEvent::Data { link, payload } => self.handle_data(link, payload),

            PeerEvent::ConnectionClosed { link } => {
                if let Some(channel) = self.registry.remove_link(link) {
                    info!(remote = %channel.remote(), "Control link closed");
                }
            }

            PeerEvent::Call {
                call,
                remote,
                stream,
            } => self.accept_call(call, remote, stream),

            PeerEvent::CallAnswered { .. } => {}

            PeerEvent::CallClosed { call } => {
                if let Some(slot) = self.feeds.detach_call(call) {
                    info!(%slot, "Slot offline");
                }
            }
        }
    }

    fn handle_data(&mut self, link: LinkId, payload: Bytes) {
        let Some(channel) = self.registry.find_by_link_mut(link) else {
            debug!(%link, "Data on untracked link");
            return;
        };
        if !channel.is_open() {
            return;
        }

        let message = match channel.receive(&payload) {
            Ok(message) => message,
            Err(e) => {
                warn!(remote = %channel.remote(), "Ignoring control message: {}", e);
                return;
            }
        };

        match message {
            ControlMessage::Hello { source } => {
                if channel.remote().matches_slot(source) {
                    channel.declare(source);
                    debug!(remote = %channel.remote(), %source, "Camera declared slot");
                    return;
                }
                let remote = channel.remote().clone();
                warn!(%remote, declared = %source, "Declared slot does not match identifier");
                self.drop_peer(&remote);
            }
            ControlMessage::Command { source, layout } => {
                self.director.apply(Some(source), layout);
            }
            ControlMessage::Status { .. } => {}
        }
    }

    fn accept_call(&mut self, call: CallId, remote: PeerId, stream: MediaStream) {
        let Some(slot) = remote.slot() else {
            warn!(%remote, "Rejecting call from unclassifiable peer");
            self.switchboard.hang_up(call);
            return;
        };

        let declared = self
            .registry
            .find_by_remote(&remote)
            .and_then(ControlChannel::declared);
        if declared.is_some_and(|declared| declared != slot) {
            warn!(%remote, "Rejecting call that contradicts the declared slot");
            self.switchboard.hang_up(call);
            return;
        }

        if let Err(e) = self.switchboard.answer(call) {
            warn!(%remote, "Call vanished before answer: {}", e);
            return;
        }

        info!(%slot, %remote, stream = %stream.id(), "Slot online");
        let feed = SlotFeed {
            call,
            remote,
            stream,
        };
        if let Some(previous) = self.feeds.attach(slot, feed) {
            debug!(%slot, call = %previous.call, "Superseded feed");
            self.switchboard.hang_up(previous.call);
        }
    }

    /// Forgets a peer entirely: its control link and any feed it provides.
    fn drop_peer(&mut self, remote: &PeerId) {
        drop(self.registry.remove_remote(remote));
        for feed in self.feeds.detach_remote(remote) {
            self.switchboard.hang_up(feed.call);
        }
    }

    fn start_analysis(&mut self, reply: oneshot::Sender<Result<Commentary, LensError>>) {
        if self.analysis.is_some() {
            let _ = reply.send(Err(LensError::AnalysisInProgress));
            return;
        }

        let frame = match JudgeInvoker::capture(self.director.layout(), &self.feeds) {
            Ok(frame) => frame,
            Err(e) => {
                info!("Judge request refused: {}", e);
                let _ = reply.send(Err(e));
                return;
            }
        };

        let judge = self.judge.clone();
        let (mode, language) = (self.mode, self.language);
        self.analysis = Some(tokio::spawn(async move {
            judge.score(frame, mode, language).await
        }));
        self.pending_reply = Some(reply);
    }

    fn finish_analysis(&mut self, verdict: Result<Commentary, JoinError>) {
        self.analysis = None;
        let commentary = verdict.unwrap_or_else(|e| {
            warn!("Analysis task failed: {}", e);
            Commentary::fallback()
        });

        self.board.show(commentary.clone());
        if let Some(reply) = self.pending_reply.take() {
            let _ = reply.send(Ok(commentary));
        }
    }

    fn snapshot(&self) -> HostStatus {
        HostStatus {
            state: self.state,
            room: self.room.clone(),
            host_id: self.host_id.clone(),
            mode: self.mode,
            layout: self.director.layout(),
            language: self.language,
            feeds: self.feeds.stream_ids(),
            connections: self.registry.open_count(),
            commentary: self.board.current().cloned(),
            analyzing: self.analysis.is_some(),
        }
    }

    fn publish(&self) {
        self.status.send_replace(self.snapshot());
    }

    fn teardown(&mut self) {
        if let Some(task) = self.analysis.take() {
            task.abort();
        }
        if let Some(reply) = self.pending_reply.take() {
            let _ = reply.send(Err(LensError::SessionEnded));
        }

        self.registry.clear();
        for feed in self.feeds.clear() {
            self.switchboard.hang_up(feed.call);
        }
        self.endpoint = None;

        self.mode = Mode::default();
        self.director.reset();
        self.board.clear();
        self.state = HostState::Idle;
        self.publish();

        info!(host = %self.host_id, "Host session ended");
    }
}

/// Control surface of a running [`HostSession`].
pub struct HostHandle {
    host_id: PeerId,
    commands: mpsc::Sender<HostCommand>,
    status: watch::Receiver<HostStatus>,
    task: JoinHandle<()>,
}

impl HostHandle {
    pub fn host_id(&self) -> &PeerId {
        &self.host_id
    }

    async fn send(&self, cmd: HostCommand) -> Result<(), LensError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| LensError::SessionEnded)
    }

    /// Switches the mode; every open camera link gets a STATUS.
    pub async fn set_mode(&self, mode: Mode) -> Result<(), LensError> {
        self.send(HostCommand::SetMode(mode)).await
    }

    pub async fn set_layout(&self, layout: Layout) -> Result<(), LensError> {
        self.send(HostCommand::SetLayout(layout)).await
    }

    pub async fn set_language(&self, language: Language) -> Result<(), LensError> {
        self.send(HostCommand::SetLanguage(language)).await
    }

    /// Judges the feed on screen. Resolves once the commentary is displayed.
    pub async fn judge(&self) -> Result<Commentary, LensError> {
        let (reply, rx) = oneshot::channel();
        self.send(HostCommand::Judge { reply }).await?;
        rx.await.map_err(|_| LensError::SessionEnded)?
    }

    pub fn status(&self) -> HostStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HostStatus> {
        self.status.clone()
    }

    /// Ends the session and waits for its teardown.
    pub async fn leave(self) {
        let _ = self.commands.send(HostCommand::Leave).await;
        let _ = self.task.await;
    }
}
