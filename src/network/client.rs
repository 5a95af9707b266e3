use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::common::{NetworkCommand, NetworkEvent, UserId};

use super::error::ClientError;
use super::http::ChatApi;
use super::protocol::{ClientEvent, Packet, ServerEvent};
use super::transport::{self, ServerEndpoint};

const OUTBOUND_BUFFER: usize = 100;

/// Owns the realtime connection for the lifetime of the window.
pub struct ChatClient {
    endpoint: ServerEndpoint,
    event_sender: mpsc::Sender<NetworkEvent>,
    command_receiver: mpsc::Receiver<NetworkCommand>,
}

impl ChatClient {
    pub fn new(
        endpoint: ServerEndpoint,
        event_sender: mpsc::Sender<NetworkEvent>,
        command_receiver: mpsc::Receiver<NetworkCommand>,
    ) -> Self {
        Self {
            endpoint,
            event_sender,
            command_receiver,
        }
    }

    pub async fn run(mut self) -> Result<(), ClientError> {
        let socket = transport::connect(&self.endpoint).await?;
        let (mut sink, mut stream) = socket.split();

        // Single writer so fetch tasks and the read loop never share the sink.
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);
        let writer = tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                log::trace!("-> {frame}");
                if let Err(err) = sink.send(Message::Text(frame.into())).await {
                    log::warn!("Failed to write to socket: {err}");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let mut channel = Channel::new(
            ChatApi::new(self.endpoint.clone()),
            self.event_sender.clone(),
            outbound_tx,
        );
        log::info!("Network event loop started");

        let result: Result<(), ClientError> = loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => channel.handle_command(command).await,
                        None => break Ok(()),
                    }
                }
                message = stream.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => match channel.handle_frame(text.as_str()).await {
                            Ok(Flow::Continue) => {}
                            Ok(Flow::Stop) => break Ok(()),
                            Err(err) => break Err(err),
                        },
                        Some(Ok(Message::Close(frame))) => {
                            log::info!("Server closed the socket: {frame:?}");
                            break Ok(());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => break Err(err.into()),
                        None => break Ok(()),
                    }
                }
            }
        };

        drop(channel);
        let _ = writer.await;

        if let Err(err) = self.event_sender.send(NetworkEvent::Disconnected).await {
            log::warn!("Failed to notify UI about disconnect: {err}");
        }
        result
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Per-connection handling of commands and inbound frames.
struct Channel {
    api: ChatApi,
    event_sender: mpsc::Sender<NetworkEvent>,
    outbound: mpsc::Sender<String>,
}

impl Channel {
    fn new(
        api: ChatApi,
        event_sender: mpsc::Sender<NetworkEvent>,
        outbound: mpsc::Sender<String>,
    ) -> Self {
        Self {
            api,
            event_sender,
            outbound,
        }
    }

    async fn handle_command(&mut self, command: NetworkCommand) {
        match command {
            NetworkCommand::Join { room } => {
                log::info!("Joining {room}");
                self.emit(ClientEvent::Join { room }).await;
            }
            NetworkCommand::SendMessage(message) => {
                self.emit(ClientEvent::SendMessage(message)).await;
            }
            NetworkCommand::LoadHistory { other } => self.spawn_history(other),
            NetworkCommand::LoadRecents => self.spawn_recents(),
        }
    }

    async fn handle_frame(&mut self, text: &str) -> Result<Flow, ClientError> {
        log::trace!("<- {text}");
        let packet = match Packet::decode(text) {
            Ok(packet) => packet,
            Err(err) => {
                log::warn!("Ignoring malformed frame: {err}");
                return Ok(Flow::Continue);
            }
        };

        match packet {
            Packet::Open(handshake) => {
                log::debug!(
                    "Engine.IO session {} (ping {}ms, timeout {}ms)",
                    handshake.sid,
                    handshake.ping_interval,
                    handshake.ping_timeout
                );
                self.write(Packet::Connect).await;
            }
            Packet::Ping(payload) => self.write(Packet::Pong(payload)).await,
            Packet::Connect => {
                log::info!("Connected to chat server");
                self.notify(NetworkEvent::Connected).await;
                self.spawn_recents();
            }
            Packet::Event { name, data } => match ServerEvent::from_event(&name, data) {
                Ok(ServerEvent::ReceiveMessage(message)) => {
                    self.notify(NetworkEvent::MessageReceived(message)).await;
                }
                Ok(ServerEvent::UpdateRecents) => self.spawn_recents(),
                Ok(ServerEvent::Unknown(name)) => log::debug!("Unhandled event `{name}`"),
                Err(err) => log::warn!("Bad payload for `{name}`: {err}"),
            },
            Packet::ConnectError(message) => return Err(ClientError::ConnectRejected(message)),
            Packet::Close | Packet::Disconnect => {
                log::info!("Server ended the session");
                return Ok(Flow::Stop);
            }
            Packet::Pong(_) | Packet::Noop => {}
        }

        Ok(Flow::Continue)
    }

    async fn emit(&self, event: ClientEvent) {
        match event.into_packet() {
            Ok(packet) => self.write(packet).await,
            Err(err) => log::warn!("Failed to serialize event: {err}"),
        }
    }

    async fn write(&self, packet: Packet) {
        if let Err(err) = self.outbound.send(packet.encode()).await {
            log::warn!("Socket writer is gone: {err}");
        }
    }

    async fn notify(&self, event: NetworkEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("Failed to notify UI: {err}");
        }
    }

    fn spawn_history(&self, other: UserId) {
        let api = self.api.clone();
        let event_sender = self.event_sender.clone();
        tokio::spawn(async move {
            match api.fetch_history(other).await {
                Ok(messages) => {
                    log::debug!("Loaded {} messages with {other}", messages.len());
                    if let Err(err) = event_sender
                        .send(NetworkEvent::HistoryLoaded { other, messages })
                        .await
                    {
                        log::warn!("Failed to notify UI about history: {err}");
                    }
                }
                Err(err) => log::warn!("Failed to load history with {other}: {err}"),
            }
        });
    }

    fn spawn_recents(&self) {
        let api = self.api.clone();
        let event_sender = self.event_sender.clone();
        tokio::spawn(async move {
            match api.fetch_recents().await {
                Ok(recents) => {
                    if let Err(err) = event_sender.send(NetworkEvent::RecentsLoaded(recents)).await {
                        log::warn!("Failed to notify UI about recent chats: {err}");
                    }
                }
                Err(err) => log::warn!("Failed to load recent chats: {err}"),
            }
        });
    }
}
