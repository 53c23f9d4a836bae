use std::time::{Instant, SystemTime, UNIX_EPOCH};

use avlink_frame::{
    decode, encode, ChatSource, ChunkPacer, CommandPayload, Frame, FrameBody, FrameError,
    Reassembler, SplitConfig,
};
use avlink_transport::{Delivery, RealtimeChannel};
use tracing::{debug, warn};

use crate::error::{Result, SessionError};
use crate::events::{EventBus, SessionEvent};
use crate::retry::{self, ReadyOutcome, RetryPolicy};

/// Chunked-messaging engine shared by the concrete providers: outbound
/// splitting and pacing, readiness-guarded commands, and inbound decode,
/// reassembly, and typed dispatch.
///
/// One engine per transport session; its reassembly buffers must be cleared
/// on disconnect.
#[derive(Debug)]
pub struct Messaging {
    split: SplitConfig,
    pacer: ChunkPacer,
    reassembler: Reassembler,
    retry: RetryPolicy,
    counter: u64,
}

impl Default for Messaging {
    fn default() -> Self {
        Self::new(
            SplitConfig::default(),
            ChunkPacer::default(),
            RetryPolicy::default(),
        )
    }
}

impl Messaging {
    pub fn new(split: SplitConfig, pacer: ChunkPacer, retry: RetryPolicy) -> Self {
        Self {
            split,
            pacer,
            reassembler: Reassembler::default(),
            retry,
            counter: 0,
        }
    }

    /// Split `text` into chunk frames and send them in index order,
    /// best-effort, pacing every chunk except the final one. Returns the
    /// generated message id.
    pub fn send_chat(&mut self, channel: &mut dyn RealtimeChannel, text: &str) -> Result<String> {
        if !channel.messaging_open() {
            return Err(SessionError::ChannelNotReady {
                state: channel_state_label(channel),
                identity: channel.local_identity(),
            });
        }

        let message_id = self.next_message_id();
        let frames = avlink_frame::split_chat(&message_id, text, &self.split)?;
        let last = frames.len() - 1;

        for (i, frame) in frames.iter().enumerate() {
            let bytes = encode(frame)?;
            let started = Instant::now();
            channel.send_data(&bytes, Delivery::BestEffort)?;
            if i < last {
                self.pacer.pace(bytes.len(), started);
            }
        }

        debug!(message_id, chunks = frames.len(), "chat sent");
        Ok(message_id)
    }

    /// Send a control command, guarded by the readiness retry: the channel
    /// must be open *and* have a local identity, two separate asynchronous
    /// completions on most transports. Commands bypass pacing and request
    /// reliable delivery.
    pub fn send_command(
        &mut self,
        channel: &mut dyn RealtimeChannel,
        payload: CommandPayload,
    ) -> Result<ReadyOutcome<()>> {
        let message_id = self.next_message_id();
        let cmd = payload.cmd.clone();
        let bytes = encode(&Frame::command(&message_id, payload))?;

        let outcome = retry::run_when_ready(
            &self.retry,
            channel,
            |c| c.messaging_open() && c.local_identity().is_some(),
            |c| (channel_state_label(c), c.local_identity()),
            |c| c.send_data(&bytes, Delivery::Reliable),
        );

        match outcome {
            ReadyOutcome::Ran(result) => {
                result?;
                debug!(message_id, cmd, "command sent");
                Ok(ReadyOutcome::Ran(()))
            }
            ReadyOutcome::NotReady(report) => Ok(ReadyOutcome::NotReady(report)),
        }
    }

    /// Decode inbound data-channel bytes and dispatch typed events.
    ///
    /// Undecodable bytes are surfaced as opaque [`SessionEvent::SystemText`]
    /// rather than dropped; frames with an unsupported version or broken
    /// chunk header go to the subscriber error channel.
    pub fn handle_data(&mut self, bytes: &[u8], bus: &EventBus) {
        match decode(bytes) {
            Ok(frame) => self.dispatch(frame, bus),
            Err(err @ FrameError::UnsupportedVersion { .. })
            | Err(err @ FrameError::InvalidChunkHeader { .. }) => {
                warn!(error = %err, "rejected inbound frame");
                bus.emit(&SessionEvent::Error(err.to_string()));
            }
            Err(_) => {
                bus.emit(&SessionEvent::SystemText(
                    String::from_utf8_lossy(bytes).into_owned(),
                ));
            }
        }
    }

    /// Drop all partially reassembled messages. Called on disconnect.
    pub fn clear(&mut self) {
        self.reassembler.clear();
    }

    fn dispatch(&mut self, frame: Frame, bus: &EventBus) {
        let message_id = frame.message_id;
        match frame.body {
            FrameBody::Chat(payload) => {
                let from = payload.from.unwrap_or(ChatSource::Bot);
                if let (Some(index), Some(is_final)) = (frame.chunk_index, frame.is_final) {
                    let update =
                        self.reassembler
                            .accept_chunk(&message_id, index, is_final, &payload.text);
                    bus.emit(&SessionEvent::ChatChunk {
                        message_id: message_id.clone(),
                        text: update.delta,
                        first: update.first,
                    });
                    if let Some(text) = update.completed {
                        bus.emit(&SessionEvent::ChatMessage {
                            message_id,
                            text,
                            from,
                        });
                    }
                } else {
                    bus.emit(&SessionEvent::ChatMessage {
                        message_id,
                        text: payload.text,
                        from,
                    });
                }
            }
            FrameBody::Command(payload) if payload.is_ack() => {
                bus.emit(&SessionEvent::CommandAck {
                    cmd: payload.cmd,
                    code: payload.code.unwrap_or(0),
                    msg: payload.msg,
                });
            }
            FrameBody::Command(payload) => {
                // This side never executes remote command invocations.
                debug!(cmd = %payload.cmd, "ignoring inbound command frame");
            }
            FrameBody::Event(payload) => {
                bus.emit(&SessionEvent::AvatarEvent {
                    name: payload.event,
                    data: payload.data,
                });
            }
        }
    }

    fn next_message_id(&mut self) -> String {
        self.counter += 1;
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        format!("msg-{millis}-{}", self.counter)
    }
}

fn channel_state_label(channel: &dyn RealtimeChannel) -> String {
    match (channel.messaging_open(), channel.local_identity().is_some()) {
        (true, true) => "ready".to_string(),
        (true, false) => "open-awaiting-identity".to_string(),
        (false, true) => "identity-without-channel".to_string(),
        (false, false) => "not-ready".to_string(),
    }
}
