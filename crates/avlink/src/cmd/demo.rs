//! End-to-end round trip over the loopback transport: one coordinator-driven
//! session on the near side, a scripted avatar endpoint on the far side.

use std::sync::Mutex;

use avlink_frame::{
    decode, encode, split_chat, CommandPayload, Frame, FrameBody, Reassembler, SplitConfig,
    ACK_SUCCESS,
};
use avlink_session::{
    Credentials, ProviderKind, ProviderRegistry, RelaySession, SessionCoordinator, SfuSession,
};
use avlink_transport::{ChannelSignal, Delivery, LoopbackChannel, RealtimeChannel};

use crate::cmd::{DemoArgs, DemoProvider};
use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_event, OutputFormat};

pub fn run(args: DemoArgs, format: OutputFormat) -> CliResult<i32> {
    let (near, mut far) = LoopbackChannel::pair();

    let (kind, credentials) = match args.provider {
        DemoProvider::Sfu => (
            ProviderKind::Sfu,
            Credentials::Sfu {
                app_id: "demo-app".to_string(),
                room: "demo-room".to_string(),
                token: "demo-token".to_string(),
            },
        ),
        DemoProvider::Relay => (
            ProviderKind::Relay,
            Credentials::Relay {
                endpoint: "demo-room".to_string(),
                token: "demo-token".to_string(),
            },
        ),
    };

    let mut coordinator = SessionCoordinator::new(registry(kind, near));
    coordinator.subscribe(move |event| print_event(event, format));
    coordinator
        .select_provider(kind)
        .map_err(|err| session_error("select provider", err))?;

    // The far side joins first so peer signals are waiting when we connect.
    far.join("demo-room", "demo-token")
        .map_err(|err| CliError::new(INTERNAL, format!("far join: {err}")))?;

    coordinator
        .connect(&credentials)
        .map_err(|err| session_error("connect", err))?;
    coordinator.pump();

    let message_id = coordinator
        .send_chat(&args.text)
        .map_err(|err| session_error("send chat", err))?;
    coordinator
        .send_command(CommandPayload::interrupt())
        .map_err(|err| session_error("send command", err))?;

    avatar_endpoint(&mut far, &message_id)?;
    coordinator.pump();
    coordinator.shutdown();

    Ok(SUCCESS)
}

fn registry(kind: ProviderKind, channel: LoopbackChannel) -> ProviderRegistry {
    let slot = Mutex::new(Some(channel));
    let mut registry = ProviderRegistry::new();
    registry.register(kind, move |bus| {
        let channel = slot
            .lock()
            .expect("channel slot")
            .take()
            .expect("demo factory runs once");
        let session: Box<dyn avlink_session::AvatarSession> = match kind {
            ProviderKind::Relay => Box::new(RelaySession::new(Box::new(channel), bus)),
            _ => Box::new(SfuSession::new(Box::new(channel), bus)),
        };
        Ok(session)
    });
    registry
}

/// Scripted far side: reassemble the inbound chat, acknowledge the command,
/// then reply with a chunked echo and a typed event.
fn avatar_endpoint(far: &mut LoopbackChannel, expected_mid: &str) -> CliResult<()> {
    let mut reassembler = Reassembler::default();
    let mut echoed = None;

    while let Some(signal) = far.try_signal() {
        let ChannelSignal::Data { bytes, .. } = signal else {
            continue;
        };
        let frame = decode(&bytes)
            .map_err(|err| CliError::new(INTERNAL, format!("far decode: {err}")))?;
        match frame.body {
            FrameBody::Chat(payload) => {
                if let (Some(index), Some(is_final)) = (frame.chunk_index, frame.is_final) {
                    let update = reassembler.accept_chunk(
                        &frame.message_id,
                        index,
                        is_final,
                        &payload.text,
                    );
                    if let Some(text) = update.completed {
                        echoed = Some(text);
                    }
                }
            }
            FrameBody::Command(payload) => {
                let ack = Frame::command(
                    &frame.message_id,
                    CommandPayload::ack(&payload.cmd, ACK_SUCCESS, Some("ok")),
                );
                send_frame(far, &ack)?;
            }
            FrameBody::Event(_) => {}
        }
    }

    let Some(text) = echoed else {
        return Err(CliError::new(
            INTERNAL,
            format!("chat {expected_mid} never completed on the far side"),
        ));
    };

    let reply_id = format!("{expected_mid}-echo");
    let reply = format!("you said: {text}");
    for frame in split_chat(&reply_id, &reply, &SplitConfig::default())
        .map_err(|err| CliError::new(INTERNAL, format!("far split: {err}")))?
    {
        send_frame(far, &frame)?;
    }

    let event = Frame::event(
        &format!("{expected_mid}-event"),
        avlink_frame::EventPayload {
            event: "speaking-started".to_string(),
            data: None,
        },
    );
    send_frame(far, &event)
}

fn send_frame(far: &mut LoopbackChannel, frame: &Frame) -> CliResult<()> {
    let bytes = encode(frame).map_err(|err| CliError::new(INTERNAL, format!("encode: {err}")))?;
    far.send_data(&bytes, Delivery::Reliable)
        .map_err(|err| CliError::new(INTERNAL, format!("far send: {err}")))?;
    Ok(())
}
