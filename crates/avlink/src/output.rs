use std::io::{IsTerminal, Write};

use avlink_frame::{encode, Frame, FrameBody};
use avlink_session::SessionEvent;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameSummary<'a> {
    kind: &'static str,
    message_id: &'a str,
    chunk_index: Option<u32>,
    is_final: Option<bool>,
    wire_bytes: usize,
    preview: String,
}

fn summarize(frame: &Frame) -> FrameSummary<'_> {
    FrameSummary {
        kind: frame_kind(frame),
        message_id: &frame.message_id,
        chunk_index: frame.chunk_index,
        is_final: frame.is_final,
        wire_bytes: encode(frame).map(|b| b.len()).unwrap_or(0),
        preview: preview(frame),
    }
}

/// Print a table summarizing `frames`, one row per frame. Json and Raw
/// formats emit one wire line per frame instead.
pub fn print_frames(frames: &[Frame], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for frame in frames {
                let summary = summarize(frame);
                println!(
                    "{}",
                    serde_json::to_string(&summary).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "MID", "IDX", "FIN", "BYTES", "PREVIEW"]);
            for frame in frames {
                let summary = summarize(frame);
                table.add_row(vec![
                    summary.kind.to_string(),
                    summary.message_id.to_string(),
                    summary
                        .chunk_index
                        .map(|i| i.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    summary
                        .is_final
                        .map(|f| f.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    summary.wire_bytes.to_string(),
                    summary.preview,
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for frame in frames {
                let summary = summarize(frame);
                println!(
                    "kind={} mid={} idx={:?} fin={:?} bytes={} preview={}",
                    summary.kind,
                    summary.message_id,
                    summary.chunk_index,
                    summary.is_final,
                    summary.wire_bytes,
                    summary.preview
                );
            }
        }
        OutputFormat::Raw => {
            for frame in frames {
                if let Ok(bytes) = encode(frame) {
                    print_raw(&bytes);
                    println!();
                }
            }
        }
    }
}

/// Print one normalized session event, for the demo command.
pub fn print_event(event: &SessionEvent, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let line = match event {
                SessionEvent::ChatChunk {
                    message_id,
                    text,
                    first,
                } => serde_json::json!({
                    "event": "chat-chunk", "mid": message_id, "text": text, "first": first,
                }),
                SessionEvent::ChatMessage {
                    message_id, text, ..
                } => serde_json::json!({
                    "event": "chat-message", "mid": message_id, "text": text,
                }),
                SessionEvent::CommandAck { cmd, code, msg } => serde_json::json!({
                    "event": "command-ack", "cmd": cmd, "code": code, "msg": msg,
                }),
                SessionEvent::AvatarEvent { name, data } => serde_json::json!({
                    "event": "avatar-event", "name": name, "data": data,
                }),
                SessionEvent::StateChanged(state) => serde_json::json!({
                    "event": "state-changed",
                    "state": serde_json::to_value(state).unwrap_or_default(),
                }),
                other => serde_json::json!({ "event": format!("{other:?}") }),
            };
            println!("{line}");
        }
        _ => println!("{event:?}"),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn frame_kind(frame: &Frame) -> &'static str {
    match &frame.body {
        FrameBody::Command(_) => "command",
        FrameBody::Chat(_) => "chat",
        FrameBody::Event(_) => "event",
    }
}

fn preview(frame: &Frame) -> String {
    const MAX: usize = 48;
    let text = match &frame.body {
        FrameBody::Chat(p) => p.text.clone(),
        FrameBody::Command(p) => p.cmd.clone(),
        FrameBody::Event(p) => p.event.clone(),
    };
    if text.chars().count() > MAX {
        let cut: String = text.chars().take(MAX).collect();
        format!("{cut}…")
    } else {
        text
    }
}
