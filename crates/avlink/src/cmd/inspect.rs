use std::fs;
use std::io::Read;

use avlink_frame::{decode, Frame, FrameBody, Reassembler};
use tracing::warn;

use crate::cmd::InspectArgs;
use crate::exit::{io_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frames, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(&args)?;

    let mut frames = Vec::new();
    let mut invalid = 0usize;
    for (number, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match decode(line.as_bytes()) {
            Ok(frame) => frames.push(frame),
            Err(err) => {
                warn!(line = number + 1, error = %err, "undecodable frame");
                invalid += 1;
            }
        }
    }

    print_frames(&frames, format);
    report_messages(&frames);

    if invalid > 0 {
        Ok(DATA_INVALID)
    } else {
        Ok(SUCCESS)
    }
}

/// Run the decoded chat chunks through reassembly and report which messages
/// completed and which are still missing chunks.
fn report_messages(frames: &[Frame]) {
    let mut reassembler = Reassembler::default();
    let mut completed = Vec::new();
    for frame in frames {
        if let (Some(index), Some(is_final), FrameBody::Chat(payload)) =
            (frame.chunk_index, frame.is_final, &frame.body)
        {
            let update =
                reassembler.accept_chunk(&frame.message_id, index, is_final, &payload.text);
            if let Some(text) = update.completed {
                completed.push((frame.message_id.clone(), text));
            }
        }
    }

    for (message_id, text) in &completed {
        eprintln!("reassembled {message_id}: {text}");
    }
    let pending = reassembler.pending();
    if pending > 0 {
        eprintln!("{pending} message(s) still missing chunks");
    }
}

fn read_input(args: &InspectArgs) -> CliResult<String> {
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(buffer)
}
