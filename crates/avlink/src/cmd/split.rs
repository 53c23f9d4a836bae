use std::fs;

use avlink_frame::{split_chat, SplitConfig};

use crate::cmd::SplitArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frames, OutputFormat};

pub fn run(args: SplitArgs, format: OutputFormat) -> CliResult<i32> {
    let text = resolve_text(&args)?;
    let config = SplitConfig {
        max_frame_bytes: args.max_bytes,
    };

    let frames =
        split_chat(&args.message_id, &text, &config).map_err(|err| frame_error("split", err))?;
    print_frames(&frames, format);
    Ok(SUCCESS)
}

fn resolve_text(args: &SplitArgs) -> CliResult<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "provide chat text or --file"))
}
