use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod demo;
pub mod inspect;
pub mod split;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split chat text into wire chunks and print them.
    Split(SplitArgs),
    /// Decode frames from a file or stdin and reassemble chat messages.
    Inspect(InspectArgs),
    /// Run a session round trip over the in-process loopback transport.
    Demo(DemoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Split(args) => split::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Demo(args) => demo::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Chat text to split.
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,
    /// Read the chat text from a file instead.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    /// Frame size ceiling in bytes.
    #[arg(long, default_value_t = avlink_frame::DEFAULT_MAX_FRAME_BYTES)]
    pub max_bytes: usize,
    /// Message id to stamp on every chunk.
    #[arg(long, default_value = "msg-cli")]
    pub message_id: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// File of frames, one JSON frame per line. Reads stdin when omitted.
    pub file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DemoProvider {
    Sfu,
    Relay,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Chat text to send through the demo session.
    #[arg(default_value = "hello avatar, tell me about the weather")]
    pub text: String,
    /// Which provider session to exercise.
    #[arg(long, value_enum, default_value = "sfu")]
    pub provider: DemoProvider,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
