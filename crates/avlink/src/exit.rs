use std::fmt;
use std::io;

use avlink_frame::FrameError;
use avlink_session::SessionError;

// Exit code constants, sysexits-flavored.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const NOT_READY: i32 = 30;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    let code = match err {
        FrameError::EmptyContent | FrameError::ChunkTooLarge { .. } => USAGE,
        FrameError::UnsupportedVersion { .. }
        | FrameError::Malformed(_)
        | FrameError::InvalidChunkHeader { .. } => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::InvalidCredentials { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::Transport(_)
        | SessionError::ConnectionFailed(_)
        | SessionError::ConnectionLost(_) => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        SessionError::ChannelNotReady { .. } => {
            CliError::new(NOT_READY, format!("{context}: {err}"))
        }
        SessionError::ProviderUnavailable(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
