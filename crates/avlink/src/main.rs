mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "avlink", version, about = "Avatar messaging CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_split_subcommand() {
        let cli = Cli::try_parse_from([
            "avlink",
            "split",
            "hello world",
            "--max-bytes",
            "200",
            "--message-id",
            "m-1",
        ])
        .expect("split args should parse");
        assert!(matches!(cli.command, Command::Split(_)));
    }

    #[test]
    fn rejects_text_and_file_together() {
        let err = Cli::try_parse_from(["avlink", "split", "hello", "--file", "/tmp/x.txt"])
            .expect_err("conflicting args should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_demo_with_provider() {
        let cli = Cli::try_parse_from(["avlink", "demo", "--provider", "relay"])
            .expect("demo args should parse");
        match cli.command {
            Command::Demo(args) => {
                assert!(matches!(args.provider, crate::cmd::DemoProvider::Relay));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_inspect_from_stdin() {
        let cli = Cli::try_parse_from(["avlink", "inspect"]).expect("inspect args should parse");
        assert!(matches!(cli.command, Command::Inspect(_)));
    }
}
