//! Purpose: `keycodec` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits results on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All decoding goes through `api::Decoder` so CLI and library agree.
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use keycodec::api::{Engine, Error, ErrorKind, to_exit_code};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome { exit_code });
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Run `keycodec --help` for usage."));
            }
        },
    };

    command_dispatch::dispatch_command(cli.command)
}

#[derive(Parser)]
#[command(
    name = "keycodec",
    version,
    about = "Typed keyed reads and format conversion for JSON and CBOR documents",
    long_about = None,
    after_help = r#"EXAMPLES
  $ echo '{"numbers": [1, 2, "3", 4]}' | keycodec get numbers --as int --lossy
  [1,2,4]
  $ keycodec get user address zip --input doc.json --as string
  $ keycodec transcode --from json --to cbor --input doc.json > doc.cbor
  $ keycodec get born --date-pattern '[year]-[month]-[day]' --input doc.json"#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-encode a whole document from one engine to another.
    ///
    /// Documents pass through a JSON value tree, so CBOR byte strings
    /// and non-string map keys are rejected as type mismatches.
    Transcode {
        #[arg(
            long,
            default_value = "json",
            help = "Input engine (json, cbor); CBOR input must be JSON-representable"
        )]
        from: Engine,
        #[arg(long, default_value = "json", help = "Output engine (json, cbor)")]
        to: Engine,
        #[arg(long, help = "Pretty-print JSON output")]
        pretty: bool,
        #[arg(long, value_hint = ValueHint::FilePath, help = "Read from a file instead of stdin")]
        input: Option<PathBuf>,
    },
    /// Decode one keyed value; leading keys select nested containers.
    Get {
        #[arg(required = true, num_args = 1.., help = "Key path, outermost first")]
        keys: Vec<String>,
        #[arg(long = "as", value_enum, default_value_t = ValueType::Any)]
        value_type: ValueType,
        #[arg(long, help = "Print null instead of failing when the key is absent")]
        if_present: bool,
        #[arg(long, help = "Decode an array, dropping elements that do not match --as")]
        lossy: bool,
        #[arg(
            long,
            conflicts_with_all = ["lossy", "value_type"],
            help = "Parse the value as a date with this pattern and print it as RFC 3339"
        )]
        date_pattern: Option<String>,
        #[arg(
            long,
            default_value = "json",
            help = "Input engine (json, cbor); CBOR input must be JSON-representable"
        )]
        from: Engine,
        #[arg(long, value_hint = ValueHint::FilePath, help = "Read from a file instead of stdin")]
        input: Option<PathBuf>,
    },
    /// Generate shell completion scripts.
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ValueType {
    Any,
    Int,
    Float,
    String,
    Bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .next()
        .unwrap_or("invalid arguments")
        .trim_start_matches("error: ")
        .to_string()
}

fn read_input(input: Option<&Path>) -> Result<Vec<u8>, Error> {
    match input {
        Some(path) => std::fs::read(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        }),
        None => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(bytes)
        }
    }
}

fn write_output(bytes: &[u8]) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write stdout")
                .with_source(err)
        })
}

fn emit_json(value: &Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Encode\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::KeyNotFound => "key not found".to_string(),
        ErrorKind::TypeMismatch => "type mismatch".to_string(),
        ErrorKind::DataCorrupted => "corrupted data".to_string(),
        ErrorKind::TransformFailure => "value transform failed".to_string(),
        ErrorKind::Encode => "encode failed".to_string(),
        ErrorKind::Decode => "decode failed".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = std::error::Error::source(err);
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(key) = err.key() {
        inner.insert("key".to_string(), json!(key));
    }
    if !err.path().is_empty() {
        inner.insert("path".to_string(), json!(err.path()));
    }
    if let Some(expected) = err.expected() {
        inner.insert("expected".to_string(), json!(expected.as_str()));
    }
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(key) = err.key() {
        let mut location = err.path().to_vec();
        location.push(key.to_string());
        lines.push(format!("key: {}", location.join(".")));
    }
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, error_json, error_text};
    use std::io;

    #[test]
    fn error_text_shows_location_and_first_cause() {
        let err = Error::new(ErrorKind::Io)
            .with_message("failed to read doc.json")
            .with_key("zip")
            .with_path(["user".to_string()])
            .with_source(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        let text = error_text(&err);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "error: failed to read doc.json",
                "key: user.zip",
                "caused by: no such file",
            ]
        );
    }

    #[test]
    fn error_text_without_source_has_no_cause_line() {
        let err = Error::new(ErrorKind::Usage).with_message("bad input");
        assert!(!error_text(&err).contains("caused by:"));
        assert!(error_json(&err)["error"].get("causes").is_none());
    }
}
