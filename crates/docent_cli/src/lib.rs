mod cmd;
mod ctx;
pub mod error;
mod parser;
mod table;
mod upload;

use std::{
    env, fmt,
    io::{IsTerminal as _, Write as _, stderr, stdout},
    process::ExitCode,
};

use camino::{FromPathBufError, Utf8PathBuf};
use clap::{ArgAction, Parser};
use cmd::{Commands, Output, Success};
use comfy_table::{Cell, CellAlignment, Row};
use ctx::Ctx;
use docent_config::{AppConfig, model::ModelId};
use error::Result;
use serde_json::Value;
use tracing::{debug, trace};

/// Chat with an LLM about the contents of a PDF.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten, next_help_heading = "Global Options")]
    globals: Globals,

    #[command(subcommand, next_help_heading = "Options")]
    command: Commands,
}

#[derive(Debug, Default, clap::Args)]
pub struct Globals {
    /// The model to chat with.
    ///
    /// Either `provider/name` (e.g. `google/gemini-1.5-pro`) or the name of
    /// a model listed by `docent models`.
    #[arg(short, long, global = true, value_parser = parser::model_id)]
    model: Option<ModelId>,

    /// API key for the model provider.
    ///
    /// Takes precedence over the environment variable configured for the
    /// provider.
    #[arg(long, global = true, value_name = "KEY")]
    api_key: Option<String>,

    /// Load configuration from this file instead of `./docent.toml`.
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<Utf8PathBuf>,

    /// Increase verbosity of logging.
    ///
    /// Can be specified multiple times to increase verbosity.
    ///
    /// Defaults to printing "error" messages. For each increase in verbosity,
    /// the log level is set to "warn", "info", "debug", and "trace"
    /// respectively.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Disable logging, including errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl fmt::Display for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entry(&"model", &self.globals.model.as_ref().map(ToString::to_string))
            .entry(&"api_key", &self.globals.api_key.is_some())
            .entry(&"config", &self.globals.config)
            .entry(&"verbose", &self.globals.verbose)
            .entry(&"quiet", &self.globals.quiet)
            .finish()
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let is_tty = stdout().is_terminal();

    configure_logging(cli.globals.verbose, cli.globals.quiet);
    trace!(command = cli.command.name(), arguments = %cli, "Starting CLI run.");

    let (code, output) = match run_inner(cli, is_tty) {
        Ok(output) if is_tty => (0, output_to_string(output)),
        Ok(output) => (0, parse_json_output(output)),
        Err(error) => parse_error(error, is_tty),
    };

    if !output.is_empty() {
        let written = if code == 0 {
            writeln!(stdout().lock(), "{output}")
        } else {
            writeln!(stderr().lock(), "{output}")
        };

        if written.is_err() {
            return ExitCode::FAILURE;
        }
    }

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn run_inner(cli: Cli, is_tty: bool) -> Result<Success> {
    match cli.command {
        Commands::Init(args) => args.run().map_err(Into::into),
        cmd => {
            let config = load_config(&cli.globals)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;

            let mut ctx = Ctx::new(cli.globals, config, is_tty);
            let output: Output = runtime.block_on(cmd.run(&mut ctx));

            output.map_err(Into::into)
        }
    }
}

fn output_to_string(output: Success) -> String {
    match output {
        Success::Ok => String::new(),
        Success::Message(msg) => msg,
        Success::Table { header, rows } => table::list(header, rows),
        Success::Details { title, rows } => table::details(title.as_deref(), rows),
        Success::Json(value) => value.to_string(),
    }
}

fn parse_json_output(output: Success) -> String {
    let value = match output {
        Success::Ok => return String::new(),
        Success::Message(msg) => serde_json::json!({ "message": msg }),
        Success::Table { header, rows } => table::list_json(&header, rows),
        Success::Details { title, rows } => table::details_json(title.as_deref(), rows),
        Success::Json(value) => value,
    };

    value.to_string()
}

fn parse_error(error: error::Error, is_tty: bool) -> (i32, String) {
    render_error(error.into(), is_tty)
}

/// Format a command error for display, returning the exit code alongside.
pub(crate) fn render_error(error: cmd::Error, is_tty: bool) -> (i32, String) {
    let cmd::Error {
        code,
        message,
        metadata,
    } = error;
    let message = message.map(strip_ansi_escapes::strip_str);

    if is_tty {
        let rows = metadata
            .into_iter()
            .map(|(k, v)| {
                let mut row = Row::new();
                row.add_cell(Cell::new(k).set_alignment(CellAlignment::Right))
                    .add_cell(Cell::new(display_value(v)).set_alignment(CellAlignment::Left));
                row
            })
            .collect::<Vec<_>>();

        return (code.into(), table::details(message.as_deref(), rows));
    }

    let metadata: serde_json::Map<String, Value> = metadata.into_iter().collect();
    let error = serde_json::json!({
        "message": message,
        "metadata": metadata,
        "code": code,
    });

    (code.into(), error.to_string())
}

fn display_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        value => value.to_string(),
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = env::current_dir()?;

    Utf8PathBuf::try_from(cwd)
        .map_err(FromPathBufError::into_io_error)
        .map_err(Into::into)
}

/// Load the configuration files, then apply the global CLI overrides.
fn load_config(globals: &Globals) -> Result<AppConfig> {
    let cwd = current_dir()?;
    trace!(cwd = cwd.as_str(), "Loading configuration.");

    let mut config = docent_config::load(globals.config.as_deref(), &cwd)?;
    apply_cli_configs(globals, &mut config);

    Ok(config)
}

fn apply_cli_configs(globals: &Globals, config: &mut AppConfig) {
    if let Some(model) = &globals.model {
        debug!(%model, "Overriding configured model.");
        config.assistant.model = model.to_string();
    }
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::fmt;

    let mut level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    if quiet {
        level = LevelFilter::OFF;
    }

    let mut filter = vec!["off".to_owned()];
    for krate in ["cli", "config", "conversation", "document", "llm"] {
        filter.push(format!("docent_{krate}={level}"));
    }

    let format = fmt::format().with_target(false).compact();

    if level < LevelFilter::DEBUG {
        tracing_subscriber::fmt()
            .event_format(format)
            .without_time()
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    } else {
        tracing_subscriber::fmt()
            .event_format(format)
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use docent_config::model::ProviderId;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_through_commands() {
        let dir = camino_tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from(["docent", "init", dir.path().as_str()]).unwrap();

        let config = docent_config::fs::load_files(&[]).unwrap();
        let mut ctx = Ctx::new(cli.globals, config, false);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let output = runtime.block_on(cli.command.run(&mut ctx)).unwrap();

        assert!(matches!(output, Success::Message(_)), "{output:?}");
        assert!(
            dir.path()
                .join(docent_config::fs::PROJECT_CONFIG_FILE)
                .exists()
        );
    }

    #[test]
    fn test_parse_globals() {
        let cli = Cli::try_parse_from([
            "docent",
            "-vv",
            "--model",
            "Gemini 1.5 Pro",
            "ask",
            "What",
            "grew?",
        ])
        .unwrap();

        assert_eq!(cli.command.name(), "ask");
        assert_eq!(cli.globals.verbose, 2);
        assert_eq!(
            cli.globals.model.map(|m| m.to_string()).as_deref(),
            Some("google/gemini-1.5-pro")
        );
    }

    #[test]
    fn test_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "docent",
            "chat",
            "--api-key",
            "secret",
            "--model",
            "openai/gpt-4o-mini",
            "--config",
            "other.toml",
        ])
        .unwrap();

        assert_eq!(cli.command.name(), "chat");
        assert_eq!(cli.globals.api_key.as_deref(), Some("secret"));
        assert_eq!(
            cli.globals.model.map(|m| m.provider),
            Some(ProviderId::Openai)
        );
        assert_eq!(cli.globals.config, Some(Utf8PathBuf::from("other.toml")));
    }

    #[test]
    fn test_invalid_model() {
        assert!(Cli::try_parse_from(["docent", "--model", "gpt-4o", "models"]).is_err());
        assert!(Cli::try_parse_from(["docent", "--model", "acme/x", "models"]).is_err());
    }

    #[test]
    fn test_display_hides_api_key() {
        let cli = Cli::try_parse_from(["docent", "--api-key", "secret", "models"]).unwrap();

        assert!(!cli.to_string().contains("secret"));
    }

    #[test]
    fn test_apply_cli_configs() {
        let mut config = docent_config::fs::load_files(&[]).unwrap();
        let globals = Globals {
            model: Some("openai/gpt-4o".parse().unwrap()),
            ..Default::default()
        };

        apply_cli_configs(&globals, &mut config);

        assert_eq!(config.assistant.model, "openai/gpt-4o");
    }

    #[test]
    fn test_render_error_json() {
        let error = cmd::Error::from(vec![
            ("message", "Missing API key".to_owned()),
            ("hint", "Set `GOOGLE_API_KEY`.".to_owned()),
        ]);

        let (code, output) = render_error(error, false);
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(code, 1);
        assert_eq!(
            value,
            serde_json::json!({
                "message": "Missing API key",
                "metadata": { "hint": "Set `GOOGLE_API_KEY`." },
                "code": 1,
            })
        );
    }
}
