use std::io::{self, Write as _};

use camino::{Utf8Path, Utf8PathBuf};
use crossterm::style::Stylize as _;
use docent_conversation::{Role, Session};
use docent_document::{Extractor, preview};
use docent_llm::{Provider, run_turn};
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{debug, info};

use super::{Output, Success, usage_line};
use crate::{Ctx, render_error, upload::upload};

const HELP: &str = "\
Commands:
  /upload PATH   use the text of a PDF as context for your questions
  /document      show the active document
  /history       show the conversation so far
  /help          show this message
  /quit          end the chat";

#[derive(Debug, clap::Args)]
pub(crate) struct Chat {
    /// PDF document to ask questions about.
    #[arg(short, long, value_name = "PATH")]
    document: Option<Utf8PathBuf>,
}

/// A line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Query(&'a str),
    Upload(&'a str),
    Document,
    History,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return if line.is_empty() {
                Self::Empty
            } else {
                Self::Query(line)
            };
        };

        let (name, argument) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(n, a)| (n, a.trim()));

        match name {
            "upload" | "u" if !argument.is_empty() => Self::Upload(argument),
            "document" | "doc" => Self::Document,
            "history" => Self::History,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => Self::Unknown(line),
        }
    }
}

impl Chat {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Output {
        let model = ctx.model_id()?;
        let provider = ctx.provider(&model)?;
        let extractor = ctx.extractor();
        let mut session = ctx.session();
        let mut out = io::stdout();

        info!(%model, "Starting chat.");
        writeln!(
            out,
            "Chatting with {}. Type {} for commands.\n",
            model.to_string().bold().blue(),
            "/help".bold()
        )?;

        if let Some(path) = &self.document {
            report_upload(ctx, &mut session, &extractor, path)?;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            write!(out, "{} ", "you>".bold().green())?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };

            match Input::parse(&line) {
                Input::Empty => {}
                Input::Quit => break,
                Input::Help => writeln!(out, "{HELP}")?,
                Input::Query(query) => {
                    ask(ctx, provider.as_ref(), &model.name, &mut session, query).await?;
                }
                Input::Upload(path) => {
                    report_upload(ctx, &mut session, &extractor, Utf8Path::new(path))?;
                }
                Input::Document => match session.document().get() {
                    Some(document) => writeln!(
                        out,
                        "{}\n",
                        preview(document, ctx.config().document.preview_len)
                            .into_owned()
                            .italic()
                    )?,
                    None => writeln!(out, "No document uploaded.")?,
                },
                Input::History => print_history(&session)?,
                Input::Unknown(command) => {
                    writeln!(out, "Unknown command {}.\n\n{HELP}", command.bold())?;
                }
            }
        }

        debug!(turns = session.transcript().len(), "Chat ended.");
        Ok(Success::Ok)
    }
}

/// Run a single turn, printing the reply as it streams in.
///
/// A failed turn is reported but does not end the chat.
async fn ask(
    ctx: &Ctx,
    provider: &dyn Provider,
    model: &docent_config::model::Name,
    session: &mut Session,
    query: &str,
) -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "{} ", "docent>".bold().blue())?;
    out.flush()?;

    let result = run_turn(
        provider,
        model,
        &ctx.config().parameters,
        session,
        query,
        ctx.turn_options(),
        |chunk| {
            let mut out = io::stdout().lock();
            if write!(out, "{chunk}").and_then(|()| out.flush()).is_err() {
                debug!("Failed to write chunk to stdout.");
            }
        },
    )
    .await;

    writeln!(out)?;
    match result {
        Ok(reply) => {
            if let Some(usage) = reply.usage {
                writeln!(out, "{}", usage_line(&usage).dark_grey())?;
            }
            writeln!(out)?;
        }
        Err(error) => {
            let (_, message) = render_error(error.into(), ctx.term.is_tty);
            writeln!(io::stderr(), "{message}\n")?;
        }
    }

    Ok(())
}

fn report_upload(
    ctx: &Ctx,
    session: &mut Session,
    extractor: &Extractor,
    path: &Utf8Path,
) -> io::Result<()> {
    let mut out = io::stdout();

    match upload(session, extractor, path) {
        Ok(chars) => {
            let document = session.document().get().unwrap_or_default();
            writeln!(
                out,
                "Loaded {} ({chars} characters).\n{}\n",
                path.as_str().bold(),
                preview(document, ctx.config().document.preview_len)
                    .into_owned()
                    .italic()
            )?;
        }
        Err(error) => {
            let (_, message) = render_error(error.into(), ctx.term.is_tty);
            writeln!(io::stderr(), "{message}")?;

            if session.document().get().is_some() {
                writeln!(io::stderr(), "The previous document is still active.")?;
            }
            writeln!(io::stderr())?;
        }
    }

    Ok(())
}

fn print_history(session: &Session) -> io::Result<()> {
    let mut out = io::stdout().lock();

    let mut empty = true;
    for turn in session.visible_history() {
        empty = false;
        let label = match turn.role {
            Role::User => "you>".bold().green(),
            Role::Assistant => "docent>".bold().blue(),
            Role::System => continue,
        };
        writeln!(out, "{label} {}\n", turn.content)?;
    }

    if empty {
        writeln!(out, "No messages yet.")?;
    }

    Ok(())
}
