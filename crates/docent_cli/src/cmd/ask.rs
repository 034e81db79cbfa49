use std::io::{self, Write as _};

use camino::Utf8PathBuf;
use crossterm::style::Stylize as _;
use docent_llm::{FinishReason, run_turn};
use serde_json::json;
use tracing::debug;

use super::{Output, Success, usage_line};
use crate::{Ctx, upload::upload};

#[derive(Debug, clap::Args)]
pub(crate) struct Ask {
    /// The question to ask.
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// PDF document to ask the question about.
    #[arg(short, long, value_name = "PATH")]
    document: Option<Utf8PathBuf>,
}

impl Ask {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Output {
        let model = ctx.model_id()?;
        let provider = ctx.provider(&model)?;
        let mut session = ctx.session();

        if let Some(path) = &self.document {
            let chars = upload(&mut session, &ctx.extractor(), path)?;
            debug!(path = path.as_str(), chars, "Using document as context.");
        }

        // Pipes get a single JSON object instead of a stream.
        let stream = ctx.term.is_tty;
        let reply = run_turn(
            provider.as_ref(),
            &model.name,
            &ctx.config().parameters,
            &mut session,
            self.query.join(" "),
            ctx.turn_options(),
            |chunk| {
                if !stream {
                    return;
                }

                let mut out = io::stdout().lock();
                if write!(out, "{chunk}").and_then(|()| out.flush()).is_err() {
                    debug!("Failed to write chunk to stdout.");
                }
            },
        )
        .await?;

        if !stream {
            return Ok(json!({
                "model": model.to_string(),
                "reply": reply.content,
                "finish_reason": reply.finish_reason.as_ref().map(finish_reason),
                "usage": reply.usage.map(|u| json!({
                    "input_tokens": u.input_tokens,
                    "output_tokens": u.output_tokens,
                    "total_tokens": u.total_tokens,
                })),
            })
            .into());
        }

        let mut out = io::stdout().lock();
        writeln!(out)?;
        if reply.finish_reason == Some(FinishReason::MaxTokens) {
            writeln!(out, "{}", "(reply cut off at the token limit)".dark_grey())?;
        }
        if let Some(usage) = reply.usage {
            writeln!(out, "{}", usage_line(&usage).dark_grey())?;
        }

        Ok(Success::Ok)
    }
}

fn finish_reason(reason: &FinishReason) -> &str {
    match reason {
        FinishReason::Completed => "completed",
        FinishReason::MaxTokens => "max_tokens",
        FinishReason::Other(reason) => reason,
    }
}
