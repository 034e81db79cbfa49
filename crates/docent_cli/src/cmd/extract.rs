use std::fs;

use camino::Utf8PathBuf;
use comfy_table::{Cell, CellAlignment, Row};
use docent_document::preview;

use super::{Output, Success};
use crate::Ctx;

#[derive(Debug, clap::Args)]
pub(crate) struct Extract {
    /// Path to the PDF document.
    path: Utf8PathBuf,

    /// Print the full text instead of a preview.
    #[arg(long)]
    full: bool,
}

impl Extract {
    pub(crate) fn run(&self, ctx: &Ctx) -> Output {
        let bytes = fs::read(&self.path)?;
        let text = ctx.extractor().extract(&bytes)?;

        if self.full {
            return Ok(text.into());
        }

        let preview_len = ctx.config().document.preview_len;
        let rows = vec![
            ("path", self.path.to_string()),
            ("characters", text.chars().count().to_string()),
            ("preview", preview(&text, preview_len).into_owned()),
        ]
        .into_iter()
        .map(|(key, value)| {
            let mut row = Row::new();
            row.add_cell(Cell::new(key).set_alignment(CellAlignment::Right))
                .add_cell(Cell::new(value));
            row
        })
        .collect();

        Ok(Success::Details {
            title: Some("Extracted text".to_owned()),
            rows,
        })
    }
}
