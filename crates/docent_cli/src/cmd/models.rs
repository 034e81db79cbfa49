use comfy_table::{Cell, Row};
use crossterm::style::Stylize as _;
use docent_llm::catalog;

use super::Success;
use crate::Ctx;

#[derive(Debug, clap::Args)]
pub(crate) struct Models {
    /// Hide experimental and preview models.
    #[arg(long)]
    stable: bool,
}

impl Models {
    pub(crate) fn run(&self, ctx: &Ctx) -> Success {
        let active = ctx.config().assistant.model.as_str();

        let mut header = Row::new();
        header
            .add_cell(Cell::new("Model".bold().to_string()))
            .add_cell(Cell::new("ID".bold().to_string()))
            .add_cell(Cell::new(""));

        let rows = catalog::models()
            .iter()
            .filter(|m| !self.stable || !m.preview)
            .map(|m| {
                let mut notes = vec![];
                if m.id == active {
                    notes.push("active");
                }
                if m.preview {
                    notes.push("preview");
                }

                let name = if m.id == active {
                    m.display_name.bold().to_string()
                } else {
                    m.display_name.to_owned()
                };

                let mut row = Row::new();
                row.add_cell(Cell::new(name))
                    .add_cell(Cell::new(m.id))
                    .add_cell(Cell::new(notes.join(", ")));
                row
            })
            .collect();

        Success::Table { header, rows }
    }
}
