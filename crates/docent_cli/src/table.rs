use comfy_table::{Cell, Row, Table};
use serde_json::{Map, Value};

const EMPTY: &str = "                   ";
const UTF8_FULL: &str = "││──├──┤     ──╭╮╰╯";

pub(crate) fn list(header: Row, rows: Vec<Row>) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    table.add_rows(rows);

    table.trim_fmt()
}

/// One object per row, keyed by the header cells.
pub(crate) fn list_json(header: &Row, rows: Vec<Row>) -> Value {
    let keys: Vec<String> = header.cell_iter().map(Cell::content).collect();

    rows.into_iter()
        .map(|row| {
            keys.iter()
                .cloned()
                .zip(row.cell_iter().map(|c| Value::String(c.content())))
                .collect::<Map<_, _>>()
        })
        .map(Value::Object)
        .collect()
}

pub(crate) fn details(title: Option<&str>, rows: Vec<Row>) -> String {
    let mut buf = String::new();

    if let Some(title) = title {
        buf.push_str(title);
        buf.push_str("\n\n");
    }

    let mut table = Table::new();
    table.load_preset(EMPTY);
    table.add_rows(rows);
    buf.push_str(&table.trim_fmt());

    buf
}

/// Rows are read as `key, value` pairs.
pub(crate) fn details_json(title: Option<&str>, rows: Vec<Row>) -> Value {
    let mut details = Map::new();
    for row in rows {
        let mut iter = row.cell_iter();
        let Some(key) = iter.next().map(Cell::content) else {
            continue;
        };

        let value = iter.next().map(Cell::content).unwrap_or_default();

        details.insert(key, value.into());
    }

    serde_json::json!({
        "title": title,
        "details": details,
    })
}
