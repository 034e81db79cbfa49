use schematic::Config;

/// Document extraction configuration.
#[derive(Debug, Clone, Config)]
#[config(rename_all = "snake_case")]
pub struct DocumentConfig {
    /// Documents yielding fewer characters than this are treated as having
    /// no text layer.
    #[setting(default = 5)]
    pub min_text_len: usize,

    /// Number of characters shown after a document is loaded.
    #[setting(default = 200)]
    pub preview_len: usize,
}
