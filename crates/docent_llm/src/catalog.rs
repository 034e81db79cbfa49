//! The models offered for selection.

use docent_config::model::{ModelId, ModelIdError};

/// A selectable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    pub display_name: &'static str,

    /// The model, as `provider/name`.
    pub id: &'static str,

    /// Experimental or preview release.
    pub preview: bool,
}

impl ModelOption {
    pub fn model_id(&self) -> Result<ModelId, ModelIdError> {
        self.id.parse()
    }
}

const MODELS: &[ModelOption] = &[
    ModelOption {
        display_name: "Gemini 1.5 Flash 8b",
        id: "google/gemini-1.5-flash-8b",
        preview: false,
    },
    ModelOption {
        display_name: "Gemini 1.5 Flash",
        id: "google/gemini-1.5-flash-001",
        preview: false,
    },
    ModelOption {
        display_name: "Gemini 1.5 Pro",
        id: "google/gemini-1.5-pro",
        preview: false,
    },
    ModelOption {
        display_name: "Gemini 2.0 Flash Lite",
        id: "google/gemini-2.0-flash-lite-preview-02-05",
        preview: true,
    },
    ModelOption {
        display_name: "Gemini 2.0 Flash",
        id: "google/gemini-2.0-flash-001",
        preview: false,
    },
    ModelOption {
        display_name: "Gemini 2.0 Pro",
        id: "google/gemini-2.0-pro-exp-02-05",
        preview: true,
    },
];

#[must_use]
pub fn models() -> &'static [ModelOption] {
    MODELS
}

/// Find a model by display name (case-insensitive) or by id.
#[must_use]
pub fn find(query: &str) -> Option<&'static ModelOption> {
    let query = query.trim();

    MODELS
        .iter()
        .find(|m| m.id == query || m.display_name.eq_ignore_ascii_case(query))
}

#[cfg(test)]
mod tests {
    use docent_config::model::ProviderId;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_all_models_parse() {
        for model in models() {
            let id = model.model_id().unwrap();
            assert_eq!(id.provider, ProviderId::Google, "{}", model.id);
            assert_eq!(id.to_string(), model.id);
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(
            find("gemini 1.5 pro").map(|m| m.id),
            Some("google/gemini-1.5-pro")
        );
        assert_eq!(
            find("google/gemini-2.0-flash-001").map(|m| m.display_name),
            Some("Gemini 2.0 Flash")
        );
        assert_eq!(find("gpt-4o"), None);
    }

    #[test]
    fn test_default_model_is_listed() {
        assert!(find(docent_config::assistant::DEFAULT_MODEL).is_some());
    }
}
