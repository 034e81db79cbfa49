use docent_config::model::{ModelId, ModelIdError};
use docent_llm::catalog;

/// Parse a model given as a catalog name, or as `provider/name`.
pub(crate) fn model_id(s: &str) -> Result<ModelId, ModelIdError> {
    match catalog::find(s) {
        Some(model) => model.model_id(),
        None => s.parse(),
    }
}
