use docent_config::{AppConfig, model::ModelId};
use docent_conversation::{Instructions, Session};
use docent_document::Extractor;
use docent_llm::{Provider, TurnOptions, provider::get_provider};

use crate::{Globals, Result};

/// Context for the CLI application
pub(crate) struct Ctx {
    /// Merged file/CLI configuration.
    config: AppConfig,

    pub(crate) term: Term,
}

pub(crate) struct Term {
    /// Global CLI arguments.
    pub(crate) args: Globals,

    /// Whether or not stdout is connected to a TTY.
    ///
    /// If you pipe (|) or redirect (>) the output, stdout is connected to a
    /// pipe or a regular file, respectively. These are not managed by the TTY
    /// subsystem.
    pub(crate) is_tty: bool,
}

impl Ctx {
    pub(crate) fn new(args: Globals, config: AppConfig, is_tty: bool) -> Self {
        Self {
            config,
            term: Term { args, is_tty },
        }
    }

    /// Get immutable access to the configuration.
    ///
    /// CLI overrides are applied before the context is constructed.
    pub(crate) fn config(&self) -> &AppConfig {
        &self.config
    }

    pub(crate) fn model_id(&self) -> Result<ModelId> {
        self.config.assistant.model_id().map_err(Into::into)
    }

    /// Build the provider serving `model`.
    ///
    /// Fails early when no API key is available.
    pub(crate) fn provider(&self, model: &ModelId) -> Result<Box<dyn Provider>> {
        get_provider(
            model.provider,
            &self.config.providers,
            self.term.args.api_key.clone(),
        )
        .map_err(Into::into)
    }

    pub(crate) fn extractor(&self) -> Extractor {
        Extractor::new(self.config.document.min_text_len)
    }

    /// Start a new session with the configured instructions.
    pub(crate) fn session(&self) -> Session {
        let assistant = &self.config.assistant;

        let mut instructions = Instructions::default().with_rules(assistant.rules.iter().cloned());
        if let Some(persona) = &assistant.persona {
            instructions = instructions.with_persona(persona.as_str());
        }

        Session::initialize(&instructions).with_min_text_len(self.config.document.min_text_len)
    }

    pub(crate) fn turn_options(&self) -> TurnOptions {
        TurnOptions {
            idle_timeout: self.config.assistant.stream_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use docent_config::fs::load_files;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;

    const UNSET: &str = "DOCENT_TEST_KEY_THAT_IS_NOT_SET";

    fn ctx(api_key: Option<&str>) -> Ctx {
        let mut config = load_files(&[]).unwrap();
        config.providers.google.api_key_env = UNSET.to_owned();
        config.providers.openai.api_key_env = UNSET.to_owned();

        let args = Globals {
            api_key: api_key.map(ToOwned::to_owned),
            ..Default::default()
        };

        Ctx::new(args, config, false)
    }

    #[test]
    fn test_provider_missing_credential() {
        let ctx = ctx(None);
        let model = ctx.model_id().unwrap();

        let error = ctx.provider(&model).unwrap_err();
        assert_matches!(
            &error,
            Error::Llm(docent_llm::Error::MissingCredential { env, .. }) if env == UNSET
        );

        let error = crate::cmd::Error::from(error);
        assert!(
            error
                .metadata("hint")
                .and_then(|v| v.as_str())
                .is_some_and(|hint| hint.contains(UNSET))
        );
    }

    #[test]
    fn test_provider_with_api_key() {
        let ctx = ctx(Some("secret"));
        let model = ctx.model_id().unwrap();

        assert!(ctx.provider(&model).is_ok());
    }

    #[test]
    fn test_session_uses_configured_instructions() {
        let mut ctx = ctx(None);
        ctx.config.assistant.persona = Some("You are a patient physics tutor.".to_owned());
        ctx.config.assistant.rules = vec!["Answer in English.".to_owned()];

        let session = ctx.session();
        let system = &session.transcript().system().content;

        assert!(system.contains("- Answer in English.\n"));
        assert!(system.ends_with("You are a patient physics tutor."));
    }

    #[test]
    fn test_turn_options() {
        let mut ctx = ctx(None);
        assert_eq!(ctx.turn_options().idle_timeout, Some(Duration::from_secs(60)));

        ctx.config.assistant.stream_timeout_secs = 0;
        assert_eq!(ctx.turn_options().idle_timeout, None);
    }
}
