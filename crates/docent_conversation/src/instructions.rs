/// The tutor persona used when none is configured.
pub const DEFAULT_PERSONA: &str = "\
Your name is Docent.
Your knowledge is characterized by extreme clarity, conciseness, and elegantly jargon free.
Your primary objective is to ensure the user deeply understands the presented topics and concepts.
Prioritize a narrative or sequential explanation that logically flows, especially when addressing multiple related questions.
Feel free to adjust the response order for optimal clarity and understanding.
Teach the user through clear and concise explanations.";

/// The content of the system turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instructions {
    pub rules: Vec<String>,
    pub persona: Option<String>,
}

impl Instructions {
    #[must_use]
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.rules.extend(rules.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    /// Render the system instructions.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("Important Rules:\n");
        for rule in &self.rules {
            out.push_str("- ");
            out.push_str(rule.trim());
            out.push('\n');
        }

        out.push_str("\nPersonality:\n");
        out.push_str(
            self.persona
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_PERSONA),
        );

        out
    }
}
