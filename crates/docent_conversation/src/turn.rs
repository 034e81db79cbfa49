use std::fmt;

use serde::{Deserialize, Serialize};

/// The author of a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The ordered, append-only sequence of turns in a session.
///
/// The first turn is always the system turn, and it is the only one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript(Vec<Turn>);

impl Transcript {
    pub(crate) fn new(system: impl Into<String>) -> Self {
        Self(vec![Turn::system(system)])
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        debug_assert_ne!(turn.role, Role::System);
        self.0.push(turn);
    }

    pub(crate) fn to_vec(&self) -> Vec<Turn> {
        self.0.clone()
    }

    /// The system turn.
    #[must_use]
    pub fn system(&self) -> &Turn {
        &self.0[0]
    }

    #[must_use]
    pub fn first(&self) -> Option<&Turn> {
        self.0.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`, the system turn is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Turn] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
