//! Persona scoping for extraction rules.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of the active chat, as seen by the host application.
///
/// Any field may be missing; the persona key is derived from whichever
/// identifiers are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    pub character_id: Option<String>,
    pub persona_id: Option<String>,
    pub avatar_id: Option<String>,
    pub chat_id: Option<String>,
}

/// Stable key under which per-persona extraction rules are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaKey(String);

impl PersonaKey {
    const GLOBAL: &'static str = "global";

    /// The fallback scope when no character or chat is known.
    #[must_use]
    pub fn global() -> Self {
        Self(Self::GLOBAL.to_string())
    }

    /// Derive the key from a chat context.
    ///
    /// Character, persona and avatar ids take precedence (`persona:<id>`),
    /// then the chat id (`chat:<id>`), then `global`.
    #[must_use]
    pub fn from_context(ctx: &ChatContext) -> Self {
        let persona = [&ctx.character_id, &ctx.persona_id, &ctx.avatar_id]
            .into_iter()
            .find_map(|id| non_blank(id.as_deref()));
        if let Some(id) = persona {
            return Self(format!("persona:{id}"));
        }

        if let Some(id) = non_blank(ctx.chat_id.as_deref()) {
            return Self(format!("chat:{id}"));
        }

        Self::global()
    }

    /// Use an explicit key as-is (e.g. from the command line).
    ///
    /// Blank input maps to the global scope.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        non_blank(Some(raw)).map_or_else(Self::global, |key| Self(key.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PersonaKey {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Display for PersonaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
