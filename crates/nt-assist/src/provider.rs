// provider.rs: Seams for the external analysis and chat services.
//
// Both providers are remote and slow. Implementations own transport,
// prompts and credentials; the core only sees these two calls.

use async_trait::async_trait;
use nt_goals::{LearnedPreferences, UserPreferences};
use nt_meals::NutrientPayload;
use serde::{Deserialize, Serialize};

use crate::error::AssistError;

/// Estimates nutrients from a free-text meal description.
#[async_trait]
pub trait MealAnalyzer: Send + Sync {
    async fn analyze(&self, description: &str) -> Result<NutrientPayload, AssistError>;
}

/// A diet chat answer, optionally carrying likes/dislikes it picked up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_preferences: Option<LearnedPreferences>,
}

impl ChatReply {
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            learned_preferences: None,
        }
    }
}

/// Conversational diet advice.
///
/// `history` is the digest produced by `nt_meals::format_history`.
#[async_trait]
pub trait DietChat: Send + Sync {
    async fn chat(
        &self,
        message: &str,
        history: &str,
        preferences: &UserPreferences,
    ) -> Result<ChatReply, AssistError>;
}
