// assistant.rs: Diet chat workflow.
//
// Each question is sent with a digest of the last `window_days` of complete
// meals and the user's preferences. Likes and dislikes the provider reports
// back are merged into the preferences store.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use nt_goals::{LearnedPreferences, PreferencesStore};
use nt_meals::{format_history, NO_MEAL_HISTORY};

use crate::error::AssistError;
use crate::logger::{lock_store, SharedStore};
use crate::provider::DietChat;

pub type SharedPreferences = Arc<Mutex<PreferencesStore>>;

pub fn shared_preferences(store: PreferencesStore) -> SharedPreferences {
    Arc::new(Mutex::new(store))
}

/// Days of history sent with each question unless configured otherwise.
pub const DEFAULT_HISTORY_WINDOW_DAYS: u32 = 7;

/// Shown instead of calling the provider when no goals or restrictions are set.
pub const WELCOME_MESSAGE: &str = "Welcome! To give you the best advice, I need to know a bit \
about you. Set your stats, goals, and dietary preferences with `nutritrack profile set`.";

const INSIGHTS_PROMPT: &str = "Hello! Based on my recent meals and my preferences, can you give \
me some quick insights and suggest what I could eat next to meet my goals?";

const FIRST_MEAL_PROMPT: &str = "Hello! I haven't logged any meals yet. Based on my preferences, \
could you give me some suggestions for a healthy breakfast to start my day?";

/// Result of one chat exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub reply: String,
    pub learned: Option<LearnedPreferences>,
    /// Whether the learned entries added anything new to the preferences.
    pub preferences_updated: bool,
}

pub struct DietAssistant {
    store: SharedStore,
    preferences: SharedPreferences,
    chat: Arc<dyn DietChat>,
    window_days: u32,
}

impl DietAssistant {
    pub fn new(store: SharedStore, preferences: SharedPreferences, chat: Arc<dyn DietChat>) -> Self {
        Self {
            store,
            preferences,
            chat,
            window_days: DEFAULT_HISTORY_WINDOW_DAYS,
        }
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// The digest that would accompany a question right now.
    pub fn history(&self) -> Result<String, AssistError> {
        let store = lock_store(&self.store)?;
        Ok(format_history(store.records(), self.window_days, Utc::now()))
    }

    /// Ask the chat provider a question.
    pub async fn ask(&self, message: &str) -> Result<AssistantReply, AssistError> {
        let history = self.history()?;
        let preferences = self.lock_preferences()?.get().clone();

        let reply = self.chat.chat(message, &history, &preferences).await?;

        let mut preferences_updated = false;
        if let Some(learned) = reply.learned_preferences.as_ref().filter(|l| !l.is_empty()) {
            let mut store = self.lock_preferences()?;
            preferences_updated = match store.merge_learned(learned) {
                Ok(changed) => changed,
                Err(e) => {
                    // The merge stands in memory even though the write failed.
                    tracing::warn!(error = %e, "learned preferences not persisted");
                    true
                }
            };
        }

        Ok(AssistantReply {
            reply: reply.reply,
            learned: reply.learned_preferences,
            preferences_updated,
        })
    }

    /// Opening message for a new conversation.
    ///
    /// Without goals or restrictions the user gets the welcome text and no
    /// provider call is made. Otherwise the provider is asked for insights,
    /// or for a first-meal suggestion when nothing was logged recently.
    pub async fn greet(&self) -> Result<String, AssistError> {
        let has_preferences = {
            let store = self.lock_preferences()?;
            let prefs = store.get();
            !prefs.dietary_restrictions.is_empty() || !prefs.health_goals.is_empty()
        };
        if !has_preferences {
            return Ok(WELCOME_MESSAGE.to_string());
        }

        let prompt = if self.history()? == NO_MEAL_HISTORY {
            FIRST_MEAL_PROMPT
        } else {
            INSIGHTS_PROMPT
        };
        Ok(self.ask(prompt).await?.reply)
    }

    fn lock_preferences(&self) -> Result<MutexGuard<'_, PreferencesStore>, AssistError> {
        self.preferences
            .lock()
            .map_err(|_| AssistError::LockPoisoned("preferences"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::shared_store;
    use crate::provider::ChatReply;
    use async_trait::async_trait;
    use nt_goals::{HealthGoal, UserPreferences};
    use nt_meals::{NutrientPayload, RecordStore};
    use nt_storage::MemorySlots;

    /// Records what it was sent and answers with a canned reply.
    struct Scripted {
        reply: ChatReply,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Scripted {
        fn new(reply: ChatReply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl DietChat for Scripted {
        async fn chat(
            &self,
            message: &str,
            history: &str,
            _preferences: &UserPreferences,
        ) -> Result<ChatReply, AssistError> {
            self.seen
                .lock()
                .unwrap()
                .push((message.to_string(), history.to_string()));
            Ok(self.reply.clone())
        }
    }

    fn assistant(chat: Arc<Scripted>) -> (DietAssistant, SharedStore, SharedPreferences) {
        let store = shared_store(RecordStore::in_memory());
        let prefs = shared_preferences(PreferencesStore::open(Box::new(MemorySlots::new())));
        let assistant = DietAssistant::new(Arc::clone(&store), Arc::clone(&prefs), chat);
        (assistant, store, prefs)
    }

    #[tokio::test]
    async fn ask_sends_digest_of_complete_meals() {
        let chat = Scripted::new(ChatReply::text("Eat more greens."));
        let (assistant, store, _) = assistant(Arc::clone(&chat));
        {
            let mut store = store.lock().unwrap();
            let done = store.create("lentil soup").unwrap();
            store.resolve(done.id, NutrientPayload::macros(350.0, 18.0, 50.0, 6.0)).unwrap();
            store.create("still pending").unwrap();
        }

        let reply = assistant.ask("What should I eat?").await.unwrap();
        assert_eq!(reply.reply, "Eat more greens.");
        assert!(!reply.preferences_updated);

        let seen = chat.seen.lock().unwrap();
        assert_eq!(seen[0].0, "What should I eat?");
        assert!(seen[0].1.contains("lentil soup"));
        assert!(!seen[0].1.contains("still pending"));
    }

    #[tokio::test]
    async fn learned_preferences_are_merged() {
        let chat = Scripted::new(ChatReply {
            reply: "Noted!".into(),
            learned_preferences: Some(LearnedPreferences {
                likes: vec!["salmon".into()],
                dislikes: vec!["okra".into()],
            }),
        });
        let (assistant, _, prefs) = assistant(chat);

        let reply = assistant.ask("I love salmon but hate okra").await.unwrap();
        assert!(reply.preferences_updated);
        {
            let prefs = prefs.lock().unwrap();
            assert_eq!(prefs.get().likes, vec!["salmon"]);
            assert_eq!(prefs.get().dislikes, vec!["okra"]);
        }

        let again = assistant.ask("Still love salmon").await.unwrap();
        assert!(!again.preferences_updated);
    }

    #[tokio::test]
    async fn greet_without_preferences_skips_provider() {
        let chat = Scripted::new(ChatReply::text("unused"));
        let (assistant, _, _) = assistant(Arc::clone(&chat));

        assert_eq!(assistant.greet().await.unwrap(), WELCOME_MESSAGE);
        assert!(chat.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn greet_picks_prompt_from_history() {
        let chat = Scripted::new(ChatReply::text("Try eggs."));
        let (assistant, store, prefs) = assistant(Arc::clone(&chat));
        {
            let mut prefs = prefs.lock().unwrap();
            let mut updated = prefs.get().clone();
            updated.health_goals.insert(HealthGoal::EatHealthier);
            prefs.save(updated).unwrap();
        }

        assert_eq!(assistant.greet().await.unwrap(), "Try eggs.");
        {
            let mut store = store.lock().unwrap();
            let meal = store.create("toast").unwrap();
            store.resolve(meal.id, NutrientPayload::macros(200.0, 6.0, 30.0, 4.0)).unwrap();
        }
        assistant.greet().await.unwrap();

        let seen = chat.seen.lock().unwrap();
        assert_eq!(seen[0].0, FIRST_MEAL_PROMPT);
        assert_eq!(seen[0].1, NO_MEAL_HISTORY);
        assert_eq!(seen[1].0, INSIGHTS_PROMPT);
    }
}
