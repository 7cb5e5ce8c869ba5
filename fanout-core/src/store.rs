//! Per-provider conversation histories with a sliding retention window.

use llm::{ChatMessage, ProviderKind};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// Turns kept per provider unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = config::settings::DEFAULT_HISTORY_LIMIT;

/// Independent ordered histories, one per provider. Appending past the limit
/// evicts the oldest turns.
#[derive(Debug)]
pub struct ConversationStore {
    limit: usize,
    histories: Mutex<HashMap<ProviderKind, VecDeque<ChatMessage>>>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl ConversationStore {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            histories: Mutex::new(HashMap::new()),
        }
    }

    pub fn append(&self, provider: ProviderKind, turn: ChatMessage) {
        let mut histories = self.histories.lock();
        let history = histories.entry(provider).or_default();
        history.push_back(turn);
        while history.len() > self.limit {
            history.pop_front();
        }
    }

    /// Snapshot of the provider's turns, oldest first.
    pub fn history(&self, provider: ProviderKind) -> Vec<ChatMessage> {
        self.histories
            .lock()
            .get(&provider)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, provider: ProviderKind) -> usize {
        self.histories.lock().get(&provider).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, provider: ProviderKind) -> bool {
        self.len(provider) == 0
    }

    pub fn clear(&self, provider: ProviderKind) {
        self.histories.lock().remove(&provider);
    }

    pub fn clear_all(&self) {
        self.histories.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::Role;
    use proptest::prelude::*;

    fn turn(i: usize) -> ChatMessage {
        ChatMessage::user(format!("turn {}", i).into())
    }

    fn provider_strategy() -> impl Strategy<Value = ProviderKind> {
        prop::sample::select(ProviderKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn window_keeps_most_recent_turns(provider in provider_strategy(), n in 0usize..60) {
            let store = ConversationStore::default();
            for i in 0..n {
                store.append(provider, turn(i));
            }

            let history = store.history(provider);
            let kept = n.min(DEFAULT_HISTORY_LIMIT);
            prop_assert_eq!(history.len(), kept);
            let expected: Vec<_> = (n - kept..n).map(turn).collect();
            prop_assert_eq!(history, expected);
        }

        #[test]
        fn clear_empties_history(provider in provider_strategy(), n in 0usize..30) {
            let store = ConversationStore::default();
            for i in 0..n {
                store.append(provider, turn(i));
            }
            store.clear(provider);
            prop_assert!(store.history(provider).is_empty());
        }
    }

    #[test]
    fn test_histories_are_independent() {
        let store = ConversationStore::default();
        store.append(ProviderKind::OpenAI, turn(1));
        store.append(ProviderKind::Gemini, turn(1));
        store.append(ProviderKind::Gemini, ChatMessage::assistant("hi".into()));

        assert_eq!(store.len(ProviderKind::OpenAI), 1);
        assert_eq!(store.len(ProviderKind::Gemini), 2);
        assert!(store.is_empty(ProviderKind::Claude));

        store.clear(ProviderKind::Gemini);
        assert_eq!(store.len(ProviderKind::OpenAI), 1);
        assert!(store.is_empty(ProviderKind::Gemini));

        store.clear_all();
        assert!(ProviderKind::ALL.iter().all(|p| store.is_empty(*p)));
    }

    #[test]
    fn test_custom_limit() {
        let store = ConversationStore::new(3);
        for i in 0..5 {
            store.append(ProviderKind::Claude, turn(i));
        }
        let history = store.history(ProviderKind::Claude);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].get_text(), "turn 2");
        assert_eq!(history[2].role, Role::User);
    }
}
