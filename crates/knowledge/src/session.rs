//! In-memory conversation history, bounded per session.

use lectern_llm::Role;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Turn {
    role: Role,
    text: String,
}

type History = Arc<Mutex<VecDeque<Turn>>>;

/// Per-session conversation buffer.
///
/// Each session keeps at most `max_history` exchanges (two turns each);
/// older turns are evicted first. Sessions live until the buffer is dropped.
/// Different sessions lock different entries.
pub struct ConversationBuffer {
    max_history: usize,
    sessions: RwLock<HashMap<String, History>>,
}

impl ConversationBuffer {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new, empty session and return its id.
    pub fn create_session(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.history(&id);
        tracing::debug!(session = %id, "Created session");
        id
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(session_id)
    }

    /// Append one turn, creating the session on first use.
    pub fn append(&self, session_id: &str, role: Role, text: impl Into<String>) {
        let history = self.history(session_id);
        let mut turns = lock(&history);
        turns.push_back(Turn {
            role,
            text: text.into(),
        });

        let capacity = self.max_history * 2;
        while turns.len() > capacity {
            turns.pop_front();
        }
    }

    pub fn add_exchange(&self, session_id: &str, user: &str, assistant: &str) {
        self.append(session_id, Role::User, user);
        self.append(session_id, Role::Assistant, assistant);
    }

    /// `User: ...` / `Assistant: ...` lines, or `None` for an unknown or empty session.
    pub fn render(&self, session_id: &str) -> Option<String> {
        let history = {
            let sessions = self
                .sessions
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            sessions.get(session_id).cloned()?
        };

        let turns = lock(&history);
        if turns.is_empty() {
            return None;
        }

        let lines: Vec<String> = turns
            .iter()
            .map(|turn| {
                let speaker = match turn.role {
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                };
                format!("{}: {}", speaker, turn.text)
            })
            .collect();
        Some(lines.join("\n"))
    }

    pub fn clear_session(&self, session_id: &str) {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(session_id);
    }

    fn history(&self, session_id: &str) -> History {
        if let Some(history) = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session_id)
        {
            return history.clone();
        }

        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }
}

fn lock(history: &History) -> MutexGuard<'_, VecDeque<Turn>> {
    history
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_session_is_empty_and_unique() {
        let buffer = ConversationBuffer::new(2);
        let a = buffer.create_session();
        let b = buffer.create_session();

        assert_ne!(a, b);
        assert!(buffer.has_session(&a));
        assert_eq!(buffer.render(&a), None);
    }

    #[test]
    fn test_render_format() {
        let buffer = ConversationBuffer::new(2);
        let id = buffer.create_session();
        buffer.add_exchange(&id, "What is MCP?", "A protocol.");

        assert_eq!(
            buffer.render(&id).as_deref(),
            Some("User: What is MCP?\nAssistant: A protocol.")
        );
    }

    #[test]
    fn test_fifo_eviction_keeps_last_exchanges() {
        let buffer = ConversationBuffer::new(2);
        let id = buffer.create_session();
        for i in 1..=3 {
            buffer.add_exchange(&id, &format!("q{}", i), &format!("a{}", i));
        }

        assert_eq!(
            buffer.render(&id).as_deref(),
            Some("User: q2\nAssistant: a2\nUser: q3\nAssistant: a3")
        );
    }

    #[test]
    fn test_eviction_counts_turns() {
        let buffer = ConversationBuffer::new(1);
        buffer.append("s", Role::User, "one");
        buffer.append("s", Role::Assistant, "two");
        buffer.append("s", Role::User, "three");

        assert_eq!(
            buffer.render("s").as_deref(),
            Some("Assistant: two\nUser: three")
        );
    }

    #[test]
    fn test_unknown_session_created_on_append() {
        let buffer = ConversationBuffer::new(2);
        assert!(!buffer.has_session("external-id"));
        assert_eq!(buffer.render("external-id"), None);

        buffer.add_exchange("external-id", "hi", "hello");
        assert!(buffer.has_session("external-id"));

        buffer.clear_session("external-id");
        assert!(!buffer.has_session("external-id"));
    }

    #[test]
    fn test_zero_history_keeps_nothing() {
        let buffer = ConversationBuffer::new(0);
        buffer.add_exchange("s", "hi", "hello");
        assert_eq!(buffer.render("s"), None);
    }

    #[test]
    fn test_sessions_are_isolated_across_threads() {
        let buffer = Arc::new(ConversationBuffer::new(5));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let buffer = buffer.clone();
                std::thread::spawn(move || {
                    let id = format!("session-{}", i);
                    for n in 0..3 {
                        buffer.add_exchange(&id, &format!("q{}", n), &format!("a{}", n));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..4 {
            let rendered = buffer.render(&format!("session-{}", i)).unwrap();
            assert_eq!(rendered.lines().count(), 6);
        }
    }
}
