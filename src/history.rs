use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use crate::models::ConversationTurn;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Per-session conversation memory owned by the running service.
///
/// A session's buffer is created on its first recorded turn and removed only
/// by [`ConversationHistory::clear`]; nothing expires on its own, so the map
/// grows with the number of distinct session ids seen by the process.
/// Each buffer keeps the most recent `capacity` turns in insertion order.
#[derive(Clone, Debug)]
pub struct ConversationHistory {
    capacity: usize,
    sessions: Arc<Mutex<HashMap<String, VecDeque<ConversationTurn>>>>,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ConversationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&self, session_id: &str, user: &str, bot: &str) -> usize {
        let turn = ConversationTurn {
            user: user.to_string(),
            bot: bot.to_string(),
            timestamp: Utc::now(),
        };

        let mut sessions = self.lock();
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push_back(turn);
        while turns.len() > self.capacity {
            turns.pop_front();
        }
        turns.len()
    }

    pub fn recent(&self, session_id: &str, n: usize) -> Vec<ConversationTurn> {
        let sessions = self.lock();
        match sessions.get(session_id) {
            Some(turns) => {
                let skip = turns.len().saturating_sub(n);
                turns.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    pub fn len(&self, session_id: &str) -> usize {
        self.lock().get(session_id).map_or(0, VecDeque::len)
    }

    pub fn clear(&self, session_id: &str) -> bool {
        self.lock().remove(session_id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock cannot leave a buffer half-trimmed, so
    // the data is still usable after poisoning.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, VecDeque<ConversationTurn>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eleventh_append_evicts_the_first() {
        let history = ConversationHistory::default();
        for n in 1..=11 {
            history.record("s1", &format!("q{n}"), &format!("a{n}"));
        }

        let turns = history.recent("s1", usize::MAX);
        assert_eq!(turns.len(), 10);
        let users: Vec<&str> = turns.iter().map(|t| t.user.as_str()).collect();
        let expected: Vec<String> = (2..=11).map(|n| format!("q{n}")).collect();
        assert_eq!(users, expected);
    }

    #[test]
    fn never_exceeds_capacity() {
        let history = ConversationHistory::new(3);
        for n in 0..50 {
            let len = history.record("s", "u", "b");
            assert!(len <= 3, "append {n} grew to {len}");
        }
        assert_eq!(history.len("s"), 3);
    }

    #[test]
    fn recent_returns_tail_oldest_first() {
        let history = ConversationHistory::default();
        for n in 1..=5 {
            history.record("s", &format!("q{n}"), "b");
        }
        let tail: Vec<String> = history.recent("s", 3).into_iter().map(|t| t.user).collect();
        assert_eq!(tail, vec!["q3", "q4", "q5"]);
        assert!(history.recent("unknown", 3).is_empty());
    }

    #[test]
    fn clear_drops_only_that_session() {
        let history = ConversationHistory::default();
        history.record("a", "u", "b");
        history.record("b", "u", "b");

        assert!(history.clear("a"));
        assert!(!history.clear("a"));
        assert_eq!(history.len("a"), 0);
        assert_eq!(history.len("b"), 1);
    }

    #[test]
    fn sessions_are_kept_until_cleared() {
        let history = ConversationHistory::default();
        for n in 0..500 {
            history.record(&format!("session-{n}"), "u", "b");
        }
        assert_eq!(history.session_count(), 500);

        history.clear("session-0");
        assert_eq!(history.session_count(), 499);
    }

    #[test]
    fn concurrent_writers_on_one_session_stay_bounded() {
        let history = ConversationHistory::default();
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let history = history.clone();
                scope.spawn(move || {
                    for n in 0..100 {
                        history.record("shared", &format!("w{worker}-{n}"), "b");
                        history.record(&format!("own-{worker}"), "u", "b");
                    }
                });
            }
        });

        assert_eq!(history.len("shared"), 10);
        for worker in 0..8 {
            assert_eq!(history.len(&format!("own-{worker}")), 10);
        }
        assert_eq!(history.session_count(), 9);
    }
}
