//! Per-user word frequency counts

use dashmap::DashMap;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// How many entries the top-N queries return
pub const TOP_LIMIT: usize = 10;

/// Word counts keyed by user id, plus the tally across everyone
#[derive(Default)]
pub struct WordCounter {
    per_user: DashMap<u64, HashMap<String, u64>>,
    totals: DashMap<String, u64>,
    ready: AtomicBool,
}

impl WordCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every whitespace-separated word of a message for its author
    pub fn record_message(&self, user_id: u64, content: &str) {
        let mut words = content.split_whitespace().peekable();
        if words.peek().is_none() {
            return;
        }

        let mut user_counts = self.per_user.entry(user_id).or_default();
        for word in words {
            *user_counts.entry(word.to_string()).or_insert(0) += 1;
            *self.totals.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    /// How often `user_id` said `word`. `None` if nothing is known about the user.
    pub fn count_for_user(&self, user_id: u64, word: &str) -> Option<u64> {
        self.per_user
            .get(&user_id)
            .map(|counts| counts.get(word).copied().unwrap_or(0))
    }

    /// How often anyone said `word`
    pub fn total_for_word(&self, word: &str) -> u64 {
        self.totals.get(word).map(|c| *c).unwrap_or(0)
    }

    /// The user's most used words, most frequent first
    pub fn top_words_for_user(&self, user_id: u64, limit: usize) -> Option<Vec<(String, u64)>> {
        let counts = self.per_user.get(&user_id)?;
        let mut pairs: Vec<(String, u64)> = counts
            .iter()
            .map(|(word, count)| (word.clone(), *count))
            .collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pairs.truncate(limit);
        Some(pairs)
    }

    /// Users who said `word` the most, most frequent first
    pub fn top_users_for_word(&self, word: &str, limit: usize) -> Vec<(u64, u64)> {
        let mut pairs: Vec<(u64, u64)> = self
            .per_user
            .iter()
            .filter_map(|entry| entry.value().get(word).map(|count| (*entry.key(), *count)))
            .collect();
        pairs.sort_by_key(|&(user, count)| (Reverse(count), user));
        pairs.truncate(limit);
        pairs
    }

    pub fn user_count(&self) -> usize {
        self.per_user.len()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Whether the history scan has finished
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
