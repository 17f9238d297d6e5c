use std::collections::VecDeque;

use chrono::{DateTime, Local};

/// Number of jokes kept on screen.
pub const HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct JokeRecord {
    pub joke: String,
    pub topic: String,
    pub timestamp: String,
}

impl JokeRecord {
    pub fn new(joke: String, topic: String, created_at: DateTime<Local>) -> Self {
        Self {
            joke,
            topic,
            timestamp: created_at.format("%H:%M:%S").to_string(),
        }
    }
}

/// Most-recent-first list of generated jokes, capped at [`HISTORY_LIMIT`].
#[derive(Debug, Default, Clone)]
pub struct JokeHistory {
    records: VecDeque<JokeRecord>,
}

impl JokeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front, then drop whatever fell off the tail.
    pub fn push(&mut self, record: JokeRecord) {
        self.records.push_front(record);
        self.records.truncate(HISTORY_LIMIT);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&JokeRecord> {
        self.records.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JokeRecord> {
        self.records.iter()
    }
}
