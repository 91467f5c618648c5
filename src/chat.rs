//! Transcript types shared by the dialogue logic and the UI.

use crate::analysis::AnalysisResult;

/// One entry in the chat transcript.
#[derive(Debug, Clone)]
pub enum ChatEntry {
    User(String),
    Bot(String),
    Analysis(AnalysisResult),
}

/// Append-only transcript. Entries are never edited or removed
/// individually; `clear` exists only for the full-reset action.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
