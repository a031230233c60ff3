use std::collections::HashMap;

/// Moderated chat id -> reference chat id.
///
/// Built once at startup and only read afterwards, so it is shared behind a
/// plain `Arc` without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveTable {
    entries: HashMap<i64, i64>,
}

impl DirectiveTable {
    pub fn new(entries: HashMap<i64, i64>) -> Self {
        Self { entries }
    }

    /// Reference chat whose members may join `chat_id`, if it is moderated.
    pub fn reference_chat(&self, chat_id: i64) -> Option<i64> {
        self.entries.get(&chat_id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(i64, i64)> for DirectiveTable {
    fn from_iter<I: IntoIterator<Item = (i64, i64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
