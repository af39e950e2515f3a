//! Favorites shortlist: the rows shown under "Favorites" in the menu.

/// Feed indices in the order they were favorited, at most one row per feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    rows: Vec<usize>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row for `index`. Returns `false` if it is already listed.
    pub fn add(&mut self, index: usize) -> bool {
        if self.contains(index) {
            return false;
        }
        self.rows.push(index);
        true
    }

    /// Remove the row for `index`. Returns `false` if it was not listed.
    pub fn remove(&mut self, index: usize) -> bool {
        let before = self.rows.len();
        self.rows.retain(|&i| i != index);
        self.rows.len() != before
    }

    pub fn contains(&self, index: usize) -> bool {
        self.rows.contains(&index)
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
