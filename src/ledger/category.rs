use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "shopping";
pub const DEFAULT_CATEGORIES: [&str; 3] = ["shopping", "taxes", "groceries"];

/// User-defined category labels, unique and kept in insertion order on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryRegistry(Vec<String>);

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self(DEFAULT_CATEGORIES.iter().map(|name| name.to_string()).collect())
    }
}

impl CategoryRegistry {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|existing| existing == name)
    }

    /// Appends `name` unless it is already registered. Returns whether the
    /// registry changed.
    pub(crate) fn insert(&mut self, name: String) -> bool {
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    /// Whether operations may use `name`. An empty registry still offers
    /// the default category, so it accepts it too.
    pub fn accepts(&self, name: &str) -> bool {
        self.contains(name) || (self.0.is_empty() && name == DEFAULT_CATEGORY)
    }

    /// Drops repeated labels, keeping the first occurrence. Returns how many
    /// were removed.
    pub(crate) fn dedup(&mut self) -> usize {
        let before = self.0.len();
        let mut seen = Vec::with_capacity(before);
        self.0.retain(|name| {
            if seen.contains(name) {
                false
            } else {
                seen.push(name.clone());
                true
            }
        });
        before - self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    /// Sorted labels, falling back to the default category when empty.
    pub fn sorted(&self) -> Vec<String> {
        if self.0.is_empty() {
            return vec![DEFAULT_CATEGORY.to_string()];
        }
        let mut names = self.0.clone();
        names.sort();
        names
    }
}
