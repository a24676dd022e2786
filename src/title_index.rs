use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Bijective mapping between canonical titles and matrix row positions.
///
/// Built from the final corpus ordering, so position `i` here is row `i` of
/// the similarity matrix. Enumeration order is insertion order, which the
/// fuzzy resolver relies on for deterministic tie-breaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleIndex {
    positions: IndexMap<String, u32>,
}

impl TitleIndex {
    /// Build from titles in corpus order. Titles are unique post-dedup;
    /// a repeated title would keep its first position.
    pub fn from_titles<I>(titles: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut positions = IndexMap::new();
        for title in titles {
            let next = positions.len() as u32;
            positions.entry(title).or_insert(next);
        }
        Self { positions }
    }

    /// Matrix row of an exact title.
    pub fn position(&self, title: &str) -> Option<usize> {
        self.positions.get(title).map(|&i| i as usize)
    }

    /// Title at a matrix row.
    pub fn title_at(&self, position: usize) -> Option<&str> {
        self.positions
            .get_index(position)
            .map(|(title, _)| title.as_str())
    }

    pub fn contains(&self, title: &str) -> bool {
        self.positions.contains_key(title)
    }

    /// All titles in position order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
