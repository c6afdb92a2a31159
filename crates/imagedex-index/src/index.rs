use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use imagedex_core::error::{Error, Result};
use imagedex_core::types::{ImageRecord, OTHER_SECTION};

/// Record positions sharing one label, ascending.
pub type Positions = BTreeSet<usize>;

/// One active section: its key and the record positions it groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    pub name: &'a str,
    pub positions: &'a Positions,
}

impl Section<'_> {
    pub fn len(&self) -> usize { self.positions.len() }

    pub fn is_empty(&self) -> bool { self.positions.is_empty() }
}

/// Ascending lexicographic order, except `"other"` which always sorts last.
pub fn section_order(a: &str, b: &str) -> Ordering {
    match (a == OTHER_SECTION, b == OTHER_SECTION) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

/// Records plus two inverted indices (category → positions, search term →
/// positions) and an optional search filter.
///
/// Sections are never stored: every accessor derives them from the indices
/// and the filter, so repeated reads without mutation agree.
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    records: Vec<ImageRecord>,
    by_category: BTreeMap<String, Positions>,
    by_search_term: BTreeMap<String, Positions>,
    query: Option<String>,
}

impl ImageIndex {
    pub fn new() -> Self { Self::default() }

    /// Drop all records and both indices. The search filter is kept.
    pub fn clear(&mut self) {
        self.records.clear();
        self.by_category.clear();
        self.by_search_term.clear();
    }

    /// Append a record and index it at its position, which is returned.
    ///
    /// A record without categories goes under `"other"`; one without search
    /// terms is simply absent from the search-term index. A classifier label
    /// that is literally `"other"` lands in the same section, so members of
    /// `"other"` are not guaranteed to have empty categories.
    pub fn push(&mut self, record: ImageRecord) -> usize {
        let position = self.records.len();
        if record.categories().is_empty() {
            self.by_category.entry(OTHER_SECTION.to_string()).or_default().insert(position);
        } else {
            for category in record.categories().keys() {
                self.by_category.entry(category.clone()).or_default().insert(position);
            }
        }
        for term in record.search_terms().keys() {
            self.by_search_term.entry(term.clone()).or_default().insert(position);
        }
        self.records.push(record);
        position
    }

    /// Set the filter to the lower-cased `query`, or clear it when empty.
    pub fn search(&mut self, query: &str) {
        self.query = if query.is_empty() { None } else { Some(query.to_lowercase()) };
    }

    pub fn query(&self) -> Option<&str> { self.query.as_deref() }

    pub fn records(&self) -> &[ImageRecord] { &self.records }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn category_index(&self) -> &BTreeMap<String, Positions> { &self.by_category }

    pub fn search_term_index(&self) -> &BTreeMap<String, Positions> { &self.by_search_term }

    /// Keys of the active map (categories, or search terms matching the
    /// filter) in ascending order.
    fn active(&self) -> impl Iterator<Item = Section<'_>> + '_ {
        let (map, query) = match self.query.as_deref() {
            None => (&self.by_category, None),
            Some(q) => (&self.by_search_term, Some(q)),
        };
        map.iter()
            .filter(move |(name, _)| query.map_or(true, |q| name.to_lowercase().contains(q)))
            .map(|(name, positions)| Section { name, positions })
    }

    fn ordered(&self) -> impl Iterator<Item = Section<'_>> + '_ {
        self.active()
            .filter(|s| s.name != OTHER_SECTION)
            .chain(self.active().filter(|s| s.name == OTHER_SECTION))
    }

    /// Active sections in display order.
    pub fn sections(&self) -> Vec<Section<'_>> {
        self.ordered().collect()
    }

    pub fn section_count(&self) -> usize {
        match &self.query {
            None => self.by_category.len(),
            Some(q) => self.by_search_term.keys().filter(|k| k.to_lowercase().contains(q.as_str())).count(),
        }
    }

    /// The `index`-th active section, found without materialising the others.
    pub fn section(&self, index: usize) -> Result<Section<'_>> {
        self.ordered().nth(index).ok_or_else(|| Error::SectionOutOfRange { index, count: self.section_count() })
    }

    pub fn section_name(&self, index: usize) -> Result<&str> {
        Ok(self.section(index)?.name)
    }

    pub fn image_count(&self, section: usize) -> Result<usize> {
        Ok(self.section(section)?.len())
    }

    /// The `row`-th record (by ascending position) of section `section`.
    pub fn image_at(&self, row: usize, section: usize) -> Result<&ImageRecord> {
        let positions = self.section(section)?.positions;
        positions
            .iter()
            .nth(row)
            .and_then(|&position| self.records.get(position))
            .ok_or(Error::RowOutOfRange { row, section, count: positions.len() })
    }
}

impl Extend<ImageRecord> for ImageIndex {
    fn extend<I: IntoIterator<Item = ImageRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

impl FromIterator<ImageRecord> for ImageIndex {
    fn from_iter<I: IntoIterator<Item = ImageRecord>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_sorts_after_everything() {
        let mut keys = vec!["zebra", "other", "apple", "Other", "otter"];
        keys.sort_by(|a, b| section_order(a, b));
        assert_eq!(keys, vec!["Other", "apple", "otter", "zebra", "other"]);
    }

    #[test]
    fn sections_follow_section_order() {
        use imagedex_core::types::Classification;
        let index: ImageIndex = ["zebra", "other", "Apple", "otter"]
            .iter()
            .map(|label| {
                let categories = [(label.to_string(), 0.9)].into_iter().collect();
                ImageRecord::new(format!("{}.png", label), None, Classification { categories, ..Default::default() })
            })
            .collect();
        let names: Vec<&str> = index.sections().iter().map(|s| s.name).collect();
        let mut sorted = names.clone();
        sorted.sort_by(|a, b| section_order(a, b));
        assert_eq!(names, sorted);
        assert_eq!(index.section_name(3).unwrap(), "other");
        assert_eq!(index.section(1).unwrap().name, "otter");
    }

    #[test]
    fn empty_index_has_no_sections() {
        let index = ImageIndex::new();
        assert_eq!(index.section_count(), 0);
        assert!(matches!(index.section_name(0), Err(Error::SectionOutOfRange { index: 0, count: 0 })));
    }
}
