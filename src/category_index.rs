use std::collections::HashMap;

/// Stable mapping from distinct categorical values to indices in `[0, len)`.
///
/// Indices follow first-occurrence order of the input, so building twice from
/// the same sequence yields identical tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryIndex {
    indices: HashMap<String, usize>,
    values: Vec<String>,
}

impl CategoryIndex {
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = CategoryIndex::default();
        for value in values {
            if !index.indices.contains_key(value) {
                index.indices.insert(value.to_string(), index.values.len());
                index.values.push(value.to_string());
            }
        }
        index
    }

    /// No implicit "unknown" bucket: callers decide what a miss means.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.indices.get(value).copied()
    }

    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.values.iter().enumerate().map(|(i, v)| (i, v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_order() {
        let index = CategoryIndex::from_values(["shoes", "shirts", "shoes", "hats"]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.index_of("shoes"), Some(0));
        assert_eq!(index.index_of("shirts"), Some(1));
        assert_eq!(index.index_of("hats"), Some(2));
        assert_eq!(index.value_at(1), Some("shirts"));
    }

    #[test]
    fn test_unknown_value_has_no_index() {
        let index = CategoryIndex::from_values(["red"]);
        assert_eq!(index.index_of("blue"), None);
        assert_eq!(index.value_at(1), None);
    }

    #[test]
    fn test_deterministic() {
        let input = ["b", "a", "c", "a", "b"];
        let first = CategoryIndex::from_values(input);
        let second = CategoryIndex::from_values(input);
        assert_eq!(first, second);

        let collected: Vec<_> = first.iter().collect();
        assert_eq!(collected, vec![(0, "b"), (1, "a"), (2, "c")]);
    }
}
