use crate::data::datatable::DataRow;

/// Per-column substring filter.
///
/// A row matches when, for every active entry, the row's value for that
/// column (as text, absent/null as empty) contains the needle ignoring case.
/// Entries are ANDed. Whitespace-only needles are not active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilter {
    /// (column key, lowercased needle)
    needles: Vec<(String, String)>,
}

impl ColumnFilter {
    pub fn matches(&self, row: &DataRow) -> bool {
        self.needles
            .iter()
            .all(|(column, needle)| row.text(column).to_lowercase().contains(needle.as_str()))
    }

    /// True when no entry constrains rows
    pub fn is_empty(&self) -> bool {
        self.needles.is_empty()
    }
}

/// Build the row predicate for a column → text mapping
pub fn build_predicate<I, K, V>(filters: I) -> ColumnFilter
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let needles = filters
        .into_iter()
        .filter(|(_, text)| !text.as_ref().trim().is_empty())
        .map(|(column, text)| (column.as_ref().to_string(), text.as_ref().to_lowercase()))
        .collect();

    ColumnFilter { needles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::DataValue;

    fn fruit(name: &str) -> DataRow {
        DataRow::new().with("name", name)
    }

    #[test]
    fn test_case_insensitive_substring() {
        let filter = build_predicate([("name", "A")]);

        assert!(filter.matches(&fruit("Apple")));
        assert!(filter.matches(&fruit("banana")));
        assert!(!filter.matches(&fruit("plum")));
    }

    #[test]
    fn test_whitespace_only_is_no_constraint() {
        let filter = build_predicate([("name", "   "), ("size", "")]);

        assert!(filter.is_empty());
        assert!(filter.matches(&fruit("anything")));
    }

    #[test]
    fn test_filters_are_anded() {
        let filter = build_predicate([("name", "an"), ("size", "1")]);
        let small = DataRow::new().with("name", "banana").with("size", 10);
        let large = DataRow::new().with("name", "banana").with("size", 20);

        assert!(!filter.is_empty());
        assert!(filter.matches(&small));
        assert!(!filter.matches(&large));
    }

    #[test]
    fn test_null_and_absent_values_are_empty_text() {
        let filter = build_predicate([("owner", "x")]);
        let null_row = DataRow::new().with("owner", DataValue::Null);

        assert!(!filter.matches(&null_row));
        assert!(!filter.matches(&DataRow::new()));
    }

    #[test]
    fn test_numbers_match_their_text_form() {
        let filter = build_predicate([("size", "2.5")]);
        assert!(filter.matches(&DataRow::new().with("size", 12.5)));
    }
}
