//! Raw tabular input rows.

/// One input row: column name / value pairs in source order.
///
/// Column names may repeat (tracker exports emit one `Sprint` column per
/// sprint an issue has been in), so this is a list rather than a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self { fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate `(column, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First non-empty (trimmed) value of `column`, matched case-insensitively.
    pub fn get(&self, column: &str) -> Option<&str> {
        let wanted = column.trim();
        self.fields
            .iter()
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, value)| value.trim())
            .find(|value| !value.is_empty())
    }

    /// First non-empty value across a list of column aliases, trying the
    /// aliases in priority order.
    pub fn first_of(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|column| self.get(column))
    }
}

#[cfg(test)]
mod tests {
    use super::RawRecord;

    #[test]
    fn get_coalesces_repeated_columns_to_first_non_empty() {
        let record = RawRecord::from_pairs([("Sprint", ""), ("Sprint", " A 2025-1 "), ("Sprint", "B")]);
        assert_eq!(record.get("sprint"), Some("A 2025-1"));
    }

    #[test]
    fn first_of_respects_alias_priority() {
        let record = RawRecord::from_pairs([("Team", "Ops"), ("Custom field (Team)", "Core")]);
        assert_eq!(record.first_of(&["Custom field (Team)", "Team"]), Some("Core"));
        assert_eq!(record.first_of(&["Missing"]), None);
    }
}
