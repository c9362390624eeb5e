/// Case-insensitive free-text search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    needle: String,
}

impl SearchTerm {
    /// Build a term from user input; surrounding whitespace is ignored.
    pub fn new(input: &str) -> Self {
        let raw = input.trim().to_string();
        let needle = raw.to_lowercase();
        Self { raw, needle }
    }

    /// Whether the term is empty (matches everything).
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Term as typed, trimmed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lower-cased term used for matching.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// True when the term is empty or a substring of any of `fields`.
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        if self.is_empty() {
            return true;
        }
        fields
            .into_iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }
}
