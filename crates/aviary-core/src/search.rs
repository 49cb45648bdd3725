use crate::bird::{BirdDetails, BirdFields, BirdId};

/// Escape character of [`SearchTerm::like_pattern`]. Not a backslash, so the
/// pattern reads the same under any `sql_mode`.
pub const LIKE_ESCAPE: char = '!';

/// A search term for birds.
///
/// A bird matches when the term is a case-insensitive substring of its
/// primary, English or scientific name, or when the term parses as an
/// integer equal to its id. Diacritics are significant: `kereru` does not
/// match `Kererū`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    text: String,
    id: Option<BirdId>,
}

impl SearchTerm {
    pub fn new(term: impl AsRef<str>) -> Self {
        let text = term.as_ref().trim().to_string();
        let id = text.parse::<BirdId>().ok();
        Self { text, id }
    }

    /// The trimmed term.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The id to match exactly, when the term is numeric.
    pub fn bird_id(&self) -> Option<BirdId> {
        self.id
    }

    /// An empty term matches nothing.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Lowercased `LIKE` pattern with `%`, `_` and the escape character
    /// escaped, so the term is always matched as a literal substring. Use
    /// with `ESCAPE '!'` ([`LIKE_ESCAPE`]).
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.text.len() + 2);
        pattern.push('%');
        for c in self.text.to_lowercase().chars() {
            if matches!(c, LIKE_ESCAPE | '%' | '_') {
                pattern.push(LIKE_ESCAPE);
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    /// Evaluates the term against a record in memory.
    pub fn matches(&self, bird_id: BirdId, fields: &BirdFields) -> bool {
        if self.is_empty() {
            return false;
        }
        if self.id == Some(bird_id) {
            return true;
        }

        let needle = self.text.to_lowercase();
        [
            &fields.primary_name,
            &fields.english_name,
            &fields.scientific_name,
        ]
        .into_iter()
        .any(|name| name.to_lowercase().contains(&needle))
    }
}

/// How a search request resolves, by number of matches.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    NoMatch,
    Single(BirdId),
    Many(Vec<BirdDetails>),
}

impl From<Vec<BirdDetails>> for SearchOutcome {
    fn from(mut birds: Vec<BirdDetails>) -> Self {
        match birds.len() {
            0 => SearchOutcome::NoMatch,
            1 => SearchOutcome::Single(birds.remove(0).bird_id),
            _ => SearchOutcome::Many(birds),
        }
    }
}
