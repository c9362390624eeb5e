use regex::{Regex, RegexBuilder};

use super::SearchTerm;

/// Piece of a field split for highlight markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Text of the piece.
    pub text: &'a str,
    /// Whether the piece matched the search term.
    pub matched: bool,
}

/// Splits text around case-insensitive occurrences of a search term.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// Build a highlighter; the term is matched literally.
    pub fn new(term: &SearchTerm) -> Self {
        let pattern = if term.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(term.raw()))
                .case_insensitive(true)
                .build()
                .ok()
        };
        Self { pattern }
    }

    /// Split `text` into alternating unmatched and matched segments.
    pub fn segments<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let Some(pattern) = &self.pattern else {
            return vec![Segment {
                text,
                matched: false,
            }];
        };

        let mut segments = Vec::new();
        let mut last = 0;
        for found in pattern.find_iter(text) {
            if found.start() > last {
                segments.push(Segment {
                    text: &text[last..found.start()],
                    matched: false,
                });
            }
            segments.push(Segment {
                text: found.as_str(),
                matched: true,
            });
            last = found.end();
        }
        if last < text.len() || segments.is_empty() {
            segments.push(Segment {
                text: &text[last..],
                matched: false,
            });
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(highlighter: &Highlighter, text: &str) -> String {
        highlighter
            .segments(text)
            .into_iter()
            .map(|segment| {
                if segment.matched {
                    format!("[{}]", segment.text)
                } else {
                    segment.text.to_string()
                }
            })
            .collect()
    }

    #[test]
    fn marks_every_occurrence_ignoring_case() {
        let highlighter = Highlighter::new(&SearchTerm::new("sa"));
        assert_eq!(render(&highlighter, "Saber of Sands"), "[Sa]ber of [Sa]nds");
    }

    #[test]
    fn treats_term_literally() {
        let highlighter = Highlighter::new(&SearchTerm::new("(+"));
        assert_eq!(render(&highlighter, "a(+b"), "a[(+]b");
    }

    #[test]
    fn empty_term_leaves_text_whole() {
        let highlighter = Highlighter::new(&SearchTerm::new(""));
        let segments = highlighter.segments("검");
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].matched);
        assert_eq!(Highlighter::new(&SearchTerm::new("x")).segments("").len(), 1);
    }
}
