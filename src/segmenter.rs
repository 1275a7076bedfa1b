use std::fmt;
use once_cell::sync::Lazy;
use regex::Regex;

// @module: Document segmentation into caption units

// @const: Numbered item marker, e.g. "3. Configure the service"
static NUMBERED_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\.\s").unwrap()
});

// @const: Inline labeled clause, e.g. "- Term: short definition."
static LABELED_CLAUSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-\s?.+?:\s?.+?\.").unwrap()
});

// @const: Candidate sentence boundary, one whitespace right after . or ?
static SENTENCE_BOUNDARY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.?]\s").unwrap()
});

// @struct: One atomic unit of caption text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionUnit {
    // @field: Text shown on screen and narrated for this unit
    pub text: String,
}

impl CaptionUnit {
    /// Create a new caption unit
    pub fn new<S: Into<String>>(text: S) -> Self {
        CaptionUnit { text: text.into() }
    }
}

impl fmt::Display for CaptionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

// @struct: Stateless segmentation routines
pub struct Segmenter;

impl Segmenter {
    // @transforms: Ordered document lines into ordered caption units
    // @rules: Bullets and numbered items stay verbatim, prose accumulates
    //         until a marker or end of input and is then sentence-split
    pub fn segment<S: AsRef<str>>(lines: &[S]) -> Vec<CaptionUnit> {
        let mut units: Vec<CaptionUnit> = Vec::new();
        let mut buffer = String::new();

        for raw in lines {
            let line = raw.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('-') {
                // A bullet closes the running prose as a single unit, which is
                // usually a short lead-in like "Key terms include:"
                if !buffer.is_empty() {
                    units.push(CaptionUnit::new(buffer.trim()));
                    buffer.clear();
                }
                units.push(CaptionUnit::new(line));
            } else if NUMBERED_MARKER_REGEX.is_match(line) {
                if !buffer.is_empty() {
                    units.extend(
                        Self::split_sentences(buffer.trim())
                            .into_iter()
                            .map(CaptionUnit::new),
                    );
                    buffer.clear();
                }
                units.push(CaptionUnit::new(line));
            } else if buffer.is_empty() {
                buffer.push_str(line);
            } else {
                buffer.push(' ');
                buffer.push_str(line);
            }
        }

        if !buffer.is_empty() {
            units.extend(
                Self::split_sentences(buffer.trim())
                    .into_iter()
                    .map(CaptionUnit::new),
            );
        }

        units
    }

    /// Split accumulated prose into sentence-sized fragments.
    ///
    /// Two or more inline labeled clauses mean the text is really an inline
    /// list, and only the clauses themselves are kept. Otherwise the text is
    /// split on single whitespace following `.` or `?`, with two fixed-width
    /// windows protecting common abbreviations. Fragments are returned as-is,
    /// without trimming or empty filtering.
    pub fn split_sentences(text: &str) -> Vec<String> {
        let clause_matches: Vec<String> = LABELED_CLAUSE_REGEX
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        if clause_matches.len() >= 2 {
            return clause_matches;
        }

        let mut sentences = Vec::new();
        let mut last = 0;
        for boundary in SENTENCE_BOUNDARY_REGEX.find_iter(text) {
            // The match covers the punctuation and the whitespace after it,
            // punctuation stays with the fragment before the split
            let ws_start = boundary.start() + 1;
            if Self::is_guarded_abbreviation(text, ws_start) {
                continue;
            }
            sentences.push(text[last..ws_start].to_string());
            last = boundary.end();
        }
        sentences.push(text[last..].to_string());
        sentences
    }

    // Fixed-width abbreviation windows checked by hand since the regex crate
    // has no lookbehind. `ws_pos` is the byte offset of the whitespace that
    // follows the punctuation.
    fn is_guarded_abbreviation(text: &str, ws_pos: usize) -> bool {
        let prev: Vec<char> = text[..ws_pos].chars().rev().take(4).collect();

        // Dotted abbreviation window, e.g. "U.S." or "e.g."
        if prev.len() == 4
            && Self::is_word_char(prev[3])
            && prev[2] == '.'
            && Self::is_word_char(prev[1])
        {
            return true;
        }

        // Honorific window, e.g. "Dr." or "Mr."
        if prev.len() >= 3
            && prev[2].is_ascii_uppercase()
            && prev[1].is_ascii_lowercase()
            && prev[0] == '.'
        {
            return true;
        }

        false
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }
}
