//! Intent extraction from final transcripts.
//!
//! Stateless text-pattern matcher downstream of the transcript callback.
//! A wake word gates all matching to avoid false positives on ordinary
//! conversation; patterns are fixed at startup, not discovered at runtime.

use crate::defaults;

/// Action extracted from a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Play a song, optionally by a named artist.
    Play {
        song: String,
        artist: Option<String>,
    },
    /// No recognized intent.
    None,
}

/// Wake-word-gated intent matcher.
#[derive(Debug, Clone)]
pub struct IntentParser {
    wake_word: String,
}

impl IntentParser {
    /// Creates a parser with the default wake word.
    pub fn new() -> Self {
        Self {
            wake_word: defaults::WAKE_WORD.to_string(),
        }
    }

    /// Overrides the wake word (matched lowercase, diacritics stripped).
    pub fn with_wake_word(mut self, wake_word: &str) -> Self {
        self.wake_word = normalize(wake_word);
        self
    }

    /// Parses one transcript into an intent.
    ///
    /// Matching happens on lowercased, diacritic-stripped text with
    /// collapsed whitespace, so "Reproduce Corazón..." and
    /// "reproduce corazon" hit the same pattern.
    pub fn parse(&self, text: &str) -> Intent {
        let normalized = normalize(text);
        if !normalized.contains(&self.wake_word) {
            return Intent::None;
        }

        let Some(rest) = after_keyword(&normalized, "reproduce") else {
            return Intent::None;
        };
        if rest.is_empty() {
            return Intent::None;
        }

        // "reproduce <song> de <artist>" — first separator wins, mirroring
        // a non-greedy song match.
        if let Some(idx) = rest.find(" de ") {
            let song = rest[..idx].trim();
            let artist = rest[idx + 4..].trim();
            if !song.is_empty() && !artist.is_empty() {
                return Intent::Play {
                    song: song.to_string(),
                    artist: Some(artist.to_string()),
                };
            }
        }

        Intent::Play {
            song: rest.to_string(),
            artist: None,
        }
    }
}

impl Default for IntentParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercases, strips combining diacritics, and collapses whitespace.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for c in text.chars().flat_map(|c| c.to_lowercase()) {
        let c = strip_diacritic(c);
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Maps accented Latin letters to their base letter.
fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Returns the text after a whole-word keyword, or None if absent.
fn after_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    for (idx, _) in text.match_indices(keyword) {
        let before_ok = idx == 0 || text.as_bytes()[idx - 1] == b' ';
        let after = idx + keyword.len();
        if before_ok && text.as_bytes().get(after).is_none_or(|&b| b == b' ') {
            return Some(text[after..].trim_start());
        }
    }
    None
}
