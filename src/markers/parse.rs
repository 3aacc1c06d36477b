//! Inline marker syntax in narration text.
//!
//! - `{#id}` binds to the START of the word right after it.
//! - `{id#}` binds to the END of the word right before it.
//!
//! Ids are `[A-Za-z0-9_-]+`. Anything else between braces is ordinary text to
//! [`parse_markers`]; [`strip_markers`] also drops `{id}` and `{#id#}`.

use serde::{Deserialize, Serialize};

/// Which edge of the bound word a marker resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerAnchor {
    /// Start of the next word (`{#id}`).
    Start,
    /// End of the previous word (`{id#}`).
    End,
}

/// Marker found in narration text, bound to a word position of the clean text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMarker {
    /// Marker id.
    pub id: String,
    /// Index of the bound word in the clean text. `None` for an end marker with no word before
    /// it.
    pub word_index: Option<usize>,
    /// Edge of the word the marker resolves to.
    pub anchor: MarkerAnchor,
}

/// Narration with markers removed plus the markers in text order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedNarration {
    /// Words joined by single spaces, markers removed.
    pub clean_text: String,
    /// Markers in order of appearance.
    pub markers: Vec<ParsedMarker>,
}

fn is_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn id_len(b: &[u8]) -> usize {
    b.iter().take_while(|&&c| is_id_byte(c)).count()
}

/// Match a marker at the start of `s` (which begins with `{`). Returns `(byte_len, id, anchor)`.
fn match_marker(s: &str) -> Option<(usize, &str, MarkerAnchor)> {
    let b = s.as_bytes();
    if b.first() != Some(&b'{') {
        return None;
    }
    if b.get(1) == Some(&b'#') {
        let n = id_len(&b[2..]);
        if n > 0 && b.get(2 + n) == Some(&b'}') {
            return Some((n + 3, &s[2..2 + n], MarkerAnchor::Start));
        }
        return None;
    }
    let n = id_len(&b[1..]);
    if n > 0 && b.get(1 + n) == Some(&b'#') && b.get(2 + n) == Some(&b'}') {
        return Some((n + 3, &s[1..1 + n], MarkerAnchor::End));
    }
    None
}

enum Token<'a> {
    Word(&'a str),
    Marker(&'a str, MarkerAnchor),
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chunk_start = 0;
    let mut i = 0;
    while let Some(rel) = text[i..].find('{') {
        let at = i + rel;
        match match_marker(&text[at..]) {
            Some((len, id, anchor)) => {
                tokens.extend(text[chunk_start..at].split_whitespace().map(Token::Word));
                tokens.push(Token::Marker(id, anchor));
                i = at + len;
                chunk_start = i;
            }
            None => i = at + 1,
        }
    }
    tokens.extend(text[chunk_start..].split_whitespace().map(Token::Word));
    tokens
}

/// Split narration into clean text and word-bound markers.
pub fn parse_markers(text: &str) -> ParsedNarration {
    let mut words = Vec::new();
    let mut markers = Vec::new();
    for token in tokenize(text) {
        match token {
            Token::Word(w) => words.push(w),
            Token::Marker(id, anchor) => {
                let word_index = match anchor {
                    MarkerAnchor::Start => Some(words.len()),
                    MarkerAnchor::End => words.len().checked_sub(1),
                };
                markers.push(ParsedMarker {
                    id: id.to_owned(),
                    word_index,
                    anchor,
                });
            }
        }
    }
    ParsedNarration {
        clean_text: words.join(" "),
        markers,
    }
}

/// Length of any brace-wrapped id at the start of `b`: `{id}`, `{#id}`, `{id#}` or `{#id#}`.
fn any_marker_len(b: &[u8]) -> Option<usize> {
    if b.first() != Some(&b'{') {
        return None;
    }
    let mut at = 1;
    if b.get(at) == Some(&b'#') {
        at += 1;
    }
    let n = id_len(&b[at..]);
    if n == 0 {
        return None;
    }
    at += n;
    if b.get(at) == Some(&b'#') {
        at += 1;
    }
    (b.get(at) == Some(&b'}')).then_some(at + 1)
}

/// Narration text with every brace-wrapped id removed, for TTS and cache keys.
///
/// Wider than [`parse_markers`]: the anchorless `{id}` and `{#id#}` forms are dropped too. Runs
/// of two or more whitespace characters collapse to one space, single line breaks survive, and
/// the result is trimmed.
pub fn strip_markers(text: &str) -> String {
    let mut removed = String::with_capacity(text.len());
    let mut chunk_start = 0;
    let mut i = 0;
    while let Some(rel) = text[i..].find('{') {
        let at = i + rel;
        match any_marker_len(&text.as_bytes()[at..]) {
            Some(len) => {
                removed.push_str(&text[chunk_start..at]);
                i = at + len;
                chunk_start = i;
            }
            None => i = at + 1,
        }
    }
    removed.push_str(&text[chunk_start..]);

    let mut out = String::with_capacity(removed.len());
    let mut run = String::new();
    for c in removed.chars() {
        if c.is_whitespace() {
            run.push(c);
            continue;
        }
        flush_whitespace(&mut out, &mut run);
        out.push(c);
    }
    flush_whitespace(&mut out, &mut run);
    out.trim().to_owned()
}

fn flush_whitespace(out: &mut String, run: &mut String) {
    if run.chars().count() >= 2 {
        out.push(' ');
    } else {
        out.push_str(run);
    }
    run.clear();
}

/// `true` when `text` contains at least one brace-wrapped id in any of the forms
/// [`strip_markers`] removes.
pub fn has_markers(text: &str) -> bool {
    let b = text.as_bytes();
    b.iter()
        .enumerate()
        .any(|(i, &c)| c == b'{' && any_marker_len(&b[i..]).is_some())
}

#[cfg(test)]
#[path = "../../tests/unit/markers/parse.rs"]
mod tests;
