// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Word and list handling for command-language text.
//!
//! Word and value extraction returns subslices of its input. "Words" are
//! runs of non-whitespace; quote-aware words additionally treat a
//! double-quoted run as a single word.


/// Split off the first whitespace-delimited word.
///
/// Returns `(word, rest)` with leading whitespace removed from `rest`, or
/// `None` if `text` holds no word.
#[must_use]
pub fn next_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    Some((&text[..end], text[end..].trim_start()))
}

/// Split off the first word, treating a double-quoted run as one word.
///
/// The quotes stay part of the returned word. An unterminated quote runs to
/// the end of the text.
#[must_use]
pub fn next_quoted_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if !text.starts_with('"') {
        return next_word(text);
    }

    let end = text[1..]
        .find('"')
        .map_or(text.len(), |close| close + 2);
    let end = end + text[end..].find(char::is_whitespace).unwrap_or(text.len() - end);
    Some((&text[..end], text[end..].trim_start()))
}

/// Take up to `count` words from the front of `text`.
///
/// Returns the span covering those words (inner spacing preserved) and the
/// remainder with leading whitespace removed. Asking for zero words yields
/// an empty span.
#[must_use]
pub fn take_words(text: &str, count: usize, quoted: bool) -> (&str, &str) {
    let text = text.trim_start();
    let mut rest = text;

    for _ in 0..count {
        let next = if quoted {
            next_quoted_word(rest)
        } else {
            next_word(rest)
        };
        let Some((_, after)) = next else {
            break;
        };
        rest = after;
    }

    // `rest` is always a suffix of `text`
    (text[..text.len() - rest.len()].trim_end(), rest)
}

/// Find the byte offset of the `close` character matching an already
/// consumed `open` character.
///
/// `text` starts just after the opening character. Nested pairs are skipped.
#[must_use]
pub fn matching_bracket(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in text.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return Some(offset);
            }
            depth -= 1;
        }
    }
    None
}

/// Split a comma-separated list, ignoring commas nested inside `()`, `[]`,
/// `{}` or double quotes. Terms are trimmed; empty terms are kept.
#[must_use]
pub fn split_comma_list(text: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;

    for (offset, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' | '[' | '{' if !in_quotes => depth += 1,
            ')' | ']' | '}' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if !in_quotes && depth == 0 => {
                terms.push(text[start..offset].trim());
                start = offset + 1;
            }
            _ => {}
        }
    }
    terms.push(text[start..].trim());
    terms
}

/// Split off the next value, stripping one level of `{...}` or `"..."`.
///
/// Braced values may contain whitespace and nested braces. Returns `None`
/// if `text` is empty.
#[must_use]
pub fn next_value(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if let Some(inner) = text.strip_prefix('{') {
        if let Some(close) = matching_bracket(inner, '{', '}') {
            return Some((&inner[..close], inner[close + 1..].trim_start()));
        }
    }
    if let Some(inner) = text.strip_prefix('"') {
        if let Some(close) = inner.find('"') {
            return Some((&inner[..close], inner[close + 1..].trim_start()));
        }
    }
    next_word(text)
}

/// Case-insensitive ASCII prefix test.
#[must_use]
pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Case-insensitive wildcard match supporting `*` (any run) and `?` (any
/// single character).
#[must_use]
pub fn wild_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, mark)) = backtrack {
            p = star + 1;
            t = mark + 1;
            backtrack = Some((star, mark + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Check a variable name for characters that cannot appear in one.
///
/// Names are letters, digits, `_` and `.`, optionally followed by balanced
/// `[...]` subscripts. Returns the first offending character, if any.
#[must_use]
pub fn invalid_identifier_char(name: &str) -> Option<char> {
    let end = name
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
        .unwrap_or(name.len());
    let mut rest = &name[end..];

    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = matching_bracket(inner, '[', ']') else {
            return Some('[');
        };
        rest = &inner[close + 1..];
    }

    rest.chars().next()
}
