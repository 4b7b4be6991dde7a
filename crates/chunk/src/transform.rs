//! Text rewrites behind the editing primitives. Ranges are inclusive character ranges and
//! are clamped to the text.

use crate::text::byte_offset;

const HIRAGANA: std::ops::RangeInclusive<char> = '\u{3041}'..='\u{3096}';
const KATAKANA: std::ops::RangeInclusive<char> = '\u{30A1}'..='\u{30F6}';
const KANA_SHIFT: u32 = 0x60;

fn split_around(text: &str, start: usize, end: usize) -> (&str, &str, &str) {
    let from = byte_offset(text, start);
    let to = byte_offset(text, end.saturating_add(1)).max(from);
    (&text[..from], &text[from..to], &text[to..])
}

/// Replaces characters `start..=end` with `with`.
pub fn splice(text: &str, (start, end): (usize, usize), with: &str) -> String {
    let (head, _, tail) = split_around(text, start, end);
    [head, with, tail].concat()
}

pub fn delete_range(text: &str, range: (usize, usize)) -> String {
    splice(text, range, "")
}

/// Keeps every other character of `start..=end`, starting with the first.
pub fn delete_every_second_char(text: &str, (start, end): (usize, usize)) -> String {
    let (head, middle, tail) = split_around(text, start, end);
    let kept: String = middle.chars().step_by(2).collect();
    [head, &kept, tail].concat()
}

pub fn duplicate_range(text: &str, (start, end): (usize, usize)) -> String {
    let (head, middle, tail) = split_around(text, start, end);
    [head, middle, middle, tail].concat()
}

fn shift(c: char, up: bool) -> char {
    let code = if up {
        u32::from(c) + KANA_SHIFT
    } else {
        u32::from(c) - KANA_SHIFT
    };
    char::from_u32(code).unwrap_or(c)
}

/// Shifts hiragana to the matching katakana. Everything else, `ー` included, is kept.
pub fn hiragana_to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| if HIRAGANA.contains(&c) { shift(c, true) } else { c })
        .collect()
}

/// Shifts katakana to the matching hiragana. `ヵ` and `ヶ` are commonly used as counters
/// rather than as kana and are kept, as is `ー`.
pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ヵ' | 'ヶ' => c,
            c if KATAKANA.contains(&c) => shift(c, false),
            c => c,
        })
        .collect()
}

/// Form placed on the clipboard by a plain copy: line breaks removed.
pub fn clipboard_form(text: &str) -> String {
    text.chars().filter(|&c| c != '\n').collect()
}
