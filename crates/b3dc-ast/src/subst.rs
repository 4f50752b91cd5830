//! Textual substitution rules used when expanding sums and comprehensions.
//!
//! The generator renders a sum/comprehension body once, symbolically, with
//! the loop variable left as a plain identifier, then substitutes the
//! loop variable's text for each concrete index and cleans up the
//! resulting bracket/index text. This is a deliberately string-level step
//! (see DESIGN.md) rather than a second structural lowering pass.

/// Replaces every whole-word occurrence of `name` in `text` with `value`.
/// "Whole word" means the byte before and after the match, if present, is
/// not alphanumeric and not `_` — so `i` inside `vec_dot` or `up_in` is left
/// alone.
pub fn whole_word_replace(text: &str, name: &str, value: &str) -> String {
    if name.is_empty() {
        return text.to_string();
    }
    let bytes = text.as_bytes();
    let needle = name.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.len() >= needle.len() && &rest[..needle.len()] == needle {
            let before_ok = i == 0 || !is_word_byte(bytes[i - 1]);
            let after = i + needle.len();
            let after_ok = after >= bytes.len() || !is_word_byte(bytes[after]);
            if before_ok && after_ok {
                out.push_str(value);
                i = after;
                continue;
            }
        }
        // Safe: text is valid UTF-8 and we only ever skip whole characters.
        let ch_len = utf8_char_len(bytes[i]);
        out.push_str(&text[i..i + ch_len]);
        i += ch_len;
    }
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn utf8_char_len(lead: u8) -> usize {
    if lead & 0x80 == 0 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

/// Maps a substituted integer index digit (`"0"`..`"3"`) to its component
/// letter.
fn digit_to_component(digit: &str) -> Option<&'static str> {
    Some(match digit {
        "0" => "x",
        "1" => "y",
        "2" => "z",
        "3" => "w",
        _ => return None,
    })
}

/// Rewrites every `[key]` not immediately followed by another `[` into
/// `.letter`; a `[key][…]` shape (a matrix index's row position) is left
/// untouched.
fn rewrite_index_to_dot(text: &str, key: &str, letter: &str) -> String {
    let pat = format!("[{key}]");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(pat.as_str()) {
        let (before, after_match) = rest.split_at(pos);
        out.push_str(before);
        let after = &after_match[pat.len()..];
        if after.starts_with('[') {
            out.push_str(&pat);
        } else {
            out.push('.');
            out.push_str(letter);
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

/// Applies the substitution clean-up rules for one substituted index value.
pub fn cleanup(text: &str, idx: &str) -> String {
    let mut s = match idx {
        "x" | "y" | "z" | "w" => rewrite_index_to_dot(text, idx, idx),
        _ => {
            if let Some(digit) = idx.strip_suffix(".0f").filter(|d| digit_to_component(d).is_some()) {
                let stripped = text.replace(&format!("[{digit}.0f]"), &format!("[{digit}]"));
                let letter = digit_to_component(digit).expect("checked above");
                rewrite_index_to_dot(&stripped, digit, letter)
            } else {
                text.to_string()
            }
        }
    };
    // Any remaining `.m[<n>.0f]` fragments left over from a Number-literal
    // rendering of a matrix row/column index.
    s = s.replace(".0f]", "]");
    s
}
