//! Character-level classification used by the lexer: subscript/superscript
//! rewriting and the lowercase-Greek identifier-start rule.

/// Maps a single subscript code point to its rewritten ASCII text, per the
/// subscript table (`ᵢ→i, ⱼ→j, ₖ→k, ₗ→l, ₘ→m, ₙ→n, ₀–₄→0–4`).
pub fn subscript_ascii(c: char) -> Option<&'static str> {
    Some(match c {
        'ᵢ' => "i",
        'ⱼ' => "j",
        'ₖ' => "k",
        'ₗ' => "l",
        'ₘ' => "m",
        'ₙ' => "n",
        '₀' => "0",
        '₁' => "1",
        '₂' => "2",
        '₃' => "3",
        '₄' => "4",
        _ => return None,
    })
}

/// Maps a single superscript code point to its rewritten ASCII text, per
/// the superscript table (`⁰–⁵→0–5, ˣ→x`).
pub fn superscript_ascii(c: char) -> Option<&'static str> {
    Some(match c {
        '⁰' => "0",
        '¹' => "1",
        '²' => "2",
        '³' => "3",
        '⁴' => "4",
        '⁵' => "5",
        'ˣ' => "x",
        _ => return None,
    })
}

/// Whether `c` is a lowercase Greek letter (α–ω), which the lexer accepts
/// as an identifier-start character alongside ASCII letters and `_`.
pub fn is_lowercase_greek(c: char) -> bool {
    ('α'..='ω').contains(&c)
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || is_lowercase_greek(c)
}
