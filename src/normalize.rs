//! Header text canonicalisation used before any column comparison.

/// Maps Turkish letters to their unaccented base letter. Applied before
/// lowercasing so that `İ` does not decompose into `i` plus a combining dot.
fn fold_turkish(ch: char) -> char {
    match ch {
        'İ' | 'ı' => 'i',
        'Ş' | 'ş' => 's',
        'Ğ' | 'ğ' => 'g',
        'Ç' | 'ç' => 'c',
        'Ö' | 'ö' => 'o',
        'Ü' | 'ü' => 'u',
        other => other,
    }
}

/// Produces the canonical comparison form of a header or cell value.
///
/// The result only contains lowercase ASCII letters, digits and single
/// spaces, with no leading or trailing whitespace. Non-breaking and other
/// Unicode spaces count as spaces, `_` and `-` act as word separators, and
/// every other character is dropped. The function is idempotent.
pub fn normalize_text(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for ch in raw.chars().map(fold_turkish) {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            folded.push(' ');
        } else {
            folded.extend(ch.to_lowercase());
        }
    }

    folded
        .split(' ')
        .map(|word| {
            word.chars()
                .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
