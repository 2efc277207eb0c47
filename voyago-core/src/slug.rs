use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Used when a name reduces to nothing slug-worthy.
pub const SLUG_FALLBACK: &str = "tour";

/// Build a URL-safe slug from a display name, optionally suffixed with the
/// row id. Deterministic: same inputs always yield the same slug.
pub fn generate_slug(name: &str, id: Option<i64>) -> String {
    // NFD splits accented letters into base char + combining marks, which we
    // drop. Vietnamese đ/Đ (U+0111/U+0110) has no canonical decomposition and
    // needs an explicit mapping.
    let decomposed: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'đ' | 'Đ' => 'd',
            other => other,
        })
        .collect();

    let mut cleaned = String::with_capacity(decomposed.len());
    for c in decomposed.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == ' ' || c == '-' {
            cleaned.push(c);
        }
    }

    // Splitting on both spaces and hyphens collapses runs and trims edges in
    // one pass.
    let base = cleaned
        .split(|c: char| c == ' ' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let base = if base.is_empty() {
        SLUG_FALLBACK.to_string()
    } else {
        base
    };

    match id {
        Some(id) => format!("{}-{}", base, id),
        None => base,
    }
}

/// Disambiguate a slug that is already taken by another row. The suffix is a
/// base-36 millisecond timestamp; the slug column's UNIQUE constraint remains
/// the authoritative guard.
pub fn with_unique_suffix(base: &str, timestamp_millis: i64) -> String {
    format!("{}-{}", base, base36(timestamp_millis.max(0) as u64))
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out.iter().rev().collect()
}
