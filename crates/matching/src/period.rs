//! Trailing "Month Year" extraction for external entity names.
//!
//! Zoom topics and Educativa group names carry their cohort period as a
//! suffix ("Curso de Arteterapia - Marzo 2025"). A name without that
//! suffix is not a dated cohort and is skipped by the reconciler.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::fold_diacritics;

/// Month names as they appear in source data, 1-indexed.
const MONTHS: &[(&str, u32)] = &[
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

static TRAILING_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[\s\-–—]*\b(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre)\s+(\d{4})\s*$",
    )
    .expect("month suffix pattern")
});

/// Boilerplate stripped from the head of a base name, longest first.
const PREFIXES: &[&str] = &[
    "curso de especializacion en",
    "curso de especializacion",
    "especializacion en",
    "diplomatura en",
];

/// Boilerplate stripped from the tail of a base name.
const SUFFIXES: &[&str] = &["- on demand", "on demand"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedName {
    pub base: String,
    pub month: u32,
    pub year: i32,
}

/// Parse an external name ending in "Month Year".
///
/// Returns `None` when no trailing period is present; the caller treats
/// that entity as undated and moves on.
pub fn parse_dated_name(name: &str) -> Option<DatedName> {
    let caps = TRAILING_PERIOD.captures(name)?;
    let whole = caps.get(0)?;
    let month = month_number(caps.get(1)?.as_str())?;
    let year: i32 = caps.get(2)?.as_str().parse().ok()?;

    let base = strip_boilerplate(&name[..whole.start()]);
    Some(DatedName { base, month, year })
}

fn month_number(raw: &str) -> Option<u32> {
    let folded = fold_diacritics(&raw.to_lowercase());
    MONTHS
        .iter()
        .find(|(name, _)| *name == folded)
        .map(|(_, n)| *n)
}

/// Remove known boilerplate wrapping while preserving the original
/// casing of whatever remains. Comparison happens on a folded,
/// lowercased shadow of the name; offsets are char-wise because folding
/// changes byte lengths.
fn strip_boilerplate(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let folded: Vec<char> = chars
        .iter()
        .map(|&c| crate::text::fold_char(c).to_lowercase().next().unwrap_or(c))
        .collect();

    let mut start = 0;
    let mut end = chars.len();

    while start < end && folded[start].is_whitespace() {
        start += 1;
    }
    for prefix in PREFIXES {
        let p: Vec<char> = prefix.chars().collect();
        if end - start >= p.len() && folded[start..start + p.len()] == p[..] {
            start += p.len();
            break;
        }
    }
    while start < end && folded[end - 1].is_whitespace() {
        end -= 1;
    }
    for suffix in SUFFIXES {
        let s: Vec<char> = suffix.chars().collect();
        if end - start >= s.len() && folded[end - s.len()..end] == s[..] {
            end -= s.len();
            break;
        }
    }

    chars[start..end]
        .iter()
        .collect::<String>()
        .trim_matches([' ', '-', '–', ':'])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trailing_month_and_year() {
        let dated = parse_dated_name("Curso de Arteterapia - Marzo 2025").expect("dated");
        assert_eq!(dated.base, "Curso de Arteterapia");
        assert_eq!(dated.month, 3);
        assert_eq!(dated.year, 2025);
    }

    #[test]
    fn parses_without_separator_dash() {
        let dated = parse_dated_name("Psicomotricidad Infantil Octubre 2024").expect("dated");
        assert_eq!(dated.base, "Psicomotricidad Infantil");
        assert_eq!(dated.month, 10);
        assert_eq!(dated.year, 2024);
    }

    #[test]
    fn month_is_case_and_accent_insensitive() {
        let dated = parse_dated_name("Taller de Diseño - SEPTIEMBRE 2025").expect("dated");
        assert_eq!(dated.month, 9);
        // Regional spelling variant
        let dated = parse_dated_name("Taller de Diseño - Setiembre 2025").expect("dated");
        assert_eq!(dated.month, 9);
    }

    #[test]
    fn undated_name_is_skipped() {
        assert!(parse_dated_name("Reunión de equipo").is_none());
        assert!(parse_dated_name("Curso de Arteterapia").is_none());
    }

    #[test]
    fn month_in_the_middle_does_not_count() {
        assert!(parse_dated_name("Marzo 2025 - Curso de Arteterapia").is_none());
    }

    #[test]
    fn year_alone_does_not_count() {
        assert!(parse_dated_name("Curso de Arteterapia 2025").is_none());
    }

    #[test]
    fn strips_specialization_prefix() {
        let dated =
            parse_dated_name("Curso de Especialización en Neuroeducación - Julio 2025").expect("dated");
        assert_eq!(dated.base, "Neuroeducación");
        assert_eq!(dated.month, 7);
    }

    #[test]
    fn strips_on_demand_suffix() {
        let dated =
            parse_dated_name("Curso de Especialización en Arteterapia - ON DEMAND - Abril 2025")
                .expect("dated");
        assert_eq!(dated.base, "Arteterapia");
        assert_eq!(dated.month, 4);
    }
}
