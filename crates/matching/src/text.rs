//! Name tokenization for topic matching.
//!
//! Source names truncate and extend words inconsistently, so matching
//! works on folded tokens rather than whole strings.

/// Filler words that carry no signal in course names. Tokens of two
/// characters or fewer are dropped before this list is consulted.
const STOP_WORDS: &[&str] = &[
    "del", "las", "los", "con", "para", "por", "una", "uno", "curso", "cursos", "taller",
    "demand",
];

/// Replace one Spanish accented character with its base letter.
pub fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'Ñ' => 'N',
        other => other,
    }
}

/// Replace Spanish accented characters with their base letter.
pub fn fold_diacritics(input: &str) -> String {
    input.chars().map(fold_char).collect()
}

/// Split a name into comparable tokens: lowercase, punctuation stripped,
/// tokens of two characters or fewer and stop-words dropped, diacritics
/// folded on each surviving token.
pub fn tokenize(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 2)
        .filter(|t| !STOP_WORDS.contains(t))
        .map(fold_diacritics)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_spanish_accents() {
        assert_eq!(fold_diacritics("Especialización"), "Especializacion");
        assert_eq!(fold_diacritics("diseño"), "diseno");
        assert_eq!(fold_diacritics("PEDAGOGÍA"), "PEDAGOGIA");
    }

    #[test]
    fn tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(
            tokenize("Arteterapia: Teoría y Práctica"),
            vec!["arteterapia", "teoria", "practica"]
        );
    }

    #[test]
    fn tokenize_drops_short_tokens_and_stop_words() {
        // "de" is short, "del"/"curso" are stop-words
        assert_eq!(tokenize("Curso del Juego de Rol"), vec!["juego", "rol"]);
    }

    #[test]
    fn tokenize_drops_stop_words() {
        assert_eq!(tokenize("Curso de Psicomotricidad"), vec!["psicomotricidad"]);
    }

    #[test]
    fn tokenize_empty_for_filler_only_name() {
        assert!(tokenize("el de la y").is_empty());
    }

    #[test]
    fn tokenize_keeps_numbers() {
        assert_eq!(tokenize("Nivel 101 Avanzado"), vec!["101", "avanzado"]);
    }
}
