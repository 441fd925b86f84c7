//! Label normalization for matching Spanish free-text names
//!
//! Budget categories and EEFF concepts are hand-typed with inconsistent
//! casing, accents, and punctuation. Both sides of every comparison go
//! through `normalize` first.

/// Normalize a label: lowercase, fold Spanish diacritics, collapse
/// non-alphanumeric runs to a single space, trim.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = true;

    for c in s.to_lowercase().chars() {
        let c = fold_diacritic(c);
        if c.is_alphanumeric() {
            out.push(c);
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }

    while out.ends_with(' ') {
        out.pop();
    }
    out
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accents_and_case() {
        assert_eq!(normalize("AGROQUÍMICOS"), normalize("agroquimicos"));
        assert_eq!(normalize("Fertilización"), "fertilizacion");
        assert_eq!(normalize("AÑO"), "ano");
    }

    #[test]
    fn test_normalize_punctuation_runs() {
        assert_eq!(normalize("AGROQUIMICOS & FOLIAR"), "agroquimicos foliar");
        assert_eq!(normalize("  Mano de Obra -- Directa  "), "mano de obra directa");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  ---  "), "");
    }
}
