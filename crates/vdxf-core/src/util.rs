/// Lowercases ASCII code points only, leaving every code point >= 128
/// untouched.
///
/// Matches the C-locale folding the protocol uses for name normalization,
/// where locale-dependent case mappings must not apply.
pub fn to_lowercase_c_locale(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::to_lowercase_c_locale;

    #[test]
    fn folds_ascii_uppercase() {
        assert_eq!(to_lowercase_c_locale("VRSCTEST"), "vrsctest");
    }

    #[test]
    fn leaves_non_ascii_untouched() {
        assert_eq!(to_lowercase_c_locale("Ⓐ.VRSC"), "Ⓐ.vrsc");
    }

    #[test]
    fn passes_punctuation_and_digits_through() {
        assert_eq!(to_lowercase_c_locale("a-1.B_2@"), "a-1.b_2@");
    }
}
