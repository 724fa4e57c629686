/// Returns `true` if `haystack` contains `needle`, ignoring case.
///
/// An empty `needle` matches everything.
///
/// # Examples
///
/// ```
/// use ri_utils::contains_ignore_case;
///
/// assert!(contains_ignore_case("localPosition", "POS"));
/// assert!(contains_ignore_case("anything", ""));
/// assert!(!contains_ignore_case("rotation", "scale"));
/// ```
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.is_ascii() && haystack.is_ascii() {
        return haystack
            .as_bytes()
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle.as_bytes()));
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::contains_ignore_case;

    #[test]
    fn unicode_fallback() {
        assert!(contains_ignore_case("Größe", "GRÖ"));
        assert!(!contains_ignore_case("ab", "abc"));
    }
}
