//! Label normalization shared by the enum parsers

/// Normalize a free-form label for enum matching.
///
/// Lowercases, turns `&` into `and`, treats any other punctuation as a
/// separator and collapses whitespace, so `"Industrial Products & Services"`
/// and `"industrial-products and services "` compare equal.
pub(crate) fn normalize_label(raw: &str) -> String {
    let mut spaced = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        if c == '&' {
            spaced.push_str(" and ");
        } else if c.is_alphanumeric() {
            spaced.extend(c.to_lowercase());
        } else {
            spaced.push(' ');
        }
    }
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(
            normalize_label("Industrial Products & Services"),
            "industrial products and services"
        );
        assert_eq!(normalize_label("  E-Commerce "), "e commerce");
        assert_eq!(normalize_label("HEALTH_CARE"), "health care");
        assert_eq!(normalize_label(""), "");
    }
}
