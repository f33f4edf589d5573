//! Character-set helpers used by the validation pipeline

/// Whether the value contains any character outside ASCII
pub fn has_unicode(value: &str) -> bool {
    !value.is_ascii()
}

/// Length in Unicode scalar values
pub fn scalar_len(value: &str) -> usize {
    value.chars().count()
}

/// Characters of `required`, in their order, that never occur in `value`
///
/// Each missing character is reported once.
pub fn missing_chars(value: &str, required: &str) -> Vec<char> {
    let mut missing = Vec::new();
    for c in required.chars() {
        if !value.contains(c) && !missing.contains(&c) {
            missing.push(c);
        }
    }
    missing
}

/// Characters of `value`, in order of first occurrence, that also occur in `set`
pub fn shared_chars(value: &str, set: &str) -> Vec<char> {
    let mut shared = Vec::new();
    for c in value.chars() {
        if set.contains(c) && !shared.contains(&c) {
            shared.push(c);
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_unicode() {
        assert!(!has_unicode("plain ascii ~!"));
        assert!(!has_unicode(""));
        assert!(has_unicode("caf\u{e9}"));
        assert!(has_unicode("\u{1F600}"));
    }

    #[test]
    fn test_scalar_len_counts_chars_not_bytes() {
        assert_eq!(scalar_len("abc"), 3);
        assert_eq!(scalar_len("caf\u{e9}"), 4);
        assert_eq!(scalar_len("\u{1F600}"), 1);
    }

    #[test]
    fn test_missing_chars_keeps_required_order() {
        assert_eq!(missing_chars("xab", "abc"), vec!['c']);
        assert_eq!(missing_chars("", "cba"), vec!['c', 'b', 'a']);
        assert_eq!(missing_chars("abc", "abc"), Vec::<char>::new());
        assert_eq!(missing_chars("a", "bb"), vec!['b']);
    }

    #[test]
    fn test_shared_chars_keeps_value_order() {
        assert_eq!(shared_chars("helloz", "xyz"), vec!['z']);
        assert_eq!(shared_chars("zyzy", "yz"), vec!['z', 'y']);
        assert!(shared_chars("hello", "xyz").is_empty());
    }
}
