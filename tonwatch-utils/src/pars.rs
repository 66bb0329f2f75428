/// Returns the substring between the first occurrence of `start` and the
/// first occurrence of `end` after it. With no `end` (or when `end` does not
/// occur) the rest of the text is returned. `None` means `start` was not
/// found; many fields are optional in valid lite-client output, so absence
/// is a normal outcome rather than an error.
pub fn pars<'a>(text: &'a str, start: &str, end: Option<&str>) -> Option<&'a str> {
    let at = text.find(start)?;
    let rest = &text[at + start.len()..];
    match end.and_then(|e| rest.find(e)) {
        Some(stop) => Some(&rest[..stop]),
        None => Some(rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pars_with_end_marker() {
        assert_eq!(pars("a:1 b:2", "a:", Some(" ")), Some("1"));
        assert_eq!(pars("a:1 b:2", "b:", Some(" ")), Some("2"));
    }

    #[test]
    fn test_pars_without_end_marker() {
        assert_eq!(pars("a:1 b:2", "b:", None), Some("2"));
        assert_eq!(pars("key=value", "key=", None), Some("value"));
    }

    #[test]
    fn test_pars_end_marker_missing() {
        // no end marker occurrence: rest of text
        assert_eq!(pars("a:12", "a:", Some(" ")), Some("12"));
    }

    #[test]
    fn test_pars_start_not_found() {
        assert_eq!(pars("x", "y", None), None);
        assert_eq!(pars("", "y", Some(" ")), None);
    }

    #[test]
    fn test_pars_uses_first_occurrence() {
        assert_eq!(pars("k:1 k:2", "k:", Some(" ")), Some("1"));
    }
}
