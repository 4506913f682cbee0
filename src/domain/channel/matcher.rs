//! Wildcard matching and expansion over channel names.

use super::name::ChannelName;
use crate::domain::foundation::WildcardError;

/// Returns true if `pattern` matches `candidate`.
///
/// Matching is asymmetric: only a wildcard pattern can match a concrete
/// name. A wildcard or empty candidate never matches, not even itself.
pub fn matches(pattern: &ChannelName, candidate: &ChannelName) -> bool {
    if candidate.is_wildcard() || candidate.is_empty() {
        return false;
    }
    if pattern == candidate {
        return true;
    }
    if !pattern.is_wildcard() {
        return false;
    }

    let Some(rest) = candidate.as_str().strip_prefix(pattern.wildcard_base()) else {
        return false;
    };
    let segment = rest.trim_matches('/');
    if segment.is_empty() {
        return false;
    }

    !segment.contains('/') || pattern.is_multi_segment()
}

/// Substitutes `segment` for the wildcard of `pattern`.
///
/// A concrete pattern with no segment expands to itself.
///
/// # Errors
///
/// - `WildcardError::MissingSegment` if `pattern` is a wildcard and no
///   (non-empty) segment was given.
/// - `WildcardError::ArityMismatch` if a segment was given for a concrete
///   pattern, or a multi-segment value for a single-segment wildcard.
pub fn wildcard_expand(
    pattern: &ChannelName,
    segment: Option<&str>,
) -> Result<ChannelName, WildcardError> {
    let segment = segment.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty());

    if !pattern.is_wildcard() {
        return match segment {
            None => Ok(pattern.clone()),
            Some(_) => Err(WildcardError::ArityMismatch),
        };
    }

    let segment = segment.ok_or(WildcardError::MissingSegment)?;
    if segment.contains('/') && !pattern.is_multi_segment() {
        return Err(WildcardError::ArityMismatch);
    }

    ChannelName::parse(&format!("{}{}", pattern.wildcard_base(), segment))
        .ok()
        .filter(|expanded| !expanded.is_wildcard())
        .ok_or(WildcardError::ArityMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> ChannelName {
        ChannelName::parse(raw).unwrap()
    }

    #[test]
    fn exact_names_match() {
        assert!(matches(&name("/foo"), &name("/foo")));
        assert!(!matches(&name("/foo/bar"), &name("/foo")));
    }

    #[test]
    fn single_wildcard_matches_one_segment() {
        assert!(matches(&name("/foo/*"), &name("/foo/bar")));
        assert!(!matches(&name("/foo/*"), &name("/foo/bar/baz")));
        assert!(!matches(&name("/foo/*"), &name("/foo")));
        assert!(!matches(&name("/foo/*"), &name("/food/bar")));
    }

    #[test]
    fn multi_wildcard_matches_many_segments() {
        assert!(matches(&name("/foo/**"), &name("/foo/bar")));
        assert!(matches(&name("/foo/**"), &name("/foo/bar/baz")));
        assert!(!matches(&name("/foo/**"), &name("/other/bar")));
    }

    #[test]
    fn root_wildcard_matches_top_level_names() {
        assert!(matches(&name("/*"), &name("/foo")));
        assert!(!matches(&name("/*"), &name("/foo/bar")));
        assert!(matches(&name("/**"), &name("/foo/bar")));
    }

    #[test]
    fn wildcard_candidates_never_match() {
        assert!(!matches(&name("/foo/*"), &name("/foo/*")));
        assert!(!matches(&name("/foo/**"), &name("/foo/*")));
        assert!(!matches(&name("/foo"), &name("/foo/*")));
    }

    #[test]
    fn empty_candidate_never_matches() {
        assert!(!matches(&name(""), &name("")));
        assert!(!matches(&name("/**"), &name("")));
    }

    #[test]
    fn expand_single_wildcard() {
        assert_eq!(
            wildcard_expand(&name("/foo/*"), Some("bar")).unwrap(),
            name("/foo/bar")
        );
    }

    #[test]
    fn expand_multi_wildcard() {
        assert_eq!(
            wildcard_expand(&name("/foo/**"), Some("bar/baz")).unwrap(),
            name("/foo/bar/baz")
        );
    }

    #[test]
    fn expand_rejects_multi_segment_for_single_wildcard() {
        assert_eq!(
            wildcard_expand(&name("/foo/*"), Some("bar/baz")),
            Err(WildcardError::ArityMismatch)
        );
    }

    #[test]
    fn expand_requires_segment_for_wildcard() {
        assert_eq!(
            wildcard_expand(&name("/foo/*"), None),
            Err(WildcardError::MissingSegment)
        );
        assert_eq!(
            wildcard_expand(&name("/foo/*"), Some("")),
            Err(WildcardError::MissingSegment)
        );
    }

    #[test]
    fn expand_concrete_pattern() {
        assert_eq!(wildcard_expand(&name("/foo"), None).unwrap(), name("/foo"));
        assert_eq!(
            wildcard_expand(&name("/foo"), Some("bar")),
            Err(WildcardError::ArityMismatch)
        );
    }

    #[test]
    fn expand_rejects_wildcard_segments() {
        assert_eq!(
            wildcard_expand(&name("/foo/*"), Some("*")),
            Err(WildcardError::ArityMismatch)
        );
    }

    #[test]
    fn expanded_name_is_matched_by_its_pattern() {
        let pattern = name("/foo/**");
        let expanded = wildcard_expand(&pattern, Some("a/b/c")).unwrap();
        assert!(matches(&pattern, &expanded));
    }
}
