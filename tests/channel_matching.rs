//! Property tests for channel wildcard matching and expansion.

use proptest::prelude::*;

use faye_client::domain::channel::{matches, wildcard_expand, ChannelName};
use faye_client::domain::foundation::WildcardError;

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,8}"
}

fn segments(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..=max)
}

fn concrete(segments: &[String]) -> ChannelName {
    ChannelName::parse(&format!("/{}", segments.join("/"))).unwrap()
}

fn any_name() -> impl Strategy<Value = ChannelName> {
    (segments(4), prop_oneof![Just(""), Just("/*"), Just("/**")])
        .prop_map(|(segments, suffix)| {
            ChannelName::parse(&format!("/{}{}", segments.join("/"), suffix)).unwrap()
        })
}

proptest! {
    #[test]
    fn concrete_names_match_themselves(parts in segments(5)) {
        let name = concrete(&parts);
        prop_assert!(matches(&name, &name));
    }

    #[test]
    fn normalization_is_idempotent(parts in segments(5)) {
        let raw = format!("//{}/", parts.join("//"));
        let once = ChannelName::parse(&raw).unwrap();
        let twice = ChannelName::parse(once.as_str()).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.as_str(), format!("/{}", parts.join("/")));
    }

    #[test]
    fn wildcard_candidates_never_match(pattern in any_name(), candidate in any_name()) {
        prop_assume!(candidate.is_wildcard());
        prop_assert!(!matches(&pattern, &candidate));
    }

    #[test]
    fn distinct_concrete_names_never_match(a in segments(4), b in segments(4)) {
        prop_assume!(a != b);
        prop_assert!(!matches(&concrete(&a), &concrete(&b)));
    }

    #[test]
    fn single_wildcard_matches_one_more_segment(base in segments(3), tail in segment()) {
        let pattern = ChannelName::parse(&format!("/{}/*", base.join("/"))).unwrap();
        let expanded = wildcard_expand(&pattern, Some(&tail)).unwrap();

        prop_assert_eq!(expanded.as_str(), format!("/{}/{}", base.join("/"), tail));
        prop_assert!(matches(&pattern, &expanded));
    }

    #[test]
    fn single_wildcard_rejects_deeper_names(base in segments(3), tail in segments(3)) {
        prop_assume!(tail.len() > 1);
        let pattern = ChannelName::parse(&format!("/{}/*", base.join("/"))).unwrap();
        let mut all = base.clone();
        all.extend(tail.iter().cloned());

        prop_assert!(!matches(&pattern, &concrete(&all)));
        prop_assert_eq!(
            wildcard_expand(&pattern, Some(&tail.join("/"))),
            Err(WildcardError::ArityMismatch)
        );
    }

    #[test]
    fn multi_wildcard_matches_any_depth(base in segments(3), tail in segments(3)) {
        let pattern = ChannelName::parse(&format!("/{}/**", base.join("/"))).unwrap();
        let expanded = wildcard_expand(&pattern, Some(&tail.join("/"))).unwrap();

        prop_assert!(!expanded.is_wildcard());
        prop_assert!(matches(&pattern, &expanded));
    }

    #[test]
    fn wildcards_never_match_their_own_base(base in segments(3)) {
        let single = ChannelName::parse(&format!("/{}/*", base.join("/"))).unwrap();
        let multi = ChannelName::parse(&format!("/{}/**", base.join("/"))).unwrap();
        let base = concrete(&base);

        prop_assert!(!matches(&single, &base));
        prop_assert!(!matches(&multi, &base));
    }

    #[test]
    fn expanding_without_segment_fails_for_wildcards(pattern in any_name()) {
        let result = wildcard_expand(&pattern, None);
        if pattern.is_wildcard() {
            prop_assert_eq!(result, Err(WildcardError::MissingSegment));
        } else {
            prop_assert_eq!(result, Ok(pattern));
        }
    }
}

#[test]
fn reference_table() {
    let name = |raw: &str| ChannelName::parse(raw).unwrap();

    assert!(matches(&name("/foo"), &name("/foo")));
    assert!(!matches(&name("/foo/bar"), &name("/foo")));
    assert!(matches(&name("/foo/*"), &name("/foo/bar")));
    assert!(!matches(&name("/foo/*"), &name("/foo/bar/baz")));
    assert!(matches(&name("/foo/**"), &name("/foo/bar/baz")));

    assert_eq!(
        wildcard_expand(&name("/foo/*"), Some("bar")).unwrap(),
        name("/foo/bar")
    );
    assert_eq!(
        wildcard_expand(&name("/foo/**"), Some("bar/baz")).unwrap(),
        name("/foo/bar/baz")
    );
    assert_eq!(
        wildcard_expand(&name("/foo/*"), Some("bar/baz")),
        Err(WildcardError::ArityMismatch)
    );
    assert_eq!(
        wildcard_expand(&name("/foo/*"), None),
        Err(WildcardError::MissingSegment)
    );
}
