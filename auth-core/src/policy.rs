use crate::model::{Capability, PolicyDoc};

/// `true` iff some doc in `policies` matches `path` and grants `capability`
/// (design spec §4.6). Empty `path` or an implicit empty capability set
/// always denies, regardless of policy content.
pub fn is_allowed(policies: &[PolicyDoc], path: &str, capability: Capability) -> bool {
    if path.is_empty() {
        return false;
    }
    policies
        .iter()
        .any(|doc| doc.capabilities.contains(&capability) && path_matches(&doc.path, path))
}

/// Path matching, evaluated in the order the four forms are listed in
/// §4.6: wildcard-all, exact, greedy-prefix, then segment wildcards.
fn path_matches(policy_path: &str, request_path: &str) -> bool {
    if policy_path == "*" {
        return !request_path.is_empty();
    }

    if policy_path == request_path {
        return true;
    }

    if let Some(prefix) = policy_path.strip_suffix("/*") {
        return request_path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'));
    }

    if policy_path.contains('*') {
        let policy_segments: Vec<&str> = policy_path.split('/').collect();
        let request_segments: Vec<&str> = request_path.split('/').collect();
        if policy_segments.len() != request_segments.len() {
            return false;
        }
        return policy_segments
            .iter()
            .zip(request_segments.iter())
            .all(|(p, r)| *p == "*" || p == r);
    }

    false
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn doc(path: &str) -> PolicyDoc {
        PolicyDoc::new(path, [Capability::Read])
    }

    #[test]
    fn empty_path_always_denies() {
        assert!(!is_allowed(&[doc("*")], "", Capability::Read));
    }

    #[test]
    fn wildcard_all_matches_any_nonempty_path() {
        assert!(is_allowed(&[doc("*")], "anything/x", Capability::Read));
    }

    #[test]
    fn greedy_prefix_examples() {
        assert!(is_allowed(&[doc("secret/*")], "secret/a/b/c", Capability::Read));
        assert!(!is_allowed(&[doc("secret/*")], "secret", Capability::Read));
        assert!(is_allowed(&[doc("secret/*")], "secret/", Capability::Read));
    }

    #[test]
    fn internal_wildcard_segments_require_equal_segment_count() {
        assert!(is_allowed(
            &[doc("/v1/keys/*/rotate")],
            "/v1/keys/payment/rotate",
            Capability::Read
        ));
        assert!(!is_allowed(
            &[doc("/v1/keys/*/rotate")],
            "/v1/keys/rotate",
            Capability::Read
        ));
    }

    #[test]
    fn multiple_internal_wildcards() {
        assert!(is_allowed(
            &[doc("/v1/*/keys/*/rotate")],
            "/v1/transit/keys/payment/rotate",
            Capability::Read
        ));
    }

    #[test]
    fn exact_match_requires_equality() {
        assert!(is_allowed(&[doc("secret/a")], "secret/a", Capability::Read));
        assert!(!is_allowed(&[doc("secret/a")], "secret/b", Capability::Read));
    }

    #[test]
    fn missing_capability_denies_even_on_path_match() {
        assert!(!is_allowed(&[doc("*")], "anything", Capability::Write));
    }

    #[test]
    fn first_matching_doc_with_capability_wins() {
        let policies = vec![
            PolicyDoc::new("secret/a", [Capability::Read]),
            PolicyDoc::new("secret/*", [Capability::Write]),
        ];
        assert!(is_allowed(&policies, "secret/a", Capability::Read));
        assert!(is_allowed(&policies, "secret/a", Capability::Write));
    }

    fn capability_strategy() -> impl Strategy<Value = Capability> {
        prop_oneof![Just(Capability::Read), Just(Capability::Write)]
    }

    proptest! {
        #[test]
        fn empty_path_never_allowed(capability in capability_strategy(), segments in "[a-z]{0,8}(/[a-z]{1,8}){0,3}") {
            let policies = vec![doc("*")];
            prop_assert!(!is_allowed(&policies, "", capability));
            // a non-empty generated path against a wildcard-all doc is always allowed
            if !segments.is_empty() {
                prop_assert!(is_allowed(&policies, &segments, capability));
            }
        }

        #[test]
        fn exact_match_is_reflexive(path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
            let policies = vec![doc(&path)];
            prop_assert!(is_allowed(&policies, &path, Capability::Read));
        }
    }
}
