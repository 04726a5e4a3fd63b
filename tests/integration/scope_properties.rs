//! Property-based tests for scope matching and resolution ordering.
//!
//! Uses proptest over ASCII DN-like strings; async resolution is driven with
//! `tokio_test::block_on`.

use ldap_group_membership::config::GroupSearchConfig;
use ldap_group_membership::directory::InMemoryDirectory;
use ldap_group_membership::dn::in_scope;
use ldap_group_membership::resolver::select_from_membership;
use proptest::prelude::*;

fn dn_fragment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9=, ]{0,24}"
}

fn group_dn() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", prop_oneof![Just("dc=example,dc=com"), Just("DC=Other,DC=Org")])
        .prop_map(|(cn, suffix)| format!("cn={cn},ou=groups,{suffix}"))
}

proptest! {
    #[test]
    fn empty_base_matches_any_dn(candidate in dn_fragment()) {
        prop_assert!(in_scope(&candidate, ""));
    }

    #[test]
    fn suffix_matches_regardless_of_case(prefix in dn_fragment(), base in "[a-z=,]{1,20}") {
        let candidate = format!("{prefix}{base}");
        prop_assert!(in_scope(&candidate, &base.to_uppercase()));
        prop_assert!(in_scope(&candidate.to_uppercase(), &base));
    }

    #[test]
    fn base_longer_than_candidate_never_matches(candidate in dn_fragment(), extra in "[a-z]{1,8}") {
        let base = format!("{extra}{candidate}");
        prop_assert!(!in_scope(&candidate, &base));
    }

    #[test]
    fn trusted_resolution_preserves_order_of_in_scope_groups(
        dns in prop::collection::vec(group_dn(), 0..12)
    ) {
        let search = GroupSearchConfig::new("dc=example,dc=com", "(objectClass=*)")
            .with_extended_check(false);
        let directory = InMemoryDirectory::new();

        let groups = tokio_test::block_on(select_from_membership(&search, &dns, Some(&directory)));

        let expected: Vec<&str> = dns
            .iter()
            .map(String::as_str)
            .filter(|dn| dn.ends_with("dc=example,dc=com"))
            .collect();
        prop_assert_eq!(groups.dns(), expected);
    }
}
