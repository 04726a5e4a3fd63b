//! Configuration-driven resolution of a fetched user record.

use crate::common::fixtures::*;
use crate::common::{RecordingDirectory, init_logging, sample_directory};
use ldap_group_membership::config::ResolverConfig;
use ldap_group_membership::directory::{DirectoryEntry, InMemoryDirectory};
use ldap_group_membership::error::{MappingError, ResolveError};
use ldap_group_membership::mapping::{MappingConfig, membership};
use ldap_group_membership::resolver::resolve_user_groups;

async fn fetch_user(directory: &InMemoryDirectory, dn: &str) -> DirectoryEntry {
    directory.get(dn).await.expect("user fixture")
}

#[tokio::test]
async fn member_of_mapping_drives_membership_resolution() {
    init_logging();
    let directory = sample_directory();
    let config = ResolverConfig::from_json(MEMBER_OF_CONFIG).unwrap();
    let user = fetch_user(&directory, JDOE_DN).await;

    let groups = resolve_user_groups(&config, &user, "jdoe", Some(&directory))
        .await
        .unwrap();

    // memberOf order is staff, admins, then a group outside the configured scope.
    assert_eq!(groups.dns(), vec![STAFF_DN, ADMINS_DN]);
    assert_eq!(
        groups.attribute_values("description"),
        vec!["All staff", "Administrators"]
    );
}

#[tokio::test]
async fn mapping_failure_is_an_error_not_an_empty_result() {
    init_logging();
    let directory = sample_directory();
    let mut config = ResolverConfig::from_json(MEMBER_OF_CONFIG).unwrap();
    let user = fetch_user(&directory, ANN_DN).await;

    let err = resolve_user_groups(&config, &user, "ann", Some(&directory))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Mapping(MappingError::AttributeNotFound { ref attribute })
            if attribute == "memberof"
    ));

    config.mapping = MappingConfig::new().with_field("usergroup", "memberOf");
    let err = resolve_user_groups(&config, &user, "ann", Some(&directory))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Mapping(MappingError::NoAttributeReference { .. })
    ));
}

#[tokio::test]
async fn reverse_lookup_filter_bypasses_the_mapping() {
    init_logging();
    let directory = RecordingDirectory::new(sample_directory());
    let config = ResolverConfig::from_json(REVERSE_LOOKUP_CONFIG).unwrap();
    let user = DirectoryEntry::new(ANN_DN);

    let groups = resolve_user_groups(&config, &user, "ann", Some(&directory))
        .await
        .unwrap();

    assert_eq!(groups.dns(), vec![STAFF_DN, DEVELOPERS_DN]);
    assert_eq!(directory.calls().len(), 1);
}

#[tokio::test]
async fn reverse_lookup_surfaces_directory_errors() {
    init_logging();
    let directory = RecordingDirectory::new(sample_directory()).failing_on(GROUPS_DN);
    let config = ResolverConfig::from_json(REVERSE_LOOKUP_CONFIG).unwrap();
    let user = DirectoryEntry::new(ANN_DN);

    let err = resolve_user_groups(&config, &user, "ann", Some(&directory))
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::Directory(_)));
}

#[tokio::test]
async fn trusted_pipeline_needs_no_directory_round_trips() {
    init_logging();
    let directory = RecordingDirectory::new(sample_directory());
    let mut config = ResolverConfig::from_json(MEMBER_OF_CONFIG).unwrap();
    config.groups.extended_check = false;
    let user = fetch_user(&sample_directory(), JDOE_DN).await;

    let groups = resolve_user_groups(&config, &user, "jdoe", Some(&directory))
        .await
        .unwrap();

    assert_eq!(groups.attribute_values("cn"), vec!["staff", "admins"]);
    assert!(directory.calls().is_empty());
}

#[tokio::test]
async fn extracted_membership_matches_the_user_attribute() {
    let directory = sample_directory();
    let config = ResolverConfig::from_json(MEMBER_OF_CONFIG).unwrap();
    let user = fetch_user(&directory, JDOE_DN).await;

    let dns = membership(&user, &config.mapping).unwrap();

    assert_eq!(dns, [STAFF_DN, ADMINS_DN, FOREIGN_ADMINS_DN]);
}
