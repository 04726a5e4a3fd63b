//! Group membership resolution.
//!
//! Three entry points, all stateless and taking the directory client explicitly:
//!
//! * [`select_from_membership`] - verify a user's group DNs against a scope, either
//!   by reading each group from the directory (extended check) or by trusting the
//!   DN and synthesizing the record from its leading RDN
//! * [`select_from_user`] - reverse lookup: search for groups naming the user via a
//!   `{USERDN}` / `{USERUID}` filter template
//! * [`resolve_user_groups`] - pick one of the above from configuration
//!
//! Per-group failures never abort resolution. A group that is out of scope, not
//! returned by the directory, rejected by the directory with an error, or whose DN
//! cannot be parsed in trusted mode is skipped and the remaining groups are still
//! resolved.
//!
//! # Example Usage
//!
//! ```rust
//! use ldap_group_membership::config::GroupSearchConfig;
//! use ldap_group_membership::directory::InMemoryDirectory;
//! use ldap_group_membership::resolver::select_from_membership;
//!
//! # async fn example() {
//! let directory = InMemoryDirectory::new();
//! let search = GroupSearchConfig::new("DC=Example,DC=Com", "(objectClass=*)")
//!     .with_extended_check(false);
//! let membership = vec!["CN=Admins,OU=Groups,DC=Example,DC=Com".to_string()];
//!
//! let groups = select_from_membership(&search, &membership, Some(&directory)).await;
//! assert_eq!(groups.attribute_values("cn"), vec!["Admins"]);
//! # }
//! ```

use crate::config::{GroupSearchConfig, ResolverConfig, USER_DN_TOKEN, USER_UID_TOKEN};
use crate::directory::{DirectoryClient, DirectoryEntry, SearchResult};
use crate::dn;
use crate::error::ResolveError;
use crate::group::GroupCollection;
use crate::mapping;
use futures::future::join_all;
use log::{debug, info, trace, warn};

/// Resolve a user's membership DNs into group records.
///
/// Returns an empty collection when `membership` or the filter is empty, or no
/// client is supplied. Otherwise each DN is checked against `search.base_dn` and
/// then either read from the directory (`extended_check`) or synthesized from its
/// leading RDN. The output preserves the order of `membership`.
///
/// Directory reads for different DNs run concurrently.
pub async fn select_from_membership<C>(
    search: &GroupSearchConfig,
    membership: &[String],
    client: Option<&C>,
) -> GroupCollection
where
    C: DirectoryClient,
{
    let mut groups = GroupCollection::new();

    let Some(client) = client else {
        debug!("No directory client supplied, nothing to resolve");
        return groups;
    };
    if membership.is_empty() || search.filter.is_empty() {
        debug!(
            "Nothing to resolve (membership entries: {}, filter empty: {})",
            membership.len(),
            search.filter.is_empty()
        );
        return groups;
    }

    let candidates: Vec<&str> = membership
        .iter()
        .map(String::as_str)
        .filter(|group_dn| {
            let matched = dn::in_scope(group_dn, &search.base_dn);
            if !matched {
                debug!(
                    "Group '{}' is outside base DN '{}', skipping",
                    group_dn, search.base_dn
                );
            }
            matched
        })
        .collect();

    let results: Vec<Option<SearchResult>> = if search.extended_check {
        join_all(
            candidates
                .iter()
                .map(|group_dn| verify_group(client, search, group_dn)),
        )
        .await
    } else {
        candidates.iter().map(|group_dn| trusted_group(group_dn)).collect()
    };

    for (group_dn, result) in candidates.iter().zip(results) {
        match result.and_then(|result| result.into_iter().next()) {
            Some(group) => {
                trace!("Resolved group '{}'", group_dn);
                groups.push(group);
            }
            None => debug!("Group '{}' could not be verified, skipping", group_dn),
        }
    }

    info!(
        "Resolved {} of {} membership entries ({} in scope, extended check: {})",
        groups.len(),
        membership.len(),
        candidates.len(),
        search.extended_check
    );
    groups
}

/// Read a group entry from the directory, treating any error as "no result".
async fn verify_group<C>(
    client: &C,
    search: &GroupSearchConfig,
    group_dn: &str,
) -> Option<SearchResult>
where
    C: DirectoryClient,
{
    match client
        .search(group_dn, &search.filter, &search.attributes)
        .await
    {
        Ok(result) => Some(result),
        Err(e) => {
            warn!("Directory search for group '{}' failed: {}", group_dn, e);
            None
        }
    }
}

/// Build a one-entry result from the group's leading RDN, without a directory call.
fn trusted_group(group_dn: &str) -> Option<SearchResult> {
    match dn::leading_rdn(group_dn) {
        Ok(rdn) => {
            let entry = DirectoryEntry::new(group_dn).with_attribute(&rdn.attribute, [rdn.value]);
            Some(SearchResult::from(vec![entry]))
        }
        Err(e) => {
            warn!("Cannot read group DN '{}' in trusted mode: {}", group_dn, e);
            None
        }
    }
}

/// Search for the groups a user belongs to.
///
/// Every `{USERDN}` in the filter is replaced by the client-escaped `user_dn` and
/// every `{USERUID}` by the client-escaped `user_uid`, then the search runs under
/// `search.base_dn`. Substitution is a single pass, so a substituted value is never
/// itself searched for tokens. Without a client the result is empty.
pub async fn select_from_user<C>(
    search: &GroupSearchConfig,
    user_dn: &str,
    user_uid: &str,
    client: Option<&C>,
) -> Result<SearchResult, C::Error>
where
    C: DirectoryClient,
{
    let Some(client) = client else {
        debug!("No directory client supplied, skipping reverse group lookup");
        return Ok(SearchResult::empty());
    };

    let filter = substitute_user_tokens(
        &search.filter,
        &client.escape_dn_for_filter(user_dn),
        &client.escape_dn_for_filter(user_uid),
    );
    debug!(
        "Reverse group lookup under '{}' with filter '{}'",
        search.base_dn, filter
    );

    client
        .search(&search.base_dn, &filter, &search.attributes)
        .await
}

fn substitute_user_tokens(template: &str, user_dn: &str, user_uid: &str) -> String {
    let replacements = [(USER_DN_TOKEN, user_dn), (USER_UID_TOKEN, user_uid)];
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let next = replacements
            .iter()
            .filter_map(|(token, value)| rest.find(token).map(|index| (index, *token, *value)))
            .min_by_key(|(index, _, _)| *index);

        match next {
            Some((index, token, value)) => {
                out.push_str(&rest[..index]);
                out.push_str(value);
                rest = &rest[index + token.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Resolve the groups of an already fetched user record.
///
/// A group filter containing `{USERDN}` or `{USERUID}` selects a reverse lookup
/// with [`select_from_user`]. Otherwise the membership list is read from the user
/// record through the `usergroup` mapping and resolved with
/// [`select_from_membership`]; a mapping that yields no membership data is an
/// error rather than an empty result.
pub async fn resolve_user_groups<C>(
    config: &ResolverConfig,
    user: &DirectoryEntry,
    user_uid: &str,
    client: Option<&C>,
) -> Result<GroupCollection, ResolveError<C::Error>>
where
    C: DirectoryClient,
{
    let search = &config.groups;

    if search.is_reverse_lookup() {
        let result = select_from_user(search, user.dn(), user_uid, client)
            .await
            .map_err(ResolveError::Directory)?;
        return Ok(result.into());
    }

    let membership = mapping::membership(user, &config.mapping)?;
    Ok(select_from_membership(search, membership, client).await)
}
