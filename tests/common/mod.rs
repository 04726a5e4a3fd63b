//! Common test utilities for group membership testing.
//!
//! Provides a sample directory tree, a recording directory client that can be told
//! to fail or stall for particular DNs, and logging setup.


use ldap_group_membership::directory::{
    DirectoryClient, DirectoryEntry, InMemoryDirectory, SearchResult, escape_filter_value,
};
use ldap_group_membership::error::DirectoryError;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Install `env_logger` once so `RUST_LOG=debug cargo test` shows resolver logs.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One recorded `search` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub base: String,
    pub filter: String,
    pub attributes: Vec<String>,
}

/// Directory client double wrapping an [`InMemoryDirectory`].
///
/// Records every search and escape, fails searches whose base is listed in
/// `failing`, and delays searches whose base is listed in `delays`.
#[derive(Debug, Clone, Default)]
pub struct RecordingDirectory {
    inner: InMemoryDirectory,
    failing: Vec<String>,
    delays: Vec<(String, Duration)>,
    calls: Arc<Mutex<Vec<SearchCall>>>,
    escaped: Arc<Mutex<Vec<String>>>,
}

impl RecordingDirectory {
    pub fn new(inner: InMemoryDirectory) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Make searches based at `dn` fail.
    pub fn failing_on(mut self, dn: &str) -> Self {
        self.failing.push(dn.to_lowercase());
        self
    }

    /// Make searches based at `dn` complete after `delay`.
    pub fn delayed_on(mut self, dn: &str, delay: Duration) -> Self {
        self.delays.push((dn.to_lowercase(), delay));
        self
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn escaped_values(&self) -> Vec<String> {
        self.escaped.lock().unwrap().clone()
    }
}

impl DirectoryClient for RecordingDirectory {
    type Error = DirectoryError;

    async fn search(
        &self,
        base: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<SearchResult, Self::Error> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.push(SearchCall {
                base: base.to_string(),
                filter: filter.to_string(),
                attributes: attributes.to_vec(),
            });
        }

        let key = base.to_lowercase();
        let delay = self
            .delays
            .iter()
            .find(|(dn, _)| *dn == key)
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&key) {
            return Err(DirectoryError::unavailable(format!("search on {base} refused")));
        }
        self.inner.search(base, filter, attributes).await
    }

    fn escape_dn_for_filter(&self, value: &str) -> String {
        self.escaped.lock().unwrap().push(value.to_string());
        escape_filter_value(value)
    }
}

/// Sample tree: three `groupOfNames` groups and one `posixGroup` under
/// `ou=groups,dc=example,dc=com`, a group in a foreign tree, and two users.
pub fn sample_directory() -> InMemoryDirectory {
    InMemoryDirectory::with_entries(vec![
        DirectoryEntry::new("dc=example,dc=com").with_attribute("objectClass", ["domain"]),
        DirectoryEntry::new("ou=groups,dc=example,dc=com")
            .with_attribute("objectClass", ["organizationalUnit"]),
        group_of_names(
            "admins",
            "Administrators",
            &[fixtures::JDOE_DN, fixtures::JPAREN_DN],
        ),
        group_of_names("staff", "All staff", &[fixtures::JDOE_DN, fixtures::ANN_DN]),
        group_of_names("developers", "Developers", &[fixtures::ANN_DN]),
        DirectoryEntry::new("cn=printers,ou=groups,dc=example,dc=com")
            .with_attribute("objectClass", ["posixGroup"])
            .with_attribute("cn", ["printers"])
            .with_attribute("gidNumber", ["5001"])
            .with_attribute("memberUid", ["jdoe"]),
        DirectoryEntry::new("cn=admins,ou=groups,dc=other,dc=org")
            .with_attribute("objectClass", ["groupOfNames"])
            .with_attribute("cn", ["admins"]),
        DirectoryEntry::new(fixtures::JDOE_DN)
            .with_attribute("objectClass", ["inetOrgPerson"])
            .with_attribute("uid", ["jdoe"])
            .with_attribute(
                "memberOf",
                [
                    fixtures::STAFF_DN,
                    fixtures::ADMINS_DN,
                    "cn=admins,ou=groups,dc=other,dc=org",
                ],
            ),
        DirectoryEntry::new(fixtures::ANN_DN)
            .with_attribute("objectClass", ["inetOrgPerson"])
            .with_attribute("uid", ["ann"]),
    ])
}

fn group_of_names(cn: &str, description: &str, members: &[&str]) -> DirectoryEntry {
    DirectoryEntry::new(format!("cn={cn},ou=groups,dc=example,dc=com"))
        .with_attribute("objectClass", ["top", "groupOfNames"])
        .with_attribute("cn", [cn])
        .with_attribute("description", [description])
        .with_attribute("member", members.iter().copied())
}

/// Membership list as owned strings.
pub fn membership(dns: &[&str]) -> Vec<String> {
    dns.iter().map(|dn| dn.to_string()).collect()
}
