//! Common test utilities and fixtures.
//!
//! [`MemoryDirectory`] is an in-memory [`DirectoryClient`] that evaluates
//! filters against a fixed set of entries, applies modifications and
//! counts searches so tests can observe cache behaviour.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ad_directory::entity::split_rdn;
use ad_directory::{
    Directory, DirectoryClient, DirectoryError, DirectoryResult, DirectorySettings, Filter,
    ModOp, Modification, OperationResult, RawEntry, WireValue,
};
use parking_lot::Mutex;

/// Search base of the fixture directory.
pub const BASE: &str = "dc=example,dc=org";

pub const JHUNT: &str = "cn=James Hunt,ou=Staff,dc=example,dc=org";
pub const ASMITH: &str = "cn=Anna Smith,ou=Staff,dc=example,dc=org";
pub const BNESTED: &str = "cn=Ben Nested,ou=Contractors,dc=example,dc=org";
pub const PC01: &str = "cn=PC01,ou=Computers,dc=example,dc=org";

pub const STAFF: &str = "cn=Staff,ou=Groups,dc=example,dc=org";
pub const ENGINEERING: &str = "cn=Engineering,ou=Groups,dc=example,dc=org";
pub const PLATFORM: &str = "cn=Platform,ou=Groups,dc=example,dc=org";
pub const CYCLE_A: &str = "cn=Cycle A,ou=Groups,dc=example,dc=org";
pub const CYCLE_B: &str = "cn=Cycle B,ou=Groups,dc=example,dc=org";

/// Password accepted by `bind_as` for every account.
pub const PASSWORD: &str = "Correct-Horse-1";

/// In-memory directory client.
#[derive(Default)]
pub struct MemoryDirectory {
    entries: Mutex<Vec<RawEntry>>,
    searches: AtomicUsize,
    unreachable: bool,
    read_only: Vec<String>,
    modifications: Mutex<Vec<(String, Vec<Modification>)>>,
    renames: Mutex<Vec<(String, String)>>,
    last_result: Mutex<OperationResult>,
}

impl MemoryDirectory {
    /// Creates a directory holding `entries`.
    pub fn new(entries: Vec<RawEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    /// Creates a directory that refuses to bind.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Rejects modifications of `dn` with `insufficientAccessRights`.
    pub fn read_only(mut self, dn: &str) -> Self {
        self.read_only.push(dn.to_ascii_lowercase());
        self
    }

    /// Returns how many searches have been issued.
    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    /// Returns the recorded modifications.
    pub fn modifications(&self) -> Vec<(String, Vec<Modification>)> {
        self.modifications.lock().clone()
    }

    /// Returns the recorded renames as `(old dn, new rdn)`.
    pub fn renames(&self) -> Vec<(String, String)> {
        self.renames.lock().clone()
    }

    fn fail(&self, code: u32, message: &str) -> DirectoryError {
        *self.last_result.lock() = OperationResult {
            code,
            message: message.to_string(),
        };
        DirectoryError::operation(code, message)
    }

    fn succeed(&self) {
        *self.last_result.lock() = OperationResult::success();
    }
}

impl DirectoryClient for MemoryDirectory {
    fn bind(&self) -> DirectoryResult<()> {
        if self.unreachable {
            return Err(DirectoryError::client("connection refused"));
        }
        Ok(())
    }

    fn search(&self, filter: &Filter, base: &str) -> DirectoryResult<Vec<RawEntry>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.succeed();

        let base = base.to_ascii_lowercase();
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|entry| entry.dn.to_ascii_lowercase().ends_with(&base))
            .filter(|entry| matches(filter, entry))
            .cloned()
            .collect())
    }

    fn modify(&self, dn: &str, modifications: &[Modification]) -> DirectoryResult<()> {
        if self.read_only.contains(&dn.to_ascii_lowercase()) {
            return Err(self.fail(50, "insufficient access rights"));
        }

        let mut entries = self.entries.lock();
        let entry = entries
            .iter_mut()
            .find(|entry| entry.dn.eq_ignore_ascii_case(dn))
            .ok_or_else(|| self.fail(32, "no such object"))?;

        for modification in modifications {
            let name = modification.attribute.to_ascii_lowercase();
            entry.attributes.remove(&name);
            entry.binary_attributes.remove(&name);
            if modification.op == ModOp::Delete {
                continue;
            }
            for value in &modification.values {
                match value {
                    WireValue::Text(text) => entry
                        .attributes
                        .entry(name.clone())
                        .or_default()
                        .push(text.clone()),
                    WireValue::Binary(bytes) => entry
                        .binary_attributes
                        .entry(name.clone())
                        .or_default()
                        .push(bytes.clone()),
                }
            }
        }

        self.modifications
            .lock()
            .push((dn.to_string(), modifications.to_vec()));
        self.succeed();
        Ok(())
    }

    fn rename(&self, dn: &str, new_rdn: &str, _delete_old_rdn: bool) -> DirectoryResult<()> {
        let mut entries = self.entries.lock();
        let entry = entries
            .iter_mut()
            .find(|entry| entry.dn.eq_ignore_ascii_case(dn))
            .ok_or_else(|| self.fail(32, "no such object"))?;

        let parent = split_rdn(dn).1;
        entry.dn = format!("{new_rdn},{parent}");
        if let Some((_, cn)) = new_rdn.split_once('=') {
            entry.attributes.insert("cn".to_string(), vec![cn.to_string()]);
        }

        self.renames
            .lock()
            .push((dn.to_string(), new_rdn.to_string()));
        self.succeed();
        Ok(())
    }

    fn bind_as(&self, filter: &Filter, base: &str, password: &str) -> DirectoryResult<bool> {
        let matched = self.search(filter, base)?;
        if matched.len() != 1 || password != PASSWORD {
            self.fail(49, "invalid credentials");
            return Ok(false);
        }
        Ok(true)
    }

    fn last_result(&self) -> OperationResult {
        self.last_result.lock().clone()
    }
}

// ============================================================================
// Filter evaluation
// ============================================================================

fn matches(filter: &Filter, entry: &RawEntry) -> bool {
    match filter {
        Filter::Present(attr) => entry.has_attr(attr),
        Filter::Equal(attr, WireValue::Text(pattern)) => {
            if attr.eq_ignore_ascii_case("distinguishedName") {
                return glob(pattern, &entry.dn);
            }
            entry
                .get_attrs(attr)
                .is_some_and(|values| values.iter().any(|value| glob(pattern, value)))
        }
        Filter::Equal(attr, WireValue::Binary(bytes)) => entry
            .binary_attributes
            .get(&attr.to_ascii_lowercase())
            .is_some_and(|values| values.contains(bytes)),
        Filter::And(filters) => filters.iter().all(|f| matches(f, entry)),
        Filter::Or(filters) => filters.iter().any(|f| matches(f, entry)),
        Filter::Not(inner) => !matches(inner, entry),
    }
}

/// Case-insensitive match with `*` wildcards.
fn glob(pattern: &str, value: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let value = value.to_ascii_lowercase();

    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == value;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    let Some(mut remaining) = value.strip_prefix(first) else {
        return false;
    };
    for part in &parts[1..parts.len() - 1] {
        match remaining.find(part) {
            Some(at) => remaining = &remaining[at + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}

// ============================================================================
// Fixtures
// ============================================================================

fn guid(seed: u8) -> Vec<u8> {
    (0..16).map(|i| seed.wrapping_mul(31).wrapping_add(i)).collect()
}

fn sid(rid: u32) -> Vec<u8> {
    let mut bytes = vec![1, 5, 0, 0, 0, 0, 0, 5];
    for sub in [21u32, 1_004_336_348, 1_177_238_915, 682_003_330, rid] {
        bytes.extend_from_slice(&sub.to_le_bytes());
    }
    bytes
}

fn user(seed: u8, dn: &str, sam: &str, sn: &str, given: &str, member_of: &[&str]) -> RawEntry {
    let cn = split_rdn(dn).0.trim_start_matches("cn=");
    RawEntry::new(dn)
        .with_attr("objectClass", ["top", "person", "organizationalPerson", "user"])
        .with_attr("cn", [cn])
        .with_attr("sAMAccountName", [sam])
        .with_attr("sn", [sn])
        .with_attr("givenName", [given])
        .with_attr("userAccountControl", ["512"])
        .with_attr("whenCreated", ["20170920132127.0Z"])
        .with_attr("memberOf", member_of.iter().copied())
        .with_binary_attr("objectGUID", guid(seed))
        .with_binary_attr("objectSid", sid(1000 + u32::from(seed)))
}

fn group(seed: u8, dn: &str, description: &str, member: &[&str], member_of: &[&str]) -> RawEntry {
    let cn = split_rdn(dn).0.trim_start_matches("cn=");
    RawEntry::new(dn)
        .with_attr("objectClass", ["top", "group"])
        .with_attr("cn", [cn])
        .with_attr("description", [description])
        .with_attr("groupType", ["-2147483646"])
        .with_attr("member", member.iter().copied())
        .with_attr("memberOf", member_of.iter().copied())
        .with_binary_attr("objectGUID", guid(seed))
        .with_binary_attr("objectSid", sid(2000 + u32::from(seed)))
}

/// Returns the fixture entries.
///
/// ```text
/// Staff ── James Hunt
///   └── Engineering ── Anna Smith
///         └── Platform ── Ben Nested, Anna Smith
/// Cycle A ⇄ Cycle B ── James Hunt
/// ```
pub fn fixture_entries() -> Vec<RawEntry> {
    vec![
        user(1, JHUNT, "jhunt", "Hunt", "James", &[STAFF, CYCLE_B]),
        user(2, ASMITH, "asmith", "Smith", "Anna", &[ENGINEERING, PLATFORM]),
        user(3, BNESTED, "bnested", "Nested", "Ben", &[PLATFORM]),
        RawEntry::new(PC01)
            .with_attr(
                "objectClass",
                ["top", "person", "organizationalPerson", "user", "computer"],
            )
            .with_attr("cn", ["PC01"])
            .with_attr("sAMAccountName", ["PC01$"])
            .with_attr("sn", ["Hunt"])
            .with_binary_attr("objectGUID", guid(4)),
        group(10, STAFF, "All staff", &[JHUNT, ENGINEERING], &[]),
        group(11, ENGINEERING, "OldGroup_Engineering", &[ASMITH, PLATFORM], &[STAFF]),
        group(12, PLATFORM, "OldGroup_Platform", &[BNESTED, ASMITH], &[ENGINEERING]),
        group(13, CYCLE_A, "Cycle A", &[CYCLE_B], &[CYCLE_B]),
        group(14, CYCLE_B, "Cycle B", &[CYCLE_A, JHUNT], &[CYCLE_A]),
    ]
}

/// Test environment: an in-memory directory and a context over it.
pub struct TestEnv {
    /// The in-memory client.
    pub client: Arc<MemoryDirectory>,
    /// The directory context under test.
    pub directory: Directory,
}

impl TestEnv {
    /// Creates an environment over the fixture entries.
    pub fn new() -> Self {
        Self::with_settings(DirectorySettings::new(BASE))
    }

    /// Creates an environment with custom settings.
    pub fn with_settings(settings: DirectorySettings) -> Self {
        Self::with_client(MemoryDirectory::new(fixture_entries()), settings)
    }

    /// Creates an environment over a prepared client.
    pub fn with_client(client: MemoryDirectory, settings: DirectorySettings) -> Self {
        // Initialize tracing for tests
        let _ = tracing_subscriber::fmt()
            .with_env_filter("ad_directory=debug")
            .with_test_writer()
            .try_init();

        let client = Arc::new(client);
        let directory = Directory::new(client.clone(), settings);
        Self { client, directory }
    }
}

/// Collects the DNs of entities, lowercased and sorted.
pub fn dns(entities: &[ad_directory::Entity]) -> Vec<String> {
    let mut dns: Vec<String> = entities.iter().map(|e| e.dn().to_ascii_lowercase()).collect();
    dns.sort();
    dns
}

/// Lowercases and sorts DNs for comparison with [`dns`].
pub fn sorted(expected: &[&str]) -> Vec<String> {
    let mut dns: Vec<String> = expected.iter().map(|dn| dn.to_ascii_lowercase()).collect();
    dns.sort();
    dns
}
