//! LDAPS directory client.
//!
//! ## Security Requirements
//!
//! All connections use LDAPS (TLS from connection start).
//! STARTTLS is NOT supported to prevent downgrade attacks.
//!
//! One connection, bound with the service account, is opened lazily and
//! reused for every operation. Password checks bind on a separate
//! connection that is discarded afterwards.

use std::collections::HashSet;

use ad_directory::{
    DirectoryClient, DirectoryError, DirectoryResult, Filter, ModOp, Modification,
    OperationResult, RawEntry,
};
use ldap3::{LdapConn, LdapConnSettings, Mod, Scope, SearchEntry, SearchResult};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::LdapConfig;
use crate::error::{LdapError, LdapResult};
use crate::search::raw_entry;

/// LDAP `invalidCredentials` result code.
const INVALID_CREDENTIALS: u32 = 49;

/// Directory client over a blocking LDAPS connection.
pub struct LdapDirectoryClient {
    config: LdapConfig,
    connection: Mutex<Option<LdapConn>>,
    last_result: Mutex<OperationResult>,
}

impl LdapDirectoryClient {
    /// Creates a client. No connection is opened until first use.
    ///
    /// ## Security
    ///
    /// The configuration must use LDAPS. It is validated again here.
    pub fn new(config: LdapConfig) -> LdapResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            connection: Mutex::new(None),
            last_result: Mutex::new(OperationResult::success()),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &LdapConfig {
        &self.config
    }

    fn conn_settings(&self) -> LdapConnSettings {
        LdapConnSettings::new()
            .set_conn_timeout(self.config.connection_timeout)
            .set_no_tls_verify(!self.config.validate_certificates)
    }

    /// Opens an unbound LDAPS connection.
    fn open(&self) -> LdapResult<LdapConn> {
        LdapConn::with_settings(self.conn_settings(), &self.config.connection_url)
            .map_err(|e| LdapError::connection(e.to_string()))
    }

    /// Opens a connection bound with the service account.
    fn connect(&self) -> LdapResult<LdapConn> {
        let mut conn = self.open()?;
        let result = conn
            .with_timeout(self.config.operation_timeout)
            .simple_bind(&self.config.bind_dn, &self.config.bind_credential)
            .map_err(|e| LdapError::Bind(e.to_string()))?;
        self.record(result.rc, &result.text);

        if result.rc != 0 {
            return Err(LdapError::Bind(format!("result code {}", result.rc)));
        }

        debug!(bind_dn = %self.config.bind_dn, "bound service account");
        Ok(conn)
    }

    /// Runs an operation on the shared connection, connecting if needed.
    ///
    /// A transport failure drops the connection so the next call reconnects.
    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut LdapConn) -> LdapResult<T>,
    ) -> LdapResult<T> {
        let mut guard = self.connection.lock();
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        let Some(conn) = guard.as_mut() else {
            return Err(LdapError::connection("no connection"));
        };

        let result = op(conn);
        if let Err(LdapError::Ldap3(e)) = &result {
            warn!(error = %e, "dropping LDAP connection");
            *guard = None;
        }
        result
    }

    fn record(&self, code: u32, message: &str) {
        *self.last_result.lock() = OperationResult {
            code,
            message: message.to_string(),
        };
    }

    fn check(&self, operation: &'static str, result: ldap3::LdapResult) -> LdapResult<()> {
        self.record(result.rc, &result.text);
        if result.rc == 0 {
            Ok(())
        } else {
            Err(LdapError::operation(operation, result.rc, result.text))
        }
    }

    fn search_entries(&self, filter: &str, base: &str, attrs: Vec<&str>) -> LdapResult<Vec<SearchEntry>> {
        let timeout = self.config.operation_timeout;
        self.with_connection(|conn| {
            let SearchResult(entries, result) = conn
                .with_timeout(timeout)
                .search(base, Scope::Subtree, filter, attrs)?;
            self.check("search", result)?;
            Ok(entries.into_iter().map(SearchEntry::construct).collect())
        })
    }
}

impl DirectoryClient for LdapDirectoryClient {
    fn bind(&self) -> DirectoryResult<()> {
        let mut guard = self.connection.lock();
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        Ok(())
    }

    fn search(&self, filter: &Filter, base: &str) -> DirectoryResult<Vec<RawEntry>> {
        let filter = filter.to_string();
        debug!(filter = %filter, base = %base, "LDAP search");

        let entries = self.search_entries(&filter, base, vec!["*"])?;
        Ok(entries.into_iter().map(raw_entry).collect())
    }

    fn modify(&self, dn: &str, modifications: &[Modification]) -> DirectoryResult<()> {
        let mods = to_ldap_mods(modifications);
        let timeout = self.config.operation_timeout;
        debug!(dn = %dn, count = mods.len(), "LDAP modify");

        self.with_connection(|conn| {
            let result = conn.with_timeout(timeout).modify(dn, mods)?;
            self.check("modify", result)
        })?;
        Ok(())
    }

    fn rename(&self, dn: &str, new_rdn: &str, delete_old_rdn: bool) -> DirectoryResult<()> {
        let timeout = self.config.operation_timeout;
        debug!(dn = %dn, new_rdn = %new_rdn, "LDAP modifydn");

        self.with_connection(|conn| {
            let result = conn
                .with_timeout(timeout)
                .modifydn(dn, new_rdn, delete_old_rdn, None)?;
            self.check("modifydn", result)
        })?;
        Ok(())
    }

    /// ## Security
    ///
    /// The password is never logged. The bind happens on a throwaway
    /// connection so the shared one stays bound as the service account.
    fn bind_as(&self, filter: &Filter, base: &str, password: &str) -> DirectoryResult<bool> {
        let entries = self.search_entries(&filter.to_string(), base, vec!["1.1"])?;
        let [entry] = entries.as_slice() else {
            debug!(filter = %filter, matches = entries.len(), "bind_as needs exactly one match");
            return Ok(false);
        };

        let mut conn = self.open()?;
        let result = conn
            .with_timeout(self.config.operation_timeout)
            .simple_bind(&entry.dn, password)
            .map_err(|e| LdapError::Bind(e.to_string()))?;
        self.record(result.rc, &result.text);
        let _ = conn.unbind();

        match result.rc {
            0 => Ok(true),
            INVALID_CREDENTIALS => Ok(false),
            code => Err(DirectoryError::operation(code, result.text)),
        }
    }

    fn last_result(&self) -> OperationResult {
        self.last_result.lock().clone()
    }
}

/// Converts modifications into `ldap3` form.
fn to_ldap_mods(modifications: &[Modification]) -> Vec<Mod<Vec<u8>>> {
    modifications
        .iter()
        .map(|m| {
            let attribute = m.attribute.as_bytes().to_vec();
            let values: HashSet<Vec<u8>> = m.values.iter().cloned().map(|v| v.into_bytes()).collect();
            match m.op {
                ModOp::Add => Mod::Add(attribute, values),
                ModOp::Replace => Mod::Replace(attribute, values),
                ModOp::Delete => Mod::Delete(attribute, values),
            }
        })
        .collect()
}
