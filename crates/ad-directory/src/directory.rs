//! Directory context.
//!
//! [`Directory`] ties a [`DirectoryClient`] to the settings and entity
//! cache of one directory. Every query, attribute read and update goes
//! through it.
//!
//! ## Connection
//!
//! The client is bound lazily on the first query. A successful bind is kept
//! for the lifetime of the context; a failed one is retried by the next
//! query. Queries against an unbound directory fail with
//! [`DirectoryError::NotConnected`], never with an empty result.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::EntityCache;
use crate::class::EntityClass;
use crate::client::{DirectoryClient, Modification};
use crate::codec::ReferenceResolver;
use crate::config::DirectorySettings;
use crate::entity::{split_rdn, Entity};
use crate::error::{CodecError, DirectoryError, DirectoryResult};
use crate::filter::{Filter, FilterBuilder};
use crate::finder::{Cardinality, FinderSpec, Found};
use crate::query::Query;
use crate::registry;
use crate::value::Value;

/// LDAP `noSuchObject` result code.
const NO_SUCH_OBJECT: u32 = 32;

/// A directory context.
pub struct Directory {
    client: Arc<dyn DirectoryClient>,
    settings: DirectorySettings,
    cache: EntityCache,
    connected: Mutex<bool>,
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("settings", &self.settings)
            .field("cache", &self.cache)
            .field("connected", &*self.connected.lock())
            .finish_non_exhaustive()
    }
}

impl Directory {
    /// Creates a context over a client.
    #[must_use]
    pub fn new(client: Arc<dyn DirectoryClient>, settings: DirectorySettings) -> Self {
        let cache = EntityCache::new(settings.caching);
        Self {
            client,
            settings,
            cache,
            connected: Mutex::new(false),
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &DirectorySettings {
        &self.settings
    }

    /// Returns the entity cache.
    #[must_use]
    pub const fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// Returns the directory client.
    #[must_use]
    pub fn client(&self) -> &dyn DirectoryClient {
        self.client.as_ref()
    }

    // ========================================================================
    // Connection and error state
    // ========================================================================

    /// Checks whether the directory is bound, binding if it is not yet.
    ///
    /// Only a successful bind is remembered; after a failure the next call
    /// tries again.
    pub fn is_connected(&self) -> bool {
        let mut connected = self.connected.lock();
        if *connected {
            return true;
        }
        match self.client.bind() {
            Ok(()) => {
                debug!(base = %self.settings.base_dn, "bound to directory");
                *connected = true;
                true
            }
            Err(e) => {
                warn!(error = %e, "directory bind failed");
                false
            }
        }
    }

    /// Returns the diagnostic message of the last operation.
    #[must_use]
    pub fn error(&self) -> String {
        self.client.last_result().message
    }

    /// Returns the result code of the last operation.
    #[must_use]
    pub fn error_code(&self) -> u32 {
        self.client.last_result().code
    }

    /// Checks whether the last operation failed.
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.client.last_result().is_success()
    }

    // ========================================================================
    // Cache switches
    // ========================================================================

    /// Serves DN lookups from the cache.
    pub fn enable_cache(&self) {
        self.cache.enable();
    }

    /// Sends every lookup to the directory.
    pub fn disable_cache(&self) {
        self.cache.disable();
    }

    /// Drops every cached entity.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Checks whether DN lookups are served from the cache.
    #[must_use]
    pub fn is_caching(&self) -> bool {
        self.cache.is_enabled()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Finds entities of `class` matching `query`.
    ///
    /// Pure DN lookups are answered from the cache when every DN is cached
    /// as `class`; anything else goes to the directory.
    ///
    /// ## Errors
    ///
    /// Returns [`DirectoryError::NotConnected`] when the directory cannot
    /// be bound, and codec or client errors otherwise.
    pub fn find(
        &self,
        class: EntityClass,
        cardinality: Cardinality,
        query: &Query,
    ) -> DirectoryResult<Found> {
        if !self.is_connected() {
            return Err(DirectoryError::NotConnected);
        }

        if let Some(hit) = self.cached(class, query) {
            return Ok(shape(cardinality, hit));
        }

        let base = query.search_base(&self.settings.base_dn);
        let filter = FilterBuilder::new(class).build_for_class(Some(query))?;
        let entities = self.search(class, &filter, &base)?;

        Ok(shape(cardinality, entities))
    }

    /// Finds every entity of `class` matching `query`.
    pub fn find_all(&self, class: EntityClass, query: &Query) -> DirectoryResult<Vec<Entity>> {
        self.find(class, Cardinality::All, query).map(Found::into_vec)
    }

    /// Finds the first entity of `class` matching `query`.
    pub fn find_first(&self, class: EntityClass, query: &Query) -> DirectoryResult<Option<Entity>> {
        self.find(class, Cardinality::First, query)
            .map(Found::into_first)
    }

    /// Runs a dynamic finder such as `find_first_by_sn_and_givenname`.
    ///
    /// ## Errors
    ///
    /// Returns [`DirectoryError::InvalidFinder`] for a malformed name and
    /// [`DirectoryError::Arity`] when `args` does not match it.
    pub fn find_by(
        &self,
        class: EntityClass,
        name: &str,
        args: Vec<Value>,
    ) -> DirectoryResult<Found> {
        let spec = FinderSpec::parse(name)?;
        let query = spec.query(args)?;
        self.find(class, spec.cardinality, &query)
    }

    /// Checks whether any entity of `class` matches `query`.
    pub fn exists(&self, class: EntityClass, query: &Query) -> DirectoryResult<bool> {
        Ok(self.find_first(class, query)?.is_some())
    }

    /// Looks up one entity by DN.
    pub fn from_dn(&self, class: EntityClass, dn: &str) -> DirectoryResult<Option<Entity>> {
        self.find_first(class, &Query::dn(dn))
    }

    fn cached(&self, class: EntityClass, query: &Query) -> Option<Vec<Entity>> {
        if !self.cache.is_enabled() || query.sub_base().is_some() {
            return None;
        }
        let (dns, _) = query.dn_lookup()?;

        match self.cache.lookup_all(class, &dns) {
            Some(hit) => {
                debug!(class = %class, count = hit.len(), "cache hit");
                Some(hit)
            }
            None => {
                debug!(class = %class, count = dns.len(), "cache bypass");
                None
            }
        }
    }

    fn search(&self, class: EntityClass, filter: &Filter, base: &str) -> DirectoryResult<Vec<Entity>> {
        debug!(class = %class, filter = %filter, base = %base, "searching directory");

        let entries = self.client.search(filter, base)?;
        let entities: Vec<Entity> = entries
            .into_iter()
            .map(|entry| Entity::from_entry(class, entry))
            .collect();

        for entity in &entities {
            self.cache.store(entity);
        }

        debug!(class = %class, count = entities.len(), "search complete");
        Ok(entities)
    }

    /// Reads an entity by DN from the directory, bypassing the cache.
    fn fetch(&self, class: EntityClass, dn: &str) -> DirectoryResult<Entity> {
        if !self.is_connected() {
            return Err(DirectoryError::NotConnected);
        }

        let filter = FilterBuilder::new(class).build_for_class(Some(&Query::dn(dn)))?;
        self.search(class, &filter, &self.settings.base_dn)?
            .into_iter()
            .next()
            .ok_or_else(|| DirectoryError::operation(NO_SUCH_OBJECT, format!("no such object: {dn}")))
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Reads an attribute through its codec.
    ///
    /// Reference attributes are resolved into entities; everything else is
    /// decoded as [`Entity::attribute`] does.
    ///
    /// ## Errors
    ///
    /// Returns [`DirectoryError::UnknownAttribute`] when the entity has no
    /// such attribute.
    pub fn get_attr(&self, entity: &Entity, name: &str) -> DirectoryResult<Value> {
        match entity.field_type(name) {
            Some(field_type) if field_type.is_reference() => {
                if let Some(value) = entity.pending_attributes().get(&name.to_ascii_lowercase()) {
                    return Ok(value.clone());
                }
                let raw = entity
                    .raw(name)
                    .ok_or_else(|| DirectoryError::UnknownAttribute(name.to_string()))?;
                field_type.decode(name, raw, self)
            }
            _ => entity.attribute(name),
        }
    }

    /// Updates one attribute. See [`Directory::update_attributes`].
    pub fn update_attribute(
        &self,
        entity: &mut Entity,
        name: &str,
        value: impl Into<Value>,
    ) -> DirectoryResult<()> {
        self.update_attributes(entity, [(name.to_string(), value.into())])
    }

    /// Updates attributes and reloads the entity.
    ///
    /// Empty values delete the attribute; otherwise the attribute is
    /// replaced when it has a value and added when it has none. Setting
    /// `cn` also sets `sAMAccountName` and renames the entry to the new
    /// `cn`.
    ///
    /// ## Errors
    ///
    /// Returns [`DirectoryError::NewRecord`] for entities that do not exist
    /// in the directory yet, and the client's error when a modification
    /// is rejected.
    pub fn update_attributes<I, S>(&self, entity: &mut Entity, attributes: I) -> DirectoryResult<()>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        if entity.new_record() {
            return Err(DirectoryError::NewRecord);
        }

        let attributes: Vec<(String, Value)> = attributes
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        if attributes.is_empty() {
            return Ok(());
        }

        let mut modifications = Vec::with_capacity(attributes.len());
        let mut new_cn: Option<String> = None;

        for (name, value) in &attributes {
            if name.eq_ignore_ascii_case("cn") {
                let cn = value.as_str().ok_or_else(|| {
                    DirectoryError::codec(
                        "cn",
                        CodecError::UnexpectedValue {
                            field: "cn",
                            kind: value.kind(),
                        },
                    )
                })?;
                modifications.push(modification(entity, "sAMAccountName", value)?);
                new_cn = Some(cn.to_string());
            } else {
                modifications.push(modification(entity, name, value)?);
            }
        }

        let old_dn = entity.dn().to_string();
        debug!(dn = %old_dn, count = modifications.len(), "modifying entry");
        self.client.modify(&old_dn, &modifications)?;

        let dn = match new_cn {
            Some(cn) => {
                let new_rdn = format!("cn={cn}");
                self.client.rename(&old_dn, &new_rdn, true)?;
                let parent = split_rdn(&old_dn).1;
                let new_dn = if parent.is_empty() {
                    new_rdn
                } else {
                    format!("{new_rdn},{parent}")
                };
                info!(from = %old_dn, to = %new_dn, "renamed entry");
                new_dn
            }
            None => old_dn.clone(),
        };

        self.cache.invalidate(&old_dn);
        *entity = self.fetch(entity.class(), &dn)?;
        Ok(())
    }

    /// Re-reads an entity from the directory.
    ///
    /// ## Errors
    ///
    /// Returns [`DirectoryError::NewRecord`] for pending entities.
    pub fn reload(&self, entity: &mut Entity) -> DirectoryResult<()> {
        if entity.new_record() {
            return Err(DirectoryError::NewRecord);
        }
        self.cache.invalidate(entity.dn());
        *entity = self.fetch(entity.class(), entity.dn())?;
        Ok(())
    }

    /// Checks a password by binding as the entity's account.
    ///
    /// An empty password is rejected without contacting the directory.
    ///
    /// ## Security
    ///
    /// The password is never logged.
    pub fn authenticate(&self, entity: &Entity, password: &str) -> DirectoryResult<bool> {
        if password.is_empty() {
            return Ok(false);
        }
        if !self.is_connected() {
            return Err(DirectoryError::NotConnected);
        }

        let account = entity
            .raw_texts("samaccountname")
            .into_iter()
            .next()
            .ok_or_else(|| DirectoryError::MissingAttribute("sAMAccountName".to_string()))?;

        let filter = Filter::eq("sAMAccountName", account.as_str());
        let ok = self
            .client
            .bind_as(&filter, &self.settings.base_dn, password)?;
        if !ok {
            warn!(account = %account, "authentication failed");
        }
        Ok(ok)
    }
}

impl ReferenceResolver for Directory {
    fn resolve_dns(&self, class: EntityClass, dns: &[String]) -> DirectoryResult<Vec<Entity>> {
        if dns.is_empty() {
            return Ok(Vec::new());
        }
        self.find_all(class, &Query::dns(dns.iter().map(String::as_str)))
    }
}

fn modification(entity: &Entity, name: &str, value: &Value) -> DirectoryResult<Modification> {
    if value.is_empty() {
        return Ok(Modification::delete(name));
    }

    let values = match registry::type_of(entity.class(), name) {
        Some(field_type) => field_type
            .encode(value)
            .map_err(|e| DirectoryError::codec(name, e))?,
        None => value.to_wire(),
    };

    if entity.has_attribute(name) {
        Ok(Modification::replace(name, values))
    } else {
        Ok(Modification::add(name, values))
    }
}

fn shape(cardinality: Cardinality, entities: Vec<Entity>) -> Found {
    match cardinality {
        Cardinality::All => Found::All(entities),
        Cardinality::First => Found::First(entities.into_iter().next()),
    }
}
