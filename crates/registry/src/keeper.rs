//! Name registry keeper
//!
//! Binds normalized dotted names to owner addresses. Every record lives under
//! two keys, the name key and the owner index key, and both are written and
//! removed in the same [`WriteBatch`].

use crate::account::AccountKeeper;
use crate::codec::{JsonCodec, RecordCodec};
use crate::errors::*;
use crate::keys::{address_index_key, address_key_prefix, name_key};
use crate::normalize::normalize;
use dotname_storage::{KvStore, WriteBatch};
use dotname_types::{verify_address_format, Address, NameRecord, NameRecords, ParamsProvider};
use tracing::{debug, instrument, trace, warn};

/// Name registry keeper.
///
/// The keeper holds no state of its own. Callers pass the store into every
/// operation and are responsible for applying operations one at a time.
#[derive(Debug, Clone)]
pub struct NameKeeper<P, A, C = JsonCodec> {
    params: P,
    accounts: A,
    codec: C,
}

impl<P, A> NameKeeper<P, A, JsonCodec>
where
    P: ParamsProvider,
    A: AccountKeeper,
{
    pub fn new(params: P, accounts: A) -> Self {
        Self::with_codec(params, accounts, JsonCodec)
    }
}

impl<P, A, C> NameKeeper<P, A, C>
where
    P: ParamsProvider,
    A: AccountKeeper,
    C: RecordCodec,
{
    pub fn with_codec(params: P, accounts: A, codec: C) -> Self {
        Self {
            params,
            accounts,
            codec,
        }
    }

    pub fn params(&self) -> &P {
        &self.params
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    /// Normalize `name` against the current parameters.
    pub fn normalize(&self, name: &str) -> Result<String> {
        normalize(&self.params, name)
    }

    /// Bind a name to an owner. The owner must have an account.
    #[instrument(level = "debug", skip(self, store), fields(module = "x/name"))]
    pub fn bind<S: KvStore + ?Sized>(
        &self,
        store: &S,
        name: &str,
        owner: &Address,
        restricted: bool,
    ) -> Result<()> {
        let name = self.normalize(name)?;
        if self.accounts.get_account(owner).is_none() {
            warn!(%name, %owner, "rejecting bind for unknown account");
            return Err(NameError::InvalidAddress {
                address: owner.to_string(),
            });
        }
        self.create_record(store, name, owner, restricted)
    }

    /// Bind a name while seeding state, before owner accounts exist.
    ///
    /// The owner only has to be a well formed address.
    #[instrument(level = "debug", skip(self, store), fields(module = "x/name"))]
    pub fn genesis_bind<S: KvStore + ?Sized>(
        &self,
        store: &S,
        name: &str,
        owner: &Address,
        restricted: bool,
    ) -> Result<()> {
        if owner.is_empty() {
            return Err(NameError::NameInvalid {
                name: name.to_string(),
            });
        }
        verify_address_format(owner.as_bytes())?;
        let name = self.normalize(name)?;
        self.create_record(store, name, owner, restricted)
    }

    fn create_record<S: KvStore + ?Sized>(
        &self,
        store: &S,
        name: String,
        owner: &Address,
        restricted: bool,
    ) -> Result<()> {
        let key = name_key(&name)?;
        if store.has(&key)? {
            return Err(NameError::AlreadyBound { name });
        }
        let index_key = address_index_key(owner, &key)?;

        let record = NameRecord::new(name, owner.clone(), restricted);
        let bz = self.codec.encode(&record)?;

        let mut batch = WriteBatch::new();
        batch.set(key, bz.clone()).set(index_key, bz);
        store.apply_batch(batch)?;

        debug!(name = %record.name, owner = %owner, restricted, "name bound");
        Ok(())
    }

    /// Whether `name` is bound to `owner`. Lookup failures count as `false`.
    pub fn resolves_to<S: KvStore + ?Sized>(&self, store: &S, name: &str, owner: &Address) -> bool {
        matches!(self.resolve(store, name), Ok(record) if &record.address == owner)
    }

    /// Look up the record for an already normalized name.
    pub fn resolve<S: KvStore + ?Sized>(&self, store: &S, name: &str) -> Result<NameRecord> {
        let key = name_key(name)?;
        match store.get(&key)? {
            Some(bz) => Ok(self.codec.decode(&bz)?),
            None => Err(NameError::NotBound {
                name: name.to_string(),
            }),
        }
    }

    /// Whether a record exists under `name`'s key.
    pub fn name_exists<S: KvStore + ?Sized>(&self, store: &S, name: &str) -> bool {
        match name_key(name) {
            Ok(key) => store.has(&key).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// All records owned by `owner`, in name key order.
    pub fn list_by_address<S: KvStore + ?Sized>(
        &self,
        store: &S,
        owner: &Address,
    ) -> Result<NameRecords> {
        let prefix = address_key_prefix(owner)?;
        let mut records = NameRecords::new();
        self.iterate(store, &prefix, |record| -> Result<()> {
            if &record.address == owner {
                records.push(record);
            }
            Ok(())
        })?;
        Ok(records)
    }

    /// Remove a name and its owner index entry.
    #[instrument(level = "debug", skip(self, store), fields(module = "x/name"))]
    pub fn delete<S: KvStore + ?Sized>(&self, store: &S, name: &str) -> Result<()> {
        let record = self.resolve(store, name)?;
        let key = name_key(name)?;
        let index_key = address_index_key(&record.address, &key)?;

        let mut batch = WriteBatch::new();
        batch.delete(key);
        if store.has(&index_key)? {
            batch.delete(index_key);
        } else {
            warn!(%name, owner = %record.address, "owner index entry already missing");
        }
        store.apply_batch(batch)?;

        debug!(%name, owner = %record.address, "name deleted");
        Ok(())
    }

    /// Decode every record stored under `prefix`, in ascending key order.
    ///
    /// Stops at the first decode or handler error and returns it.
    pub fn iterate<S, F, E>(&self, store: &S, prefix: &[u8], mut handler: F) -> std::result::Result<(), E>
    where
        S: KvStore + ?Sized,
        F: FnMut(NameRecord) -> std::result::Result<(), E>,
        E: From<NameError>,
    {
        let cursor = store.prefix_iter(prefix).map_err(NameError::from)?;
        for item in cursor {
            let (key, value) = item.map_err(NameError::from)?;
            let record = self.codec.decode(&value).map_err(NameError::from)?;
            trace!(key_len = key.len(), name = %record.name, "visiting record");
            handler(record)?;
        }
        Ok(())
    }
}
