//! Key registry: derived ticket keys indexed by their wire-visible name.
//!
//! The registry owns every derived key. The encryption-eligible subset is an
//! index of key names recomputed on each rebuild, never a second owner.

use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
};

use serde::{Deserialize, Serialize};
use ticketseed_crypto::{
    BaseKey, HASH_CHAIN_DEPTH, KeyName, Salt, SeedDigest, TicketKeys, derive_base_key,
    derive_key_name, derive_ticket_keys,
};

use crate::{
    env::Environment,
    error::EntropyError,
    seed::{Classification, SeedStore},
};

/// How a key is chosen for a new ticket when several are eligible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionKeyPolicy {
    /// First current key in configuration order; first new key if no current
    /// key exists.
    #[default]
    FirstConfigured,
    /// Uniformly random current key; first new key if no current key exists.
    SpreadCurrent,
}

/// A ticket key derived from one seed.
#[derive(Clone)]
pub struct DerivedKey {
    chain_depth: u32,
    name: KeyName,
    classification: Classification,
    base_key: BaseKey,
    seed_digest: SeedDigest,
}

impl DerivedKey {
    fn derive(secret: &[u8], seed_digest: SeedDigest, classification: Classification) -> Self {
        let base_key = derive_base_key(secret);
        let name = derive_key_name(&base_key);
        Self { chain_depth: HASH_CHAIN_DEPTH, name, classification, base_key, seed_digest }
    }

    /// Number of hash applications from seed to base key.
    pub fn chain_depth(&self) -> u32 {
        self.chain_depth
    }

    /// Wire-visible key name.
    pub fn name(&self) -> KeyName {
        self.name
    }

    /// Classification inherited from the seed.
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Derive the cipher and MAC keys for a ticket with the given salt.
    pub fn ticket_keys(&self, salt: &Salt) -> TicketKeys {
        derive_ticket_keys(&self.base_key, salt)
    }

    /// Base key bytes. Exposed for cross-server consistency checks.
    pub fn base_key(&self) -> &BaseKey {
        &self.base_key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("name", &self.name)
            .field("classification", &self.classification)
            .field("chain_depth", &self.chain_depth)
            .finish_non_exhaustive()
    }
}

/// Derived keys for one generation of seeds.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    /// All keys that can decrypt, by name
    keys: HashMap<KeyName, DerivedKey>,
    /// Keys that can encrypt: current keys in configuration order, then new
    encryption_order: Vec<KeyName>,
    /// Length of the current-key prefix of `encryption_order`
    current_keys: usize,
}

/// Outcome of [`KeyRegistry::rebuild`].
#[derive(Debug)]
pub struct Rebuild {
    /// The new registry
    pub registry: KeyRegistry,
    /// Keys carried over from the previous registry without re-derivation
    pub reused: usize,
}

impl KeyRegistry {
    /// Derive a registry for `store`, reusing keys from `previous` where the
    /// same secret keeps the same classification.
    ///
    /// A secret supplied under several classifications (or several times in
    /// one list) yields a single key with the most active classification.
    pub fn rebuild(store: &SeedStore, previous: Option<&KeyRegistry>) -> Rebuild {
        let mut effective: HashMap<&SeedDigest, Classification> = HashMap::new();
        for seed in store.seeds() {
            effective
                .entry(seed.digest())
                .and_modify(|c| {
                    if seed.classification().activity() > c.activity() {
                        *c = seed.classification();
                    }
                })
                .or_insert(seed.classification());
        }

        let mut registry = KeyRegistry::default();
        let mut reused = 0;
        let mut current = Vec::new();
        let mut incoming = Vec::new();

        for seed in store.seeds() {
            let Some(&classification) = effective.get(seed.digest()) else {
                continue;
            };
            if classification != seed.classification() {
                continue;
            }

            let carried = previous.and_then(|p| p.find_by_digest(seed.digest(), classification));
            let key = match carried {
                Some(key) => key.clone(),
                None => DerivedKey::derive(seed.secret(), seed.digest().clone(), classification),
            };
            let name = key.name;

            match registry.keys.entry(name) {
                Entry::Occupied(mut slot) => {
                    if slot.get().seed_digest == key.seed_digest {
                        // Same secret repeated within one list
                        continue;
                    }
                    tracing::warn!(
                        key_name = %name,
                        "Ticket key name collision between distinct seeds"
                    );
                    if key.classification.activity() <= slot.get().classification.activity() {
                        continue;
                    }
                    slot.insert(key);
                },
                Entry::Vacant(slot) => {
                    if carried.is_some() {
                        reused += 1;
                    }
                    slot.insert(key);
                },
            }

            match classification {
                Classification::Current => current.push(name),
                Classification::New => incoming.push(name),
                Classification::Old => {},
            }
        }

        registry.current_keys = current.len();
        registry.encryption_order = current;
        registry.encryption_order.extend(incoming);

        debug_assert!(
            registry
                .encryption_order
                .iter()
                .all(|n| registry.keys.get(n).is_some_and(|k| k.classification.can_encrypt()))
        );

        Rebuild { registry, reused }
    }

    fn find_by_digest(
        &self,
        digest: &SeedDigest,
        classification: Classification,
    ) -> Option<&DerivedKey> {
        self.keys
            .values()
            .find(|k| &k.seed_digest == digest && k.classification == classification)
    }

    /// Find the key named in a ticket.
    pub fn lookup_for_decrypt(&self, name: &KeyName) -> Option<&DerivedKey> {
        self.keys.get(name)
    }

    /// Choose the key for a new ticket.
    ///
    /// Current keys always win over new keys. Returns `Ok(None)` when nothing
    /// is eligible.
    pub fn select_for_encrypt<E: Environment>(
        &self,
        policy: EncryptionKeyPolicy,
        env: &E,
    ) -> Result<Option<&DerivedKey>, EntropyError> {
        let index = match (policy, self.current_keys) {
            (_, 0) | (EncryptionKeyPolicy::FirstConfigured, _) => 0,
            (EncryptionKeyPolicy::SpreadCurrent, n) => env.random_index(n)?,
        };
        Ok(self.encryption_order.get(index).and_then(|name| self.keys.get(name)))
    }

    /// Names of the encryption-eligible keys in selection order.
    pub fn encryption_keys(&self) -> &[KeyName] {
        &self.encryption_order
    }

    /// Every key in the registry.
    pub fn keys(&self) -> impl Iterator<Item = &DerivedKey> + '_ {
        self.keys.values()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the registry holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
