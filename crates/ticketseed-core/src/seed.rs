//! Seed store: the raw fleet secrets and their rotation classification.
//!
//! Seeds are immutable once inserted. A rotation never edits a store in
//! place; it builds a fresh one and swaps it in whole.

use std::fmt;

use serde::{Deserialize, Serialize};
use ticketseed_crypto::{SeedDigest, seed_digest};
use zeroize::Zeroizing;

/// Rotation stage of a seed.
///
/// Declaration order is rotation order (old, current, new), which is also the
/// order seeds are stored and reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Retiring: decrypts existing tickets, asks for renewal.
    Old,
    /// Active: encrypts new tickets.
    Current,
    /// Incoming: decrypts tickets from servers that rotated early.
    New,
}

impl Classification {
    /// All classifications in storage order.
    pub const ALL: [Self; 3] = [Self::Old, Self::Current, Self::New];

    /// Rank used when one secret appears under several classifications.
    ///
    /// Higher wins: current over new over old.
    pub(crate) fn activity(self) -> u8 {
        match self {
            Self::Old => 0,
            Self::New => 1,
            Self::Current => 2,
        }
    }

    /// Whether keys of this classification may encrypt new tickets.
    pub fn can_encrypt(self) -> bool {
        matches!(self, Self::Current | Self::New)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Old => "old",
            Self::Current => "current",
            Self::New => "new",
        })
    }
}

/// A configured seed secret.
pub struct Seed {
    secret: Zeroizing<String>,
    classification: Classification,
    digest: SeedDigest,
}

impl Seed {
    fn new(secret: &str, classification: Classification) -> Self {
        Self {
            secret: Zeroizing::new(secret.to_owned()),
            classification,
            digest: seed_digest(secret.as_bytes()),
        }
    }

    /// Raw secret bytes.
    pub fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    /// Classification this seed was supplied under.
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Digest identifying the secret.
    pub fn digest(&self) -> &SeedDigest {
        &self.digest
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("classification", &self.classification)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Ordered collection of seeds.
///
/// Iteration yields old seeds, then current, then new; within each
/// classification, insertion order is preserved.
#[derive(Debug, Default)]
pub struct SeedStore {
    seeds: Vec<Seed>,
}

impl SeedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from the three rotation lists.
    pub fn from_lists<S: AsRef<str>>(old: &[S], current: &[S], new: &[S]) -> Self {
        let mut store = Self::new();
        for (classification, list) in Classification::ALL.into_iter().zip([old, current, new]) {
            for secret in list {
                store.insert_seed(secret.as_ref(), classification);
            }
        }
        store
    }

    /// Add a seed, keeping classification order.
    pub fn insert_seed(&mut self, secret: &str, classification: Classification) -> &Seed {
        let position = self.seeds.partition_point(|s| s.classification <= classification);
        self.seeds.insert(position, Seed::new(secret, classification));
        &self.seeds[position]
    }

    /// All seeds in storage order.
    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    /// Seeds of one classification in insertion order.
    pub fn by_classification(
        &self,
        classification: Classification,
    ) -> impl Iterator<Item = &Seed> + '_ {
        self.seeds.iter().filter(move |s| s.classification == classification)
    }

    /// Copies of the secrets of one classification, in insertion order.
    pub fn secrets(&self, classification: Classification) -> Vec<String> {
        self.by_classification(classification).map(|s| s.secret.as_str().to_owned()).collect()
    }

    /// Number of seeds of one classification.
    pub fn count(&self, classification: Classification) -> usize {
        self.by_classification(classification).count()
    }

    /// Total number of seeds.
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    /// Whether the store holds no seeds.
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}
