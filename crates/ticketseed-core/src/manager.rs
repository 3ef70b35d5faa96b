//! Ticket key manager: rotation and installed key state.
//!
//! A manager is bound to one TLS context and driven from one thread. It holds
//! at most one generation of seeds and derived keys; rotation builds the next
//! generation off to the side and swaps it in whole, or leaves the installed
//! one untouched on error.

use std::{collections::HashSet, fmt, sync::Arc};

use crate::{
    config::{ManagerConfig, TicketSeeds},
    env::Environment,
    error::RotationError,
    registry::{EncryptionKeyPolicy, KeyRegistry, Rebuild},
    seed::{Classification, SeedStore},
    stats::{RotationReport, TicketStats},
};

/// Shared handle to a stats collector.
pub type SharedStats = Arc<dyn TicketStats + Send + Sync>;

/// One installed generation: the seeds and the keys derived from them.
#[derive(Debug)]
struct KeyGeneration {
    seeds: SeedStore,
    registry: KeyRegistry,
}

/// Manages TLS session-ticket keys derived from fleet-wide seeds.
///
/// Servers configured with the same seeds derive identical ticket keys, so a
/// ticket issued by one server resumes on any other. See [`crate`] docs for
/// the rotation scheme.
///
/// # Invariants
///
/// - Installed state is either empty (never initialized) or a generation
///   with at least one current seed
/// - Exactly one derived key per distinct configured secret
/// - A failed rotation leaves the previous generation installed
pub struct TicketKeyManager<E: Environment> {
    env: E,
    policy: EncryptionKeyPolicy,
    generation: Option<KeyGeneration>,
    stats: Option<SharedStats>,
}

impl<E: Environment> TicketKeyManager<E> {
    /// Create an uninitialized manager.
    ///
    /// Until seeds are installed, encryption is refused and every ticket
    /// decrypts as an unknown key.
    pub fn new(env: E) -> Self {
        Self { env, policy: EncryptionKeyPolicy::default(), generation: None, stats: None }
    }

    /// Create a manager initialized from a seed record.
    pub fn from_seeds(env: E, seeds: &TicketSeeds) -> Result<Self, RotationError> {
        let mut manager = Self::new(env);
        manager.set_ticket_seeds(seeds)?;
        Ok(manager)
    }

    /// Create a manager from a full configuration record.
    pub fn from_config(env: E, config: &ManagerConfig) -> Result<Self, RotationError> {
        Ok(Self::from_seeds(env, &config.seeds)?.with_policy(config.policy))
    }

    /// Set the encryption key selection policy.
    #[must_use]
    pub fn with_policy(mut self, policy: EncryptionKeyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the encryption key selection policy.
    pub fn set_policy(&mut self, policy: EncryptionKeyPolicy) {
        self.policy = policy;
    }

    /// Current encryption key selection policy.
    pub fn policy(&self) -> EncryptionKeyPolicy {
        self.policy
    }

    /// Attach a stats collector, replacing any previous one.
    pub fn set_stats(&mut self, stats: SharedStats) {
        self.stats = Some(stats);
    }

    /// Detach the stats collector.
    pub fn clear_stats(&mut self) {
        self.stats = None;
    }

    /// Install a new generation of seeds.
    ///
    /// Derived keys are reused for secrets that keep their classification, so
    /// tickets already issued under them stay valid. Keys whose seeds are
    /// absent from all three lists are dropped: tickets naming them will no
    /// longer decrypt.
    ///
    /// # Errors
    ///
    /// - `NoCurrentSeeds`: `current` is empty
    /// - `EmptySeed`: any supplied secret is the empty string
    ///
    /// On error the installed generation (possibly none) is unchanged.
    pub fn set_seeds<S: AsRef<str>>(
        &mut self,
        old: &[S],
        current: &[S],
        new: &[S],
    ) -> Result<RotationReport, RotationError> {
        if let Err(error) = validate_seed_lists(old, current, new) {
            tracing::warn!(
                error = %error,
                old = old.len(),
                current = current.len(),
                new = new.len(),
                "Rejected ticket seed rotation"
            );
            if let Some(stats) = &self.stats {
                stats.record_rotation_rejected(&error);
            }
            return Err(error);
        }

        let seeds = SeedStore::from_lists(old, current, new);
        let previous = self.generation.as_ref();
        let Rebuild { registry, reused } =
            KeyRegistry::rebuild(&seeds, previous.map(|g| &g.registry));

        let mut report = RotationReport {
            reused_keys: reused,
            total_keys: registry.len(),
            ..RotationReport::default()
        };
        for classification in Classification::ALL {
            let before: HashSet<_> = previous
                .map(|g| g.seeds.by_classification(classification).map(|s| s.digest()).collect())
                .unwrap_or_default();
            let after: HashSet<_> =
                seeds.by_classification(classification).map(|s| s.digest()).collect();

            let delta = report.delta_mut(classification);
            delta.added = after.difference(&before).count();
            delta.removed = before.difference(&after).count();
        }

        self.generation = Some(KeyGeneration { seeds, registry });

        tracing::info!(
            old = old.len(),
            current = current.len(),
            new = new.len(),
            keys = report.total_keys,
            reused = report.reused_keys,
            "Installed ticket seed rotation"
        );
        if let Some(stats) = &self.stats {
            stats.record_rotation(&report);
        }

        Ok(report)
    }

    /// Install a new generation of seeds from a seed record.
    pub fn set_ticket_seeds(
        &mut self,
        seeds: &TicketSeeds,
    ) -> Result<RotationReport, RotationError> {
        self.set_seeds(
            seeds.old_seeds.as_slice(),
            seeds.current_seeds.as_slice(),
            seeds.new_seeds.as_slice(),
        )
    }

    /// Copies of the installed seed secrets, in configuration order.
    ///
    /// Empty lists if the manager was never initialized.
    pub fn seeds(&self) -> TicketSeeds {
        self.generation.as_ref().map_or_else(TicketSeeds::default, |g| TicketSeeds {
            old_seeds: g.seeds.secrets(Classification::Old),
            current_seeds: g.seeds.secrets(Classification::Current),
            new_seeds: g.seeds.secrets(Classification::New),
        })
    }

    /// Whether a generation of seeds is installed.
    pub fn is_initialized(&self) -> bool {
        self.generation.is_some()
    }

    /// Installed key registry.
    pub fn registry(&self) -> Option<&KeyRegistry> {
        self.generation.as_ref().map(|g| &g.registry)
    }

    /// Installed seed store.
    pub fn seed_store(&self) -> Option<&SeedStore> {
        self.generation.as_ref().map(|g| &g.seeds)
    }

    pub(crate) fn env(&self) -> &E {
        &self.env
    }

    pub(crate) fn stats(&self) -> Option<&SharedStats> {
        self.stats.as_ref()
    }
}

impl<E: Environment> fmt::Debug for TicketKeyManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketKeyManager")
            .field("policy", &self.policy)
            .field("initialized", &self.is_initialized())
            .field("keys", &self.registry().map_or(0, KeyRegistry::len))
            .field("stats", &self.stats.is_some())
            .finish_non_exhaustive()
    }
}

fn validate_seed_lists<S: AsRef<str>>(
    old: &[S],
    current: &[S],
    new: &[S],
) -> Result<(), RotationError> {
    if current.is_empty() {
        return Err(RotationError::NoCurrentSeeds);
    }

    for (classification, list) in Classification::ALL.into_iter().zip([old, current, new]) {
        if let Some(index) = list.iter().position(|s| s.as_ref().is_empty()) {
            return Err(RotationError::EmptySeed { classification, index });
        }
    }

    Ok(())
}
