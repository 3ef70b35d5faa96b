//! Operator commands behind the `ticketseed` binary.
//!
//! Each command takes a loaded [`ManagerConfig`] and returns a report; the
//! binary only formats it. Secrets never appear in any report.

use std::fmt;

use ticketseed_core::{
    Classification, Environment, ManagerConfig, OpenedTicket, TicketKeyManager, open_ticket,
    seal_ticket,
};
use ticketseed_crypto::{KeyName, derive_base_key, derive_key_name};

use crate::error::CliError;

/// Seed counts for a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    /// Seeds in the old list
    pub old: usize,
    /// Seeds in the current list
    pub current: usize,
    /// Seeds in the new list
    pub new: usize,
    /// Distinct derived keys
    pub keys: usize,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ok: old={} current={} new={} keys={}",
            self.old, self.current, self.new, self.keys
        )
    }
}

/// One configured seed, identified by its public key name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedSeed {
    /// List the seed was configured in
    pub classification: Classification,
    /// Derived key name
    pub name: KeyName,
}

impl fmt::Display for NamedSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8}{}", self.classification, self.name)
    }
}

fn build<E: Environment>(
    env: E,
    config: &ManagerConfig,
) -> Result<TicketKeyManager<E>, CliError> {
    Ok(TicketKeyManager::from_config(env, config)?)
}

/// Validate a configuration and count its seeds.
pub fn check<E: Environment>(env: E, config: &ManagerConfig) -> Result<CheckReport, CliError> {
    let manager = build(env, config)?;
    let seeds = manager.seeds();

    Ok(CheckReport {
        old: seeds.old_seeds.len(),
        current: seeds.current_seeds.len(),
        new: seeds.new_seeds.len(),
        keys: manager.registry().map_or(0, |r| r.len()),
    })
}

/// Key names for every configured seed, in configuration order.
pub fn names<E: Environment>(
    env: E,
    config: &ManagerConfig,
) -> Result<Vec<NamedSeed>, CliError> {
    let manager = build(env, config)?;
    let Some(store) = manager.seed_store() else {
        return Ok(Vec::new());
    };

    Ok(store
        .seeds()
        .iter()
        .map(|seed| NamedSeed {
            classification: seed.classification(),
            name: derive_key_name(&derive_base_key(seed.secret())),
        })
        .collect())
}

/// Seal `data` into a hex-encoded ticket.
pub fn seal<E: Environment>(
    env: E,
    config: &ManagerConfig,
    data: &[u8],
) -> Result<String, CliError> {
    let manager = build(env, config)?;
    Ok(hex::encode(seal_ticket(&manager, data)?))
}

/// Open a hex-encoded ticket.
pub fn open<E: Environment>(
    env: E,
    config: &ManagerConfig,
    ticket_hex: &str,
) -> Result<OpenedTicket, CliError> {
    let manager = build(env, config)?;
    let ticket = hex::decode(ticket_hex.trim())?;
    Ok(open_ticket(&manager, &ticket)?)
}

#[cfg(test)]
mod tests {
    use ticketseed_core::{RotationError, SealError, TicketSeeds};
    use ticketseed_harness::SimEnv;

    use super::*;

    fn config(old: &[&str], current: &[&str], new: &[&str]) -> ManagerConfig {
        let owned =
            |list: &[&str]| -> Vec<String> { list.iter().map(|s| (*s).to_string()).collect() };
        ManagerConfig {
            seeds: TicketSeeds {
                old_seeds: owned(old),
                current_seeds: owned(current),
                new_seeds: owned(new),
            },
            ..ManagerConfig::default()
        }
    }

    #[test]
    fn check_counts_seeds() {
        let report = check(SimEnv::new(), &config(&["a"], &["b", "c"], &[])).unwrap();

        assert_eq!(report, CheckReport { old: 1, current: 2, new: 0, keys: 3 });
        assert_eq!(report.to_string(), "ok: old=1 current=2 new=0 keys=3");
    }

    #[test]
    fn check_rejects_missing_current() {
        let result = check(SimEnv::new(), &config(&["a"], &[], &[]));
        assert!(matches!(result, Err(CliError::Rotation(RotationError::NoCurrentSeeds))));
    }

    #[test]
    fn names_never_print_secrets() {
        let config = config(&["secret-old"], &["secret-cur"], &[]);
        let named = names(SimEnv::new(), &config).unwrap();

        assert_eq!(named.len(), 2);
        assert_eq!(named[0].classification, Classification::Old);
        assert_eq!(named[0].name, derive_key_name(&derive_base_key(b"secret-old")));
        for line in named.iter().map(ToString::to_string) {
            assert!(!line.contains("secret"));
            assert_eq!(line.len(), 8 + 8);
        }
    }

    #[test]
    fn sealed_ticket_opens_after_rotation() {
        let ticket = seal(SimEnv::with_seed(1), &config(&[], &["alpha"], &[]), b"hello").unwrap();

        let opened = open(SimEnv::with_seed(2), &config(&["alpha"], &["beta"], &[]), &ticket)
            .unwrap();

        assert_eq!(opened.state, b"hello");
        assert!(opened.renew);
    }

    #[test]
    fn open_rejects_bad_input() {
        let config = config(&[], &["alpha"], &[]);

        assert!(matches!(open(SimEnv::new(), &config, "zz"), Err(CliError::Hex(_))));
        assert!(matches!(
            open(SimEnv::new(), &config, "00"),
            Err(CliError::Seal(SealError::Truncated { len: 1 }))
        ));
    }
}
