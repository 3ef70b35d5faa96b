//! Property tests for the ticket key manager.

use std::collections::HashSet;

use proptest::prelude::*;
use ticketseed_core::{
    Classification, EncryptionKeyPolicy, TicketKeyManager, TicketSeeds, open_ticket, seal_ticket,
};
use ticketseed_harness::SimEnv;

fn secret() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,12}"
}

fn seed_lists() -> impl Strategy<Value = TicketSeeds> {
    (
        prop::collection::vec(secret(), 0..3),
        prop::collection::vec(secret(), 1..4),
        prop::collection::vec(secret(), 0..3),
    )
        .prop_map(|(old_seeds, current_seeds, new_seeds)| TicketSeeds {
            old_seeds,
            current_seeds,
            new_seeds,
        })
}

fn distinct(seeds: &TicketSeeds) -> usize {
    Classification::ALL.iter().flat_map(|&c| seeds.list(c)).collect::<HashSet<_>>().len()
}

proptest! {
    #[test]
    fn registry_holds_one_key_per_distinct_secret(seeds in seed_lists()) {
        let manager = TicketKeyManager::from_seeds(SimEnv::new(), &seeds).unwrap();

        prop_assert_eq!(manager.registry().unwrap().len(), distinct(&seeds));
    }

    #[test]
    fn same_seeds_yield_same_key_names(seeds in seed_lists(), a in any::<u64>(), b in any::<u64>()) {
        let first = TicketKeyManager::from_seeds(SimEnv::with_seed(a), &seeds).unwrap();
        let second = TicketKeyManager::from_seeds(SimEnv::with_seed(b), &seeds).unwrap();

        let names = |m: &TicketKeyManager<SimEnv>| -> HashSet<_> {
            m.registry().unwrap().keys().map(|k| k.name()).collect()
        };
        prop_assert_eq!(names(&first), names(&second));
        prop_assert_eq!(
            first.registry().unwrap().encryption_keys(),
            second.registry().unwrap().encryption_keys()
        );
    }

    #[test]
    fn sealed_state_opens_on_peer(
        seeds in seed_lists(),
        state in prop::collection::vec(any::<u8>(), 0..256),
        spread in any::<bool>(),
    ) {
        let policy = if spread {
            EncryptionKeyPolicy::SpreadCurrent
        } else {
            EncryptionKeyPolicy::FirstConfigured
        };
        let issuer = TicketKeyManager::from_seeds(SimEnv::with_seed(1), &seeds)
            .unwrap()
            .with_policy(policy);
        let peer = TicketKeyManager::from_seeds(SimEnv::with_seed(2), &seeds).unwrap();

        let ticket = seal_ticket(&issuer, &state).unwrap();
        let opened = open_ticket(&peer, &ticket).unwrap();

        prop_assert_eq!(opened.state, state);
        prop_assert!(!opened.renew, "tickets sealed with a current key never ask for renewal");
    }

    #[test]
    fn encryption_only_uses_current_keys(seeds in seed_lists(), rounds in 1usize..16) {
        let manager = TicketKeyManager::from_seeds(SimEnv::with_seed(3), &seeds)
            .unwrap()
            .with_policy(EncryptionKeyPolicy::SpreadCurrent);
        let registry = manager.registry().unwrap();

        for _ in 0..rounds {
            let issued = manager.issue_ticket_keys().unwrap();
            let key = registry.lookup_for_decrypt(&issued.key_name.key_name()).unwrap();
            prop_assert_eq!(key.classification(), Classification::Current);
        }
    }

    #[test]
    fn seeds_round_trip(seeds in seed_lists()) {
        let manager = TicketKeyManager::from_seeds(SimEnv::new(), &seeds).unwrap();

        prop_assert_eq!(manager.seeds(), seeds);
    }
}
