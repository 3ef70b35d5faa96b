//! Configuration records for ticket seeds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{registry::EncryptionKeyPolicy, seed::Classification};

/// The three seed lists distributed to every server in a fleet.
///
/// Recommended rotation takes three pushes:
/// 1. Introduce the next seed under `new_seeds`
/// 2. Move it to `current_seeds`, move the previous current seed to
///    `old_seeds`
/// 3. Drop the old seed once issued tickets have expired
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketSeeds {
    /// Seeds previously used which can still decrypt
    pub old_seeds: Vec<String>,
    /// Seeds used for new ticket encryptions
    pub current_seeds: Vec<String>,
    /// Seeds which will be used soon; decrypt tickets from servers that
    /// rotated first
    pub new_seeds: Vec<String>,
}

impl TicketSeeds {
    /// Seed list for one classification.
    pub fn list(&self, classification: Classification) -> &[String] {
        match classification {
            Classification::Old => &self.old_seeds,
            Classification::Current => &self.current_seeds,
            Classification::New => &self.new_seeds,
        }
    }

    /// Total number of seeds across all lists.
    pub fn len(&self) -> usize {
        self.old_seeds.len() + self.current_seeds.len() + self.new_seeds.len()
    }

    /// Whether every list is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for TicketSeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketSeeds")
            .field("old_seeds", &self.old_seeds.len())
            .field("current_seeds", &self.current_seeds.len())
            .field("new_seeds", &self.new_seeds.len())
            .finish()
    }
}

/// Full manager configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Seed lists
    #[serde(flatten)]
    pub seeds: TicketSeeds,
    /// Encryption key selection policy
    pub policy: EncryptionKeyPolicy,
}
