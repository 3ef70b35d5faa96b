//! Observer interface for rotation and ticket events.
//!
//! Every method has a no-op default, so collectors only implement what they
//! record. A manager without a collector skips reporting entirely.

use crate::{error::RotationError, seed::Classification};

/// Outcome of a single ticket callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketEvent {
    /// A new ticket was issued under a current or new key
    Issued,
    /// A ticket was decrypted with a current or new key
    Resumed,
    /// A ticket was decrypted with an old key; the client gets a fresh ticket
    Renewed,
    /// A ticket named a key this manager does not hold
    UnknownKey,
    /// Processing failed for this call
    Failed,
}

/// Seed additions and removals for one classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedDelta {
    /// Seeds present now but not before
    pub added: usize,
    /// Seeds present before but not now
    pub removed: usize,
}

/// Summary of a successful rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationReport {
    /// Changes to the old list
    pub old: SeedDelta,
    /// Changes to the current list
    pub current: SeedDelta,
    /// Changes to the new list
    pub new: SeedDelta,
    /// Derived keys carried over from the previous generation
    pub reused_keys: usize,
    /// Derived keys installed by this rotation
    pub total_keys: usize,
}

impl RotationReport {
    /// Delta for one classification.
    pub fn delta(&self, classification: Classification) -> SeedDelta {
        match classification {
            Classification::Old => self.old,
            Classification::Current => self.current,
            Classification::New => self.new,
        }
    }

    pub(crate) fn delta_mut(&mut self, classification: Classification) -> &mut SeedDelta {
        match classification {
            Classification::Old => &mut self.old,
            Classification::Current => &mut self.current,
            Classification::New => &mut self.new,
        }
    }

    /// Whether the rotation changed any seed list.
    pub fn is_unchanged(&self) -> bool {
        Classification::ALL.iter().all(|&c| self.delta(c) == SeedDelta::default())
    }
}

/// Stats collaborator notified synchronously by the manager.
///
/// Called inline on the handshake path: implementations must not block.
pub trait TicketStats {
    /// A rotation was installed.
    fn record_rotation(&self, _report: &RotationReport) {}

    /// A rotation was rejected; the previous keys remain installed.
    fn record_rotation_rejected(&self, _error: &RotationError) {}

    /// A ticket callback completed.
    fn record_ticket(&self, _event: TicketEvent) {}
}

/// Collector that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStats;

impl TicketStats for NoopStats {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_report_is_unchanged() {
        assert!(RotationReport::default().is_unchanged());
    }

    #[test]
    fn delta_mut_targets_classification() {
        let mut report = RotationReport::default();
        report.delta_mut(Classification::New).added = 2;
        report.delta_mut(Classification::Old).removed = 1;

        assert_eq!(report.new, SeedDelta { added: 2, removed: 0 });
        assert_eq!(report.delta(Classification::Old), SeedDelta { added: 0, removed: 1 });
        assert!(!report.is_unchanged());
    }
}
