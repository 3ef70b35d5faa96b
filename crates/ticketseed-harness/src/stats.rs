//! Stats collector that keeps everything it is told.

use std::sync::{Arc, Mutex, PoisonError};

use ticketseed_core::{RotationError, RotationReport, SharedStats, TicketEvent, TicketStats};

/// Collector recording rotations and ticket events in arrival order.
#[derive(Debug, Default)]
pub struct RecordingStats {
    rotations: Mutex<Vec<RotationReport>>,
    rejections: Mutex<Vec<RotationError>>,
    tickets: Mutex<Vec<TicketEvent>>,
}

impl RecordingStats {
    /// Create a shared collector.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Upcast for [`ticketseed_core::TicketKeyManager::set_stats`].
    pub fn handle(self: &Arc<Self>) -> SharedStats {
        Arc::clone(self) as SharedStats
    }

    /// Installed rotations.
    pub fn rotations(&self) -> Vec<RotationReport> {
        self.rotations.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Rejected rotations.
    pub fn rejections(&self) -> Vec<RotationError> {
        self.rejections.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Ticket outcomes.
    pub fn tickets(&self) -> Vec<TicketEvent> {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of ticket outcomes of one kind.
    pub fn count(&self, event: TicketEvent) -> usize {
        let tickets = self.tickets.lock().unwrap_or_else(PoisonError::into_inner);
        tickets.iter().filter(|&&e| e == event).count()
    }
}

impl TicketStats for RecordingStats {
    fn record_rotation(&self, report: &RotationReport) {
        self.rotations.lock().unwrap_or_else(PoisonError::into_inner).push(*report);
    }

    fn record_rotation_rejected(&self, error: &RotationError) {
        self.rejections.lock().unwrap_or_else(PoisonError::into_inner).push(error.clone());
    }

    fn record_ticket(&self, event: TicketEvent) {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}
