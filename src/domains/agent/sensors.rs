use crate::domains::allocation::AgentMessage;
use crate::domains::level::SensorUpdate;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct SensorSlot {
    latest: Option<SensorUpdate>,
    revision: u64,
}

/// Handle the host uses to push sensor readings. Storing never blocks on the
/// decide tick: the lock is held only to swap the snapshot.
#[derive(Debug, Clone, Default)]
pub struct SensorPort {
    slot: Arc<Mutex<SensorSlot>>,
}

impl SensorPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sensors_updated(&self, update: SensorUpdate) {
        let mut slot = self.slot.lock();
        slot.latest = Some(update);
        slot.revision += 1;
    }

    /// Latest reading if it is newer than `seen_revision`.
    pub fn newer_than(&self, seen_revision: u64) -> Option<(u64, SensorUpdate)> {
        let slot = self.slot.lock();
        if slot.revision <= seen_revision {
            return None;
        }
        slot.latest.clone().map(|update| (slot.revision, update))
    }

    pub fn revision(&self) -> u64 {
        self.slot.lock().revision
    }

    pub fn clear(&self) {
        let mut slot = self.slot.lock();
        slot.latest = None;
    }
}

/// Messages waiting to be carried to the peer, in send order.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    messages: Arc<Mutex<Vec<AgentMessage>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: AgentMessage) {
        self.messages.lock().push(message);
    }

    pub fn drain(&self) -> Vec<AgentMessage> {
        std::mem::take(&mut *self.messages.lock())
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}
