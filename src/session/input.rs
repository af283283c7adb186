use std::sync::Mutex;

/// Latest encoded input waiting for the next tick. Last write wins.
///
/// This is the only state shared between the input side and the tick
/// driver.
#[derive(Debug, Default)]
pub struct InputSlot {
    pending: Mutex<Option<Vec<u8>>>,
}

impl InputSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, input: Vec<u8>) {
        let mut pending = self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *pending = Some(input);
    }

    pub fn take(&self) -> Option<Vec<u8>> {
        let mut pending = self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        pending.take()
    }
}
