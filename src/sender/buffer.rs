//! Pending buffer retaining bytes from failed sends.

/// Outcome of recording a failed send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retention {
    /// The combined bytes were kept for the next attempt.
    Kept(usize),
    /// The combined bytes exceeded the ceiling and were discarded.
    Dropped(usize),
}

/// Unsent bytes carried over to the next send.
///
/// Holds data only while the most recent attempt failed and the retained
/// size is within the ceiling. Data is always cleared as a whole.
#[derive(Debug)]
pub struct PendingBuffer {
    bytes: Option<Vec<u8>>,
    ceiling: usize,
}

impl PendingBuffer {
    pub fn new(ceiling: usize) -> Self {
        Self {
            bytes: None,
            ceiling,
        }
    }

    /// Take the pending bytes and append `new` after them.
    ///
    /// Older bytes always precede newer ones so the collector sees events in
    /// submission order.
    pub fn combine(&mut self, new: Vec<u8>) -> Vec<u8> {
        match self.bytes.take() {
            Some(mut pending) => {
                pending.extend_from_slice(&new);
                pending
            }
            None => new,
        }
    }

    /// Forget everything after a successful write.
    pub fn clear(&mut self) {
        self.bytes = None;
    }

    /// Retain `combined` for a retry unless it exceeds the ceiling.
    pub fn retain(&mut self, combined: Vec<u8>) -> Retention {
        let len = combined.len();
        if len > self.ceiling {
            self.bytes = None;
            Retention::Dropped(len)
        } else {
            self.bytes = (!combined.is_empty()).then_some(combined);
            Retention::Kept(len)
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn len(&self) -> usize {
        self.bytes.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_none()
    }
}
