//! Fixed-capacity ring of recent frames backing the waterfall.
//!
//! The ring never shrinks or grows: `capacity` equals the number of waterfall
//! rows. `input_count` counts every frame ever pushed and is never reset, so
//! `input_count - n` identifies the frame pushed `n` frames ago regardless of
//! how many times the write index has wrapped.

use crate::types::Frame;

pub struct History {
    slots: Vec<Option<Frame>>,
    write_index: usize,
    input_count: u64,
    /// Start time (s) of the oldest frame still held.
    oldest_time: f64,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity],
            write_index: 0,
            input_count: 0,
            oldest_time: 0.0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn input_count(&self) -> u64 {
        self.input_count
    }

    pub fn write_index(&self) -> usize {
        self.write_index
    }

    pub fn oldest_time(&self) -> f64 {
        self.oldest_time
    }

    pub fn is_empty(&self) -> bool {
        self.input_count == 0
    }

    /// Store a frame at the write index and advance.
    ///
    /// Once the ring is full, the slot one past the write index holds the
    /// oldest frame that survives this write; its start time becomes the new
    /// oldest time. It is read before anything is overwritten.
    pub fn push(&mut self, frame: Frame) {
        let capacity = self.slots.len();
        if self.input_count == 0 {
            self.oldest_time = frame.start.as_secs_f64();
        } else if self.input_count >= capacity as u64 {
            let next = (self.write_index + 1) % capacity;
            if let Some(oldest) = &self.slots[next] {
                self.oldest_time = oldest.start.as_secs_f64();
            }
            if self.write_index == 0 {
                log::debug!("history wrapped after {} frames", self.input_count);
            }
        }
        self.slots[self.write_index] = Some(frame);
        self.write_index = (self.write_index + 1) % capacity;
        self.input_count += 1;
    }

    /// Frame stored in a raw slot, if that slot has been written.
    pub fn slot(&self, index: usize) -> Option<&Frame> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// Frame displayed at logical waterfall `row`.
    ///
    /// The slot is `(input_count - row) mod capacity`. Rows further back than
    /// anything ever written, and slots not yet filled, resolve to `None`.
    pub fn frame_at_row(&self, row: u64) -> Option<&Frame> {
        if row > self.input_count {
            return None;
        }
        let index = ((self.input_count - row) % self.slots.len() as u64) as usize;
        self.slot(index)
    }
}
