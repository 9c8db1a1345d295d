//! Instruction queue.
//!
//! A FIFO of program indices. The frontend is strictly in program order:
//! only the head is examined for issue, and the queue is never re-ordered.
//! A taken branch flushes the queue and reloads it from the target index.

use std::collections::VecDeque;

/// FIFO of pending program indices.
pub struct InstructionQueue {
    entries: VecDeque<usize>,
}

impl InstructionQueue {
    /// Creates a queue filled with indices `0..program_len`.
    pub fn new(program_len: usize) -> Self {
        Self {
            entries: (0..program_len).collect(),
        }
    }

    /// Returns the program index at the head, if any.
    #[inline]
    pub fn head(&self) -> Option<usize> {
        self.entries.front().copied()
    }

    /// Removes and returns the head. Called only when the head issues.
    pub fn dequeue(&mut self) -> Option<usize> {
        self.entries.pop_front()
    }

    /// Returns the number of queued instructions.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flushes the queue and refills it with `target..program_len`.
    ///
    /// Used on a taken branch: everything past the branch is discarded and
    /// the stream restarts at the target.
    pub fn reload(&mut self, target: usize, program_len: usize) {
        self.entries.clear();
        self.entries.extend(target..program_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut iq = InstructionQueue::new(3);
        assert_eq!(iq.len(), 3);
        assert_eq!(iq.head(), Some(0));
        assert_eq!(iq.dequeue(), Some(0));
        assert_eq!(iq.head(), Some(1));
    }

    #[test]
    fn test_reload() {
        let mut iq = InstructionQueue::new(5);
        iq.dequeue();
        iq.reload(3, 5);
        assert_eq!(iq.len(), 2);
        assert_eq!(iq.head(), Some(3));
        assert_eq!(iq.dequeue(), Some(3));
        assert_eq!(iq.dequeue(), Some(4));
        assert!(iq.is_empty());
    }

    #[test]
    fn test_reload_past_end_is_empty() {
        let mut iq = InstructionQueue::new(2);
        iq.reload(2, 2);
        assert!(iq.is_empty());
    }
}
