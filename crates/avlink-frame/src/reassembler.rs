use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::warn;

/// Default cap on how long a partial message may sit waiting for the rest
/// of its chunks before it is swept.
pub const DEFAULT_MAX_BUFFER_AGE: Duration = Duration::from_secs(30);

/// Reassembles chunked chat messages, tolerating out-of-order arrival and
/// interleaving across message ids.
///
/// Buffers are private to one transport session; callers must [`clear`] on
/// disconnect so partial messages never leak across reconnects.
///
/// [`clear`]: Reassembler::clear
#[derive(Debug)]
pub struct Reassembler {
    buffers: HashMap<String, Buffer>,
    max_buffer_age: Duration,
}

#[derive(Debug)]
struct Buffer {
    chunks: HashMap<u32, String>,
    total: Option<u32>,
    started: Instant,
}

/// Outcome of accepting one chunk, for progressive display: the chunk's own
/// text is surfaced immediately, and `completed` carries the full message
/// once every chunk has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkUpdate {
    /// The accepted chunk's text, in arrival order.
    pub delta: String,
    /// True when this arrival created the buffer (first chunk seen for the
    /// message id, which is not necessarily index 0).
    pub first: bool,
    /// The full message in index order, present only on completion.
    pub completed: Option<String>,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BUFFER_AGE)
    }
}

impl Reassembler {
    /// Create a reassembler with an explicit abandoned-buffer age cap.
    pub fn new(max_buffer_age: Duration) -> Self {
        Self {
            buffers: HashMap::new(),
            max_buffer_age,
        }
    }

    /// Accept one chunk of a chat message.
    ///
    /// Completion fires the instant the final chunk's index count is known
    /// and every index below it is present, regardless of arrival order; the
    /// buffer is freed at that point.
    pub fn accept_chunk(
        &mut self,
        message_id: &str,
        index: u32,
        is_final: bool,
        text: &str,
    ) -> ChunkUpdate {
        self.sweep(Instant::now());

        // The index is peer-controlled wire data; a final chunk whose count
        // (index + 1) cannot be represented is rejected outright rather than
        // recorded as a wrapped total.
        if is_final && index.checked_add(1).is_none() {
            warn!(message_id, index, "rejecting final chunk with overflowing index");
            return ChunkUpdate {
                delta: String::new(),
                first: false,
                completed: None,
            };
        }

        let first = !self.buffers.contains_key(message_id);
        let buffer = self
            .buffers
            .entry(message_id.to_string())
            .or_insert_with(|| Buffer {
                chunks: HashMap::new(),
                total: None,
                started: Instant::now(),
            });

        buffer.chunks.insert(index, text.to_string());
        if is_final {
            // The final chunk may arrive before intermediate ones. The
            // guard above makes this addition safe.
            buffer.total = Some(index + 1);
        }

        let completed = buffer.assembled();
        if completed.is_some() {
            self.buffers.remove(message_id);
        }

        ChunkUpdate {
            delta: text.to_string(),
            first,
            completed,
        }
    }

    /// Number of messages still waiting for chunks.
    pub fn pending(&self) -> usize {
        self.buffers.len()
    }

    /// Drop all partial messages. Called on disconnect.
    pub fn clear(&mut self) {
        if !self.buffers.is_empty() {
            warn!(
                pending = self.buffers.len(),
                "discarding partial messages on clear"
            );
        }
        self.buffers.clear();
    }

    fn sweep(&mut self, now: Instant) {
        let max_age = self.max_buffer_age;
        self.buffers.retain(|message_id, buffer| {
            let keep = now.duration_since(buffer.started) < max_age;
            if !keep {
                warn!(message_id, "sweeping abandoned reassembly buffer");
            }
            keep
        });
    }
}

impl Buffer {
    fn assembled(&self) -> Option<String> {
        let total = self.total?;
        let mut out = String::new();
        for index in 0..total {
            out.push_str(self.chunks.get(&index)?);
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_final_chunk_completes_immediately() {
        let mut reassembler = Reassembler::default();
        let update = reassembler.accept_chunk("m", 0, true, "whole");

        assert!(update.first);
        assert_eq!(update.delta, "whole");
        assert_eq!(update.completed.as_deref(), Some("whole"));
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn in_order_chunks_complete_on_final() {
        let mut reassembler = Reassembler::default();

        let u0 = reassembler.accept_chunk("m", 0, false, "a");
        assert!(u0.first);
        assert!(u0.completed.is_none());

        let u1 = reassembler.accept_chunk("m", 1, false, "b");
        assert!(!u1.first);
        assert!(u1.completed.is_none());

        let u2 = reassembler.accept_chunk("m", 2, true, "c");
        assert_eq!(u2.completed.as_deref(), Some("abc"));
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn out_of_order_2_0_1_completes_only_on_third() {
        let mut reassembler = Reassembler::default();

        let u2 = reassembler.accept_chunk("m", 2, true, "C");
        assert!(u2.first);
        assert!(u2.completed.is_none());

        let u0 = reassembler.accept_chunk("m", 0, false, "A");
        assert!(!u0.first);
        assert!(u0.completed.is_none());

        let u1 = reassembler.accept_chunk("m", 1, false, "B");
        // Index order, not arrival order.
        assert_eq!(u1.completed.as_deref(), Some("ABC"));
    }

    #[test]
    fn any_permutation_reassembles_exactly() {
        let chunks = ["one ", "two ", "three ", "four"];
        let permutations: &[[usize; 4]] = &[
            [0, 1, 2, 3],
            [3, 2, 1, 0],
            [2, 0, 3, 1],
            [1, 3, 0, 2],
            [3, 0, 1, 2],
        ];

        for order in permutations {
            let mut reassembler = Reassembler::default();
            let mut completed = None;
            for (n, &i) in order.iter().enumerate() {
                let update =
                    reassembler.accept_chunk("m", i as u32, i == chunks.len() - 1, chunks[i]);
                if n < order.len() - 1 {
                    assert!(update.completed.is_none(), "early completion in {order:?}");
                } else {
                    completed = update.completed;
                }
            }
            assert_eq!(completed.as_deref(), Some("one two three four"));
        }
    }

    #[test]
    fn interleaved_message_ids_do_not_collide() {
        let mut reassembler = Reassembler::default();

        reassembler.accept_chunk("a", 0, false, "a0 ");
        reassembler.accept_chunk("b", 0, false, "b0 ");
        let ua = reassembler.accept_chunk("a", 1, true, "a1");
        assert_eq!(ua.completed.as_deref(), Some("a0 a1"));
        assert_eq!(reassembler.pending(), 1);

        let ub = reassembler.accept_chunk("b", 1, true, "b1");
        assert_eq!(ub.completed.as_deref(), Some("b0 b1"));
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn duplicate_chunk_overwrites_without_completing_early() {
        let mut reassembler = Reassembler::default();
        reassembler.accept_chunk("m", 0, false, "first");
        reassembler.accept_chunk("m", 0, false, "again");
        let update = reassembler.accept_chunk("m", 1, true, "!");
        assert_eq!(update.completed.as_deref(), Some("again!"));
    }

    #[test]
    fn clear_discards_partials() {
        let mut reassembler = Reassembler::default();
        reassembler.accept_chunk("m", 0, false, "partial");
        assert_eq!(reassembler.pending(), 1);

        reassembler.clear();
        assert_eq!(reassembler.pending(), 0);

        // A fresh final chunk after clear completes as its own message.
        let update = reassembler.accept_chunk("m", 0, true, "fresh");
        assert_eq!(update.completed.as_deref(), Some("fresh"));
    }

    #[test]
    fn final_chunk_at_index_limit_is_rejected() {
        let mut reassembler = Reassembler::default();

        // A hostile final chunk whose count would wrap must not panic,
        // create a buffer, or complete as an empty message.
        let update = reassembler.accept_chunk("m", u32::MAX, true, "x");
        assert!(!update.first);
        assert!(update.delta.is_empty());
        assert!(update.completed.is_none());
        assert_eq!(reassembler.pending(), 0);

        // An in-progress message with the same id is untouched.
        reassembler.accept_chunk("m", 0, false, "a");
        reassembler.accept_chunk("m", u32::MAX, true, "x");
        assert_eq!(reassembler.pending(), 1);
        let update = reassembler.accept_chunk("m", 1, true, "b");
        assert_eq!(update.completed.as_deref(), Some("ab"));
    }

    #[test]
    fn stale_buffers_are_swept() {
        let mut reassembler = Reassembler::new(Duration::from_millis(0));
        reassembler.accept_chunk("stale", 0, false, "x");
        assert_eq!(reassembler.pending(), 1);

        // Zero max age: the next accept sweeps the abandoned buffer, so the
        // stale message id starts over.
        let update = reassembler.accept_chunk("stale", 1, true, "y");
        assert!(update.first);
        assert!(update.completed.is_none());
    }
}
