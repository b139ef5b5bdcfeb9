//! Interpretation history.
//!
//! Remembers the frames of the most recent interpretations so that, with
//! `USE_HISTORY` on, a parse that continues the conversation's topic wins a
//! tie against one that changes it.

use std::collections::VecDeque;

use phoenix_grammar::FrameId;

/// Frames remembered.
pub const HIST_LEN: usize = 5;

// =============================================================================
// Frame History
// =============================================================================

/// A ring of recently chosen frames, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameHistory {
    frames: VecDeque<FrameId>,
}

impl FrameHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(HIST_LEN),
        }
    }

    /// Records a chosen frame, evicting the oldest when full.
    ///
    /// A frame already present moves to the front instead of taking a
    /// second cell.
    pub fn push(&mut self, frame: FrameId) {
        self.frames.retain(|&f| f != frame);
        self.frames.push_front(frame);
        self.frames.truncate(HIST_LEN);
    }

    /// How recently `frame` was used: `HIST_LEN` for the newest entry down
    /// to 1 for the oldest, 0 if absent.
    #[must_use]
    pub fn recency(&self, frame: FrameId) -> usize {
        self.frames
            .iter()
            .position(|&f| f == frame)
            .map_or(0, |age| HIST_LEN - age)
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Frames, newest first.
    pub fn iter(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.frames.iter().copied()
    }

    /// Returns the number of remembered frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if nothing is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
