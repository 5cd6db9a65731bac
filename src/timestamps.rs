//! Timestamp assignment for batches of scrobbles.
//!
//! Both flows turn an ordered list of candidates into timestamps anchored at a
//! single point in time. The setlist flow anchors at the *last* performed song
//! and walks backward using each song's length; CSV import mode anchors at the
//! *first* row and subtracts a fixed step per row.

use crate::{Result, Scrobble, ScrobbleError, TrackCandidate};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Spacing used by the setlist flow when a song's length is unknown.
pub const SETLIST_FALLBACK_DURATION: Duration = Duration::from_secs(3 * 60);

/// Which end of the sequence receives the anchor time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The last item gets the anchor; earlier items are stepped into the past.
    Backward,
    /// The first item gets the anchor; later items are stepped into the past.
    Forward,
}

/// How far apart two adjacent items are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepSize {
    /// Use the duration of the item nearer the anchor, or `fallback` when unknown.
    TrackDuration {
        /// Spacing for items with no known duration
        fallback: Duration,
    },
    /// Use the same spacing for every item, ignoring durations.
    Fixed(Duration),
}

/// A point in time plus the rule for deriving one timestamp per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimestampAnchor {
    pub time: DateTime<Utc>,
    pub direction: Direction,
    pub step: StepSize,
}

impl TimestampAnchor {
    /// Anchor used by the setlist flow: `finished_at` is when the last song ended.
    pub fn finishing_at(finished_at: DateTime<Utc>, fallback: Duration) -> Self {
        Self {
            time: finished_at,
            direction: Direction::Backward,
            step: StepSize::TrackDuration { fallback },
        }
    }

    /// Anchor used by CSV import mode: the first row gets `start`, each
    /// following row `step` earlier than the previous one.
    pub fn starting_at(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            time: start,
            direction: Direction::Forward,
            step: StepSize::Fixed(step),
        }
    }

    /// Assign one timestamp per item. `durations` is in item order and the
    /// result is in the same order.
    ///
    /// Fails with [`ScrobbleError::TimestampRange`] when a step is too large
    /// to represent or would move a timestamp out of the supported range.
    pub fn assign(&self, durations: &[Option<Duration>]) -> Result<Vec<DateTime<Utc>>> {
        let len = durations.len();
        let mut timestamps = vec![self.time; len];
        let mut current = self.time;

        match self.direction {
            Direction::Backward => {
                for index in (0..len).rev() {
                    if index + 1 < len {
                        current = self.step_back(current, durations[index + 1])?;
                    }
                    timestamps[index] = current;
                }
            }
            Direction::Forward => {
                for index in 0..len {
                    if index > 0 {
                        current = self.step_back(current, durations[index - 1])?;
                    }
                    timestamps[index] = current;
                }
            }
        }

        Ok(timestamps)
    }

    /// Build scrobbles for `candidates`, keeping their order.
    pub fn plan<'a, I>(&self, candidates: I) -> Result<Vec<Scrobble>>
    where
        I: IntoIterator<Item = &'a TrackCandidate>,
    {
        let candidates: Vec<&TrackCandidate> = candidates.into_iter().collect();
        let durations: Vec<Option<Duration>> = candidates.iter().map(|c| c.duration).collect();

        let scrobbles: Vec<Scrobble> = candidates
            .iter()
            .zip(self.assign(&durations)?)
            .map(|(candidate, timestamp)| candidate.to_scrobble(timestamp))
            .collect();

        log::debug!(
            "Assigned {} timestamps ({:?}) anchored at {}",
            scrobbles.len(),
            self.direction,
            self.time
        );
        Ok(scrobbles)
    }

    fn step_back(&self, from: DateTime<Utc>, duration: Option<Duration>) -> Result<DateTime<Utc>> {
        let step = match self.step {
            StepSize::TrackDuration { fallback } => duration.unwrap_or(fallback),
            StepSize::Fixed(step) => step,
        };
        let secs = step.as_secs();

        let gap = i64::try_from(secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| ScrobbleError::TimestampRange(format!("step of {secs}s is too large")))?;

        from.checked_sub_signed(gap).ok_or_else(|| {
            ScrobbleError::TimestampRange(format!("{from} minus {secs}s is before the earliest date"))
        })
    }
}
