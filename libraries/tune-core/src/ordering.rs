//! Dense track ordering within a playlist
//!
//! A playlist with N entries always holds exactly the positions `1..=N`, one
//! track per position and each track at most once. Every mutation is planned
//! here first: [`TrackOrder`] computes the complete set of position changes a
//! request implies, and the storage layer then writes that set as one batch
//! inside a single transaction. Nothing in this module touches a database,
//! so the planner can be exercised exhaustively in tests.
//!
//! ```text
//! insert D at 2      move C to 1        remove A
//! A:1  A:1           A:1  C:1           A:1  ─
//! B:2  D:2 (new)     B:2  A:2 (+1)      B:2  B:1 (-1)
//! C:3  B:3 (+1)      C:3  B:3 (+1)      C:3  C:2 (-1)
//!      C:4 (+1)
//! ```
//!
//! # Example
//!
//! ```
//! use tune_core::ordering::TrackOrder;
//! use tune_core::types::TrackId;
//!
//! let (a, b, c) = (TrackId::new(1), TrackId::new(2), TrackId::new(3));
//! let mut order = TrackOrder::from_tracks(vec![a, b, c]);
//!
//! let plan = order.plan_move(b, 1).unwrap();
//! assert_eq!(plan.shifts().len(), 1);
//! order.apply(&plan);
//!
//! assert_eq!(order.tracks(), &[b, a, c]);
//! ```

use crate::error::{Result, TuneError};
use crate::types::TrackId;
use std::collections::HashSet;

/// One existing entry whose position changes by exactly one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub track_id: TrackId,
    pub from: i64,
    pub to: i64,
}

/// The entry a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A new entry is created at `position`
    Insert { track_id: TrackId, position: i64 },
    /// An existing entry moves from `from` to `to`
    Move { track_id: TrackId, from: i64, to: i64 },
    /// The entry at `position` is deleted
    Remove { track_id: TrackId, position: i64 },
}

/// Every position change a single request implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    change: Change,
    shifts: Vec<Shift>,
}

impl ReorderPlan {
    pub fn change(&self) -> Change {
        self.change
    }

    /// Entries other than the target that move by one slot
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    /// A move to the entry's current position
    pub fn is_noop(&self) -> bool {
        matches!(self.change, Change::Move { from, to, .. } if from == to)
    }

    /// Final `(track, position)` for every pre-existing row this plan rewrites.
    ///
    /// Inserted and removed rows are not included; the storage layer creates
    /// or deletes those itself.
    pub fn assignments(&self) -> Vec<(TrackId, i64)> {
        let mut out: Vec<(TrackId, i64)> =
            self.shifts.iter().map(|s| (s.track_id, s.to)).collect();
        if let Change::Move { track_id, from, to } = self.change {
            if from != to {
                out.push((track_id, to));
            }
        }
        out
    }
}

/// In-memory image of a playlist's ordering
///
/// Index `i` of the backing vector holds the track at position `i + 1`, so the
/// density invariant holds by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackOrder {
    slots: Vec<TrackId>,
}

impl TrackOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an order from tracks already in playback order
    pub fn from_tracks(tracks: Vec<TrackId>) -> Self {
        Self { slots: tracks }
    }

    /// Rebuild an order from stored `(track, position)` rows.
    ///
    /// Fails if the rows are not a dense `1..=N` sequence or repeat a track;
    /// either means the stored playlist is corrupt.
    pub fn from_positions(rows: impl IntoIterator<Item = (TrackId, i64)>) -> Result<Self> {
        let mut rows: Vec<(TrackId, i64)> = rows.into_iter().collect();
        rows.sort_by_key(|&(_, position)| position);

        let mut seen = HashSet::with_capacity(rows.len());
        for (index, &(track_id, position)) in rows.iter().enumerate() {
            let expected = index as i64 + 1;
            if position != expected {
                return Err(TuneError::storage(format!(
                    "playlist ordering is not dense: expected position {}, found {}",
                    expected, position
                )));
            }
            if !seen.insert(track_id) {
                return Err(TuneError::storage(format!(
                    "track {} appears twice in playlist ordering",
                    track_id
                )));
            }
        }

        Ok(Self {
            slots: rows.into_iter().map(|(track_id, _)| track_id).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Tracks in position order
    pub fn tracks(&self) -> &[TrackId] {
        &self.slots
    }

    pub fn contains(&self, track_id: TrackId) -> bool {
        self.slots.contains(&track_id)
    }

    /// 1-based position of a track
    pub fn position_of(&self, track_id: TrackId) -> Option<i64> {
        self.slots
            .iter()
            .position(|&t| t == track_id)
            .map(|index| index as i64 + 1)
    }

    /// `(track, position)` pairs in ascending position
    pub fn positions(&self) -> impl Iterator<Item = (TrackId, i64)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, &track_id)| (track_id, index as i64 + 1))
    }

    /// Plan adding `track_id`, at the end or at `requested`.
    ///
    /// `requested` must lie in `1..=N+1`; out of range is rejected rather than
    /// clamped. Every entry at or after the requested position moves back one.
    pub fn plan_insert(&self, track_id: TrackId, requested: Option<i64>) -> Result<ReorderPlan> {
        if self.contains(track_id) {
            return Err(TuneError::conflict("Track is already in playlist"));
        }

        let end = self.len() as i64 + 1;
        let position = match requested {
            None => end,
            Some(p) if (1..=end).contains(&p) => p,
            Some(p) => {
                return Err(TuneError::invalid_input(format!(
                    "position {} is out of range 1..={}",
                    p, end
                )))
            }
        };

        let shifts = self
            .positions()
            .filter(|&(_, current)| current >= position)
            .map(|(track_id, current)| Shift {
                track_id,
                from: current,
                to: current + 1,
            })
            .collect();

        Ok(ReorderPlan {
            change: Change::Insert { track_id, position },
            shifts,
        })
    }

    /// Plan moving an existing entry to `new_position` in `1..=N`.
    ///
    /// Moving later pulls the entries in `(current, new]` forward one slot;
    /// moving earlier pushes the entries in `[new, current)` back one slot.
    /// Moving to the current position yields an empty no-op plan.
    pub fn plan_move(&self, track_id: TrackId, new_position: i64) -> Result<ReorderPlan> {
        let current = self.position_of(track_id).ok_or_else(|| not_in_playlist(track_id))?;

        let len = self.len() as i64;
        if !(1..=len).contains(&new_position) {
            return Err(TuneError::invalid_input(format!(
                "position {} is out of range 1..={}",
                new_position, len
            )));
        }

        let shifts = if new_position > current {
            self.positions()
                .filter(|&(_, p)| p > current && p <= new_position)
                .map(|(track_id, p)| Shift {
                    track_id,
                    from: p,
                    to: p - 1,
                })
                .collect()
        } else {
            self.positions()
                .filter(|&(_, p)| p >= new_position && p < current)
                .map(|(track_id, p)| Shift {
                    track_id,
                    from: p,
                    to: p + 1,
                })
                .collect()
        };

        Ok(ReorderPlan {
            change: Change::Move {
                track_id,
                from: current,
                to: new_position,
            },
            shifts,
        })
    }

    /// Plan deleting an entry; everything after it moves forward one slot
    pub fn plan_remove(&self, track_id: TrackId) -> Result<ReorderPlan> {
        let position = self.position_of(track_id).ok_or_else(|| not_in_playlist(track_id))?;

        let shifts = self
            .positions()
            .filter(|&(_, p)| p > position)
            .map(|(track_id, p)| Shift {
                track_id,
                from: p,
                to: p - 1,
            })
            .collect();

        Ok(ReorderPlan {
            change: Change::Remove {
                track_id,
                position,
            },
            shifts,
        })
    }

    /// Apply a plan produced by this order.
    ///
    /// Plans are only valid against the state they were computed from; this
    /// mirrors what the storage layer commits.
    pub fn apply(&mut self, plan: &ReorderPlan) {
        match plan.change {
            Change::Insert { track_id, position } => {
                self.slots.insert((position - 1) as usize, track_id);
            }
            Change::Move { track_id, from, to } => {
                let moved = self.slots.remove((from - 1) as usize);
                debug_assert_eq!(moved, track_id);
                self.slots.insert((to - 1) as usize, moved);
            }
            Change::Remove { track_id, position } => {
                let removed = self.slots.remove((position - 1) as usize);
                debug_assert_eq!(removed, track_id);
            }
        }
    }
}

fn not_in_playlist(track_id: TrackId) -> TuneError {
    TuneError::not_found("Playlist entry for track", track_id)
}
