// src/analysis/position_history.rs
//
// Per-track last-known position plus counting-state bookkeeping. The store
// is keyed by the external tracker's IDs and cannot tell a reused ID from a
// continued track; a reused ID continues the old entry.
//
// Entries are evicted after `ttl_frames` without an observation so the map
// stays bounded on an unbounded stream of track IDs.

use crate::types::CrossingState;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct TrackEntry {
    pub last_position: (i32, i32),
    pub crossing_state: CrossingState,
    pub last_seen_frame: u64,
}

pub struct PositionHistoryStore {
    entries: HashMap<u64, TrackEntry>,
    ttl_frames: u64,
}

impl PositionHistoryStore {
    pub fn new(ttl_frames: u64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_frames,
        }
    }

    /// Record `position` for `track_id` and return the previously stored
    /// position. None on first sighting, in which case the caller skips
    /// speed and crossing computation for this frame.
    pub fn update(&mut self, track_id: u64, position: (i32, i32), frame_id: u64) -> Option<(i32, i32)> {
        match self.entries.entry(track_id) {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.get().last_position;
                let entry = occupied.get_mut();
                entry.last_position = position;
                entry.last_seen_frame = frame_id;
                Some(previous)
            }
            Entry::Vacant(vacant) => {
                debug!(
                    "Track {} first seen at ({}, {}) on frame {}",
                    track_id, position.0, position.1, frame_id
                );
                vacant.insert(TrackEntry {
                    last_position: position,
                    crossing_state: CrossingState::Uncounted,
                    last_seen_frame: frame_id,
                });
                None
            }
        }
    }

    /// Counting state for a track; Uncounted for tracks never stored
    pub fn crossing_state(&self, track_id: u64) -> CrossingState {
        self.entries
            .get(&track_id)
            .map(|e| e.crossing_state)
            .unwrap_or(CrossingState::Uncounted)
    }

    pub fn set_crossing_state(&mut self, track_id: u64, state: CrossingState) {
        if let Some(entry) = self.entries.get_mut(&track_id) {
            entry.crossing_state = state;
        }
    }

    /// Evict entries unseen for more than the TTL. Returns the eviction count.
    pub fn prune(&mut self, current_frame: u64) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl_frames;
        self.entries.retain(|track_id, entry| {
            let unseen = current_frame.saturating_sub(entry.last_seen_frame);
            if unseen > ttl {
                info!("Track {} pruned (unseen for {} frames)", track_id, unseen);
                return false;
            }
            true
        });
        before - self.entries.len()
    }

    pub fn contains(&self, track_id: u64) -> bool {
        self.entries.contains_key(&track_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
