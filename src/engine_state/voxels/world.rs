//! # World Module
//!
//! This module provides the `ChunkWindow`, the square of chunks kept resident around the
//! player.
//!
//! ## Layout
//!
//! With render distance `R` the window holds every chunk within Chebyshev distance
//! `R + 1` of its center, a `(2R + 3) x (2R + 3)` grid of slots:
//!
//! - ring `0..=R` is visible: its blocks have visual instances
//! - ring `R + 1` is resident but not rendered, so that visibility on the edge of the
//!   visible area can read real neighbours
//!
//! ## Ownership
//!
//! Each slot owns its chunk outright. Chunks move into the window when they are loaded or
//! generated and move out when they are evicted; nothing else holds a reference across
//! frames.

use bitvec::vec::BitVec;
use log::debug;

use super::{
    chunk::{Chunk, ChunkPosition},
    mob::MobSnapshot,
    visibility::NeighborChunks,
};

/// A resident chunk and its streaming state.
#[derive(Debug, Clone)]
pub struct WindowSlot {
    pub chunk: Chunk,
    /// One bit per block once the chunk has been rendered; `None` while it has no visual
    /// instances.
    pub visible: Option<BitVec>,
    /// Live mob list, seeded from the chunk's mob file the first time it is needed.
    /// `None` means untracked, and an untracked list is never written back.
    pub mobs: Option<Vec<MobSnapshot>>,
    /// Leading entries of `mobs` read from disk but not yet handed to the sink.
    pub unspawned_mobs: usize,
    /// Whether the saved mobs of this residency have been spawned.
    pub mobs_spawned: bool,
}

impl WindowSlot {
    pub fn new(chunk: Chunk) -> Self {
        Self {
            chunk,
            visible: None,
            mobs: None,
            unspawned_mobs: 0,
            mobs_spawned: false,
        }
    }

    pub fn position(&self) -> ChunkPosition {
        self.chunk.position
    }

    pub fn is_rendered(&self) -> bool {
        self.visible.is_some()
    }
}

/// Grid of resident chunks centered on the player's chunk.
pub struct ChunkWindow {
    center: ChunkPosition,
    render_distance: i32,
    slots: Vec<Option<WindowSlot>>,
}

impl ChunkWindow {
    /// Creates an empty window.
    pub fn new(center: ChunkPosition, render_distance: i32) -> Self {
        let side = Self::side_for(render_distance);
        Self {
            center,
            render_distance,
            slots: (0..side * side).map(|_| None).collect(),
        }
    }

    fn side_for(render_distance: i32) -> usize {
        (2 * (render_distance + 1) + 1) as usize
    }

    pub fn center(&self) -> ChunkPosition {
        self.center
    }

    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    /// Radius of the resident area, one ring past the visible area.
    pub fn resident_radius(&self) -> i32 {
        self.render_distance + 1
    }

    /// Whether `position` lies inside the resident area.
    pub fn contains(&self, position: ChunkPosition) -> bool {
        position.ring_distance(self.center) <= self.resident_radius()
    }

    /// Whether `position` lies inside the visible area.
    pub fn is_visible_position(&self, position: ChunkPosition) -> bool {
        position.ring_distance(self.center) <= self.render_distance
    }

    fn index_of(&self, position: ChunkPosition) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let radius = self.resident_radius();
        let side = Self::side_for(self.render_distance);
        let column = (position.x - self.center.x + radius) as usize;
        let row = (position.z - self.center.z + radius) as usize;
        Some(column * side + row)
    }

    pub fn get(&self, position: ChunkPosition) -> Option<&WindowSlot> {
        self.index_of(position)
            .and_then(|index| self.slots[index].as_ref())
    }

    pub fn get_mut(&mut self, position: ChunkPosition) -> Option<&mut WindowSlot> {
        self.index_of(position)
            .and_then(|index| self.slots[index].as_mut())
    }

    pub fn chunk(&self, position: ChunkPosition) -> Option<&Chunk> {
        self.get(position).map(|slot| &slot.chunk)
    }

    /// Moves a slot into the window.
    ///
    /// # Returns
    /// The slot back if its chunk lies outside the resident area.
    pub fn insert(&mut self, slot: WindowSlot) -> Result<(), WindowSlot> {
        match self.index_of(slot.position()) {
            Some(index) => {
                debug_assert!(self.slots[index].is_none(), "slot {} occupied", slot.position());
                self.slots[index] = Some(slot);
                Ok(())
            }
            None => Err(slot),
        }
    }

    /// Moves a slot out of the window.
    pub fn take(&mut self, position: ChunkPosition) -> Option<WindowSlot> {
        self.index_of(position)
            .and_then(|index| self.slots[index].take())
    }

    /// The four lateral neighbours of a chunk, in -X, +X, -Z, +Z order.
    pub fn neighbors(&self, position: ChunkPosition) -> NeighborChunks<'_> {
        [
            self.chunk(position.offset(-1, 0)),
            self.chunk(position.offset(1, 0)),
            self.chunk(position.offset(0, -1)),
            self.chunk(position.offset(0, 1)),
        ]
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slots(&self) -> impl Iterator<Item = &WindowSlot> {
        self.slots.iter().flatten()
    }

    pub fn slots_mut(&mut self) -> impl Iterator<Item = &mut WindowSlot> {
        self.slots.iter_mut().flatten()
    }

    /// Every position within `radius` of the center, nearest ring first.
    pub fn positions_within(&self, radius: i32) -> Vec<ChunkPosition> {
        positions_around(self.center, radius)
    }

    /// Moves the window to a new center and render distance.
    ///
    /// # Returns
    /// The slots that fall outside the new resident area, sorted by position. They are no
    /// longer owned by the window; the caller persists them.
    pub fn relayout(&mut self, center: ChunkPosition, render_distance: i32) -> Vec<WindowSlot> {
        let previous = std::mem::take(&mut self.slots);
        let side = Self::side_for(render_distance);
        self.center = center;
        self.render_distance = render_distance;
        self.slots = (0..side * side).map(|_| None).collect();

        let mut displaced = Vec::new();
        for slot in previous.into_iter().flatten() {
            if let Err(slot) = self.insert(slot) {
                displaced.push(slot);
            }
        }
        displaced.sort_by_key(|slot| slot.position());

        debug!(
            "Window moved to {center} with render distance {render_distance}, {} chunks displaced",
            displaced.len()
        );
        displaced
    }
}

/// Every position within `radius` of `center`, nearest ring first then by position.
pub fn positions_around(center: ChunkPosition, radius: i32) -> Vec<ChunkPosition> {
    let mut positions: Vec<ChunkPosition> = (-radius..=radius)
        .flat_map(|dx| (-radius..=radius).map(move |dz| center.offset(dx, dz)))
        .collect();
    positions.sort_by_key(|position| (position.ring_distance(center), *position));
    positions
}

/// Positions within `radius` of `from` that are farther than `radius` from `to`.
pub fn ring_difference(from: ChunkPosition, to: ChunkPosition, radius: i32) -> Vec<ChunkPosition> {
    positions_around(from, radius)
        .into_iter()
        .filter(|position| position.ring_distance(to) > radius)
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::engine_state::voxels::chunk::ChunkDimensions;

    use super::*;

    const DIMS: ChunkDimensions = ChunkDimensions::new(2, 2);

    fn filled_window(center: ChunkPosition, render_distance: i32) -> ChunkWindow {
        let mut window = ChunkWindow::new(center, render_distance);
        for position in window.positions_within(render_distance + 1) {
            window
                .insert(WindowSlot::new(Chunk::empty(position, DIMS)))
                .unwrap();
        }
        window
    }

    #[test]
    fn holds_one_ring_past_render_distance() {
        let window = filled_window(ChunkPosition::new(3, -2), 1);
        assert_eq!(window.len(), 25);
        assert!(window.contains(ChunkPosition::new(5, 0)));
        assert!(!window.contains(ChunkPosition::new(6, 0)));
        assert!(window.is_visible_position(ChunkPosition::new(4, -1)));
        assert!(!window.is_visible_position(ChunkPosition::new(5, -1)));
        for slot in window.slots() {
            assert_eq!(window.get(slot.position()).unwrap().position(), slot.position());
        }
    }

    #[test]
    fn insert_outside_is_rejected() {
        let mut window = ChunkWindow::new(ChunkPosition::new(0, 0), 1);
        let far = WindowSlot::new(Chunk::empty(ChunkPosition::new(3, 0), DIMS));
        assert!(window.insert(far).is_err());
        assert!(window.is_empty());
    }

    #[test]
    fn neighbors_follow_lateral_order() {
        let window = filled_window(ChunkPosition::new(0, 0), 1);
        let [left, right, back, front] = window.neighbors(ChunkPosition::new(0, 0));
        assert_eq!(left.unwrap().position, ChunkPosition::new(-1, 0));
        assert_eq!(right.unwrap().position, ChunkPosition::new(1, 0));
        assert_eq!(back.unwrap().position, ChunkPosition::new(0, -1));
        assert_eq!(front.unwrap().position, ChunkPosition::new(0, 1));

        let edge = window.neighbors(ChunkPosition::new(2, 0));
        assert!(edge[1].is_none());
    }

    #[test]
    fn relayout_keeps_overlap_and_returns_the_rest() {
        let mut window = filled_window(ChunkPosition::new(0, 0), 1);
        let displaced = window.relayout(ChunkPosition::new(1, 0), 1);
        assert_eq!(displaced.len(), 5);
        assert!(displaced.iter().all(|slot| slot.position().x == -2));
        assert_eq!(window.len(), 20);
        assert!(window.get(ChunkPosition::new(3, 0)).is_none());
        assert!(window.get(ChunkPosition::new(-1, 2)).is_some());

        let displaced = window.relayout(ChunkPosition::new(1, 0), 0);
        assert_eq!(displaced.len(), 11);
        assert_eq!(window.len(), 9);
    }

    #[test]
    fn ring_difference_is_the_departing_row() {
        let row = ring_difference(ChunkPosition::new(0, 0), ChunkPosition::new(0, 1), 2);
        assert_eq!(row.len(), 5);
        assert!(row.iter().all(|position| position.z == -2));
        assert_eq!(positions_around(ChunkPosition::new(0, 0), 1)[0], ChunkPosition::new(0, 0));
    }
}
