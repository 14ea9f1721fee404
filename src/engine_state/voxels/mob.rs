//! # Mob Snapshots
//!
//! The persisted state of a mob: six 32-bit floats. Mob behaviour lives elsewhere; the
//! world only stores where each mob was and hands the list back when its chunk becomes
//! visible again.

use cgmath::Point3;

/// One saved mob, laid out exactly as a record of a mob file:
/// `[kind, aggressive, x, y, z, rotation_y]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MobSnapshot {
    pub kind: f32,
    /// `1.0` for aggressive mobs, `0.0` otherwise.
    pub aggressive: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rotation_y: f32,
}

/// Size of one mob record on disk.
pub const MOB_RECORD_SIZE: usize = std::mem::size_of::<MobSnapshot>();

impl MobSnapshot {
    pub fn new(kind: u32, aggressive: bool, position: Point3<f32>, rotation_y: f32) -> Self {
        Self {
            kind: kind as f32,
            aggressive: if aggressive { 1.0 } else { 0.0 },
            x: position.x,
            y: position.y,
            z: position.z,
            rotation_y,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn is_aggressive(&self) -> bool {
        self.aggressive != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_six_floats() {
        assert_eq!(MOB_RECORD_SIZE, 24);
        let mob = MobSnapshot::new(3, true, Point3::new(1.0, 2.0, -3.5), 90.0);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&mob));
        assert_eq!(floats, &[3.0, 1.0, 1.0, 2.0, -3.5, 90.0]);
        assert!(mob.is_aggressive());
    }
}
