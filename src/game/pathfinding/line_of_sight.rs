//! Sampled line-of-sight test against the tile grid.
//!
//! The segment is sampled every `step` pixels, endpoints included. At each
//! sample the centre point and two diagonal offsets (a rough stand-in for body
//! thickness) must all sit on walkable tiles. Thin corners between samples can
//! be missed, so a `false` result is the only one callers may rely on as safe.

use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::map::TileGrid;

/// Sampling parameters for [`has_line_of_sight`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SightProbe {
    /// Distance between samples in world pixels.
    pub step: FixedNum,
    /// Lateral offset of the two thickness samples.
    pub body_offset: FixedNum,
}

impl Default for SightProbe {
    fn default() -> Self {
        Self {
            step: FixedNum::from_num(8),
            body_offset: FixedNum::from_num(2),
        }
    }
}

/// True when nothing blocks the sampled segment between `a` and `b`.
///
/// The endpoints are put into a canonical order first, so the result is
/// exactly symmetric in its arguments.
pub fn has_line_of_sight(grid: &TileGrid, a: FixedVec2, b: FixedVec2, probe: &SightProbe) -> bool {
    let (from, to) = if (a.x, a.y) <= (b.x, b.y) { (a, b) } else { (b, a) };
    let delta = to - from;

    let step = probe.step.max(FixedNum::from_bits(1));
    let dist = delta.length();
    let steps = (dist / step).ceil().to_num::<i64>().max(0);

    if steps == 0 {
        return sample_clear(grid, from, probe.body_offset);
    }

    let steps_fixed = FixedNum::from_num(steps);
    for i in 0..=steps {
        let t = FixedNum::from_num(i) / steps_fixed;
        let point = from + delta * t;
        if !sample_clear(grid, point, probe.body_offset) {
            return false;
        }
    }
    true
}

#[inline]
fn sample_clear(grid: &TileGrid, point: FixedVec2, offset: FixedNum) -> bool {
    let side = FixedVec2::new(offset, offset);
    grid.is_pixel_walkable(point)
        && grid.is_pixel_walkable(point + side)
        && grid.is_pixel_walkable(point - side)
}
