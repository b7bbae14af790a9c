use bevy::prelude::*;

use crate::game::fixed_math::FixedNum;
use super::Simulation;
use super::resources::{InputState, SimTick};

/// Advance the loaded [`Simulation`] by one fixed tick.
///
/// Runs in `FixedUpdate` with `dt = 1 / tick_rate`. The host writes
/// [`InputState`] before the tick; [`SimTick`] mirrors the frame counter
/// afterwards so other systems can read it without borrowing the simulation.
pub fn step_simulation(
    sim: Option<ResMut<Simulation>>,
    input: Res<InputState>,
    mut tick: ResMut<SimTick>,
) {
    let Some(mut sim) = sim else {
        return;
    };

    let tick_rate = sim.config().tick_rate;
    if tick_rate <= 0.0 || !tick_rate.is_finite() {
        return;
    }
    let dt = FixedNum::saturating_from_num(1.0 / tick_rate);
    sim.step_fixed(dt, &input);
    tick.0 = sim.frame();
}
