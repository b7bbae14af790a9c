use bevy::prelude::*;

use crate::game::fixed_math::FixedNum;
use super::components::AgentId;
use super::store::AgentStore;

impl AgentStore {
    /// Temporarily switch an agent to `faction`.
    ///
    /// While charmed the agent hunts its own original faction. Its target is
    /// cleared on apply and again on expiry so it re-evaluates both times.
    /// Re-charming an already charmed agent just replaces faction and timer.
    pub fn apply_charm(&mut self, id: AgentId, faction: u8, duration: FixedNum) {
        if !self.is_active(id) || duration <= FixedNum::ZERO {
            return;
        }
        let base = self.base_faction(id);
        self.set_faction(id, faction);
        self.set_hunt_policy(id, base & !faction);
        self.set_target(id, None);
        self.charm_remaining[id.index()] = duration;
        debug!("Agent {} charmed to faction {} for {}s", id.0, faction, duration);
    }

    #[inline]
    pub fn is_charmed(&self, id: AgentId) -> bool {
        self.charm_remaining[id.index()] > FixedNum::ZERO
    }

    /// Count charm timers down by `dt` seconds and restore expired agents.
    pub fn tick_status_effects(&mut self, dt: FixedNum) {
        for i in 0..self.len() {
            let id = AgentId(i as u32);
            if !self.is_charmed(id) {
                continue;
            }
            let remaining = self.charm_remaining[i] - dt;
            if remaining > FixedNum::ZERO {
                self.charm_remaining[i] = remaining;
                continue;
            }
            self.charm_remaining[i] = FixedNum::ZERO;
            self.set_faction(id, self.base_faction(id));
            self.set_hunt_policy(id, self.base_hunt_policy(id));
            self.set_target(id, None);
            debug!("Agent {} charm expired", id.0);
        }
    }
}
