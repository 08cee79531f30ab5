use bevy::prelude::*;

/// Number of navigation ticks run so far.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavTick(pub u64);

impl NavTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Per-tick counters, reset at the start of every tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct NavStats {
    pub path_requests: usize,
    pub path_failures: usize,
    pub moved: usize,
    pub capped: usize,
    pub arrived: usize,
    pub neighbor_pairs: usize,
}
