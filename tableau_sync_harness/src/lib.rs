// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumentation for observing what scene sync pushes to peers.
//!
//! [`RecordingFactory`] stands in for a toolkit backend and logs every peer
//! call into a shared [`SyncLog`]. [`PulseTracker`] aggregates the
//! [`SyncReport`]s of successive pulses into rolling statistics.

mod recorder;

pub use recorder::{ArrayWrite, MeshArray, PeerKey, RecordingFactory, SyncEvent, SyncLog};

use tableau_core::peer::SyncReport;

/// How much work a pulse did, relative to the scene size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulseLoad {
    /// Nothing was pushed.
    Idle,
    /// A small share of the scene was pushed.
    Incremental,
    /// A large share of the scene was pushed.
    Heavy,
    /// Every node was pushed.
    Full,
}

impl PulseLoad {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Incremental => "incremental",
            Self::Heavy => "heavy",
            Self::Full => "full",
        }
    }
}

/// Aggregated statistics returned by [`PulseTracker::observe`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseStats {
    /// Load of the pulse just observed.
    pub load: PulseLoad,
    /// Total pulses observed.
    pub total_pulses: u64,
    /// Pulses that pushed nothing.
    pub idle_pulses: u64,
    /// Node pushes summed over all pulses.
    pub total_nodes_synced: u64,
    /// Peers created minus peers released over all pulses.
    pub live_peers: i64,
    /// Mean nodes pushed per pulse.
    pub mean_nodes_per_pulse: f64,
}

/// Rolling tracker with a fixed-size history of nodes pushed per pulse.
#[derive(Debug)]
pub struct PulseTracker<const N: usize> {
    history: [usize; N],
    cursor: usize,
    total_pulses: u64,
    idle_pulses: u64,
    total_nodes_synced: u64,
    live_peers: i64,
}

impl<const N: usize> Default for PulseTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PulseTracker<N> {
    /// Creates a tracker with an all-idle history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            history: [0; N],
            cursor: 0,
            total_pulses: 0,
            idle_pulses: 0,
            total_nodes_synced: 0,
            live_peers: 0,
        }
    }

    /// Observes one pulse over a scene of `scene_nodes` nodes and returns
    /// updated statistics.
    #[must_use]
    pub fn observe(&mut self, report: &SyncReport, scene_nodes: usize) -> PulseStats {
        self.total_pulses = self.total_pulses.saturating_add(1);
        self.history[self.cursor % N] = report.nodes_synced;
        self.cursor = (self.cursor + 1) % N;

        let idle = report.nodes_synced == 0 && report.meshes_synced == 0;
        if idle {
            self.idle_pulses = self.idle_pulses.saturating_add(1);
        }
        self.total_nodes_synced = self
            .total_nodes_synced
            .saturating_add(report.nodes_synced as u64);
        self.live_peers += report.peers_created as i64 - report.peers_released as i64;

        let load = if idle {
            PulseLoad::Idle
        } else {
            load_for(report.nodes_synced, scene_nodes)
        };

        PulseStats {
            load,
            total_pulses: self.total_pulses,
            idle_pulses: self.idle_pulses,
            total_nodes_synced: self.total_nodes_synced,
            live_peers: self.live_peers,
            mean_nodes_per_pulse: self.total_nodes_synced as f64 / self.total_pulses as f64,
        }
    }

    /// Returns nodes pushed per pulse, oldest to newest.
    #[must_use]
    pub fn history(&self) -> [usize; N] {
        let mut out = [0; N];
        let mut i = 0;
        while i < N {
            out[i] = self.history[(self.cursor + i) % N];
            i += 1;
        }
        out
    }

    /// Returns an ASCII sparkline over [`history`](Self::history), scaled so
    /// that `max_nodes` maps to the tallest glyph.
    #[must_use]
    pub fn sparkline_ascii(&self, max_nodes: usize) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let max = max_nodes.max(1) as f64;
        let mut out = String::with_capacity(N);
        for n in self.history() {
            let t = (n as f64 / max).min(1.0);
            #[expect(
                clippy::cast_possible_truncation,
                reason = "index is clamped to ASCII level count"
            )]
            let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
            out.push(LEVELS[level] as char);
        }
        out
    }
}

fn load_for(nodes_synced: usize, scene_nodes: usize) -> PulseLoad {
    if scene_nodes == 0 || nodes_synced >= scene_nodes {
        PulseLoad::Full
    } else if nodes_synced * 4 > scene_nodes {
        PulseLoad::Heavy
    } else {
        PulseLoad::Incremental
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(nodes: usize, created: usize, released: usize) -> SyncReport {
        SyncReport {
            nodes_synced: nodes,
            meshes_synced: 0,
            peers_created: created,
            peers_released: released,
        }
    }

    #[test]
    fn idle_pulses_accumulate() {
        let mut t = PulseTracker::<8>::new();
        let mut last = None;
        for i in 0..10 {
            let nodes = if i < 2 { 5 } else { 0 };
            last = Some(t.observe(&report(nodes, 0, 0), 5));
        }
        let stats = last.expect("observed");
        assert_eq!(stats.load, PulseLoad::Idle);
        assert_eq!(stats.idle_pulses, 8);
        assert!((stats.mean_nodes_per_pulse - 1.0).abs() < 1e-9);
    }

    #[test]
    fn load_is_relative_to_scene_size() {
        let mut t = PulseTracker::<4>::new();
        assert_eq!(t.observe(&report(100, 100, 0), 100).load, PulseLoad::Full);
        assert_eq!(t.observe(&report(30, 0, 0), 100).load, PulseLoad::Heavy);
        assert_eq!(t.observe(&report(3, 0, 2), 100).load, PulseLoad::Incremental);
        assert_eq!(t.observe(&report(0, 0, 0), 100).live_peers, 98);
    }

    #[test]
    fn history_is_oldest_first() {
        let mut t = PulseTracker::<3>::new();
        for n in [1, 2, 3, 4] {
            let _ = t.observe(&report(n, 0, 0), 10);
        }
        assert_eq!(t.history(), [2, 3, 4]);
        assert_eq!(t.sparkline_ascii(4), "+#@");
    }
}
