//! Demo mode simulation engine.
//!
//! Produces time-varying snapshot batches for a small testbench, so the
//! dashboard can be shown without a feed or a Zenoh connection.

use std::f64::consts::PI;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use rigdash_common::{BoardSlot, DeviceSnapshot, FanPair, SensorReadings};

/// Installer log lines, revealed one per tick.
const INSTALL_LOG: &[&str] = &[
    "Miner needs unlock, unlocking.",
    "Unlocked miner, installing.",
    "Uploading firmware image...",
    "Flashing NAND, do not power off.",
    "Install complete, rebooting.",
    "Waiting for miner to come back online...",
];

/// Ticks a simulated fan stays dead once it fails.
const FAN_FAULT_TICKS: u64 = 6;

/// A simulated testbench device.
#[derive(Debug, Clone)]
struct SimulatedMiner {
    address: String,
    /// Slots with a working hashboard.
    boards: Vec<BoardSlot>,
    /// Phase offset for the hashrate wave.
    phase: f64,
    /// Tick at which the installer started; `None` once mining.
    installing_since: Option<u64>,
    /// Tick until which the left fan reads 0.
    fan_fault_until: u64,
    light: bool,
}

/// Demo simulation state.
pub struct DemoSimulator {
    rng: SmallRng,
    tick: u64,
    miners: Vec<SimulatedMiner>,
}

impl DemoSimulator {
    /// Create a simulator seeded from system entropy.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// Create a reproducible simulator.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        let miners = (0..6)
            .map(|i| SimulatedMiner {
                address: format!("192.168.1.{}", 31 + i),
                boards: if i == 4 {
                    vec![BoardSlot::Six, BoardSlot::Eight]
                } else {
                    BoardSlot::ALL.to_vec()
                },
                phase: i as f64 * 0.7,
                installing_since: (i == 0).then_some(0),
                fan_fault_until: 0,
                light: i % 2 == 0,
            })
            .collect();

        Self {
            rng,
            tick: 0,
            miners,
        }
    }

    /// Advance one tick and return the resulting snapshot batch.
    pub fn next_batch(&mut self) -> Vec<DeviceSnapshot> {
        self.tick += 1;
        let tick = self.tick;

        // Occasionally kill a fan somewhere.
        if self.rng.random_bool(0.05) {
            let index = self.rng.random_range(0..self.miners.len());
            self.miners[index].fan_fault_until = tick + FAN_FAULT_TICKS;
            tracing::debug!(address = %self.miners[index].address, "Demo fan fault");
        }

        let mut batch = Vec::with_capacity(self.miners.len());
        for index in 0..self.miners.len() {
            let miner = self.miners[index].clone();
            let snapshot = match miner.installing_since {
                Some(since) => {
                    let shown = ((tick - since) as usize + 1).min(INSTALL_LOG.len());
                    if tick - since >= INSTALL_LOG.len() as u64 + 2 {
                        self.miners[index].installing_since = None;
                    }
                    let mut log = INSTALL_LOG[..shown].join("\n");
                    log.push('\n');
                    DeviceSnapshot::diagnostic(&miner.address, log)
                }
                None => DeviceSnapshot::sensor(&miner.address, self.readings(&miner, tick)),
            };
            batch.push(snapshot.with_light(miner.light));
        }

        batch
    }

    fn readings(&mut self, miner: &SimulatedMiner, tick: u64) -> SensorReadings {
        let left = if tick < miner.fan_fault_until {
            0
        } else {
            self.rng.random_range(4800..5600)
        };
        let right = self.rng.random_range(4800..5600);

        let mut readings = SensorReadings::new(FanPair::new(left, right));
        let wave = (tick as f64 * PI / 12.0 + miner.phase).sin();

        for &slot in &miner.boards {
            let hashrate = 2.45 + wave * 0.2 + self.rng.random_range(-0.08..0.08);
            let chip = 70.0 + wave * 4.0 + self.rng.random_range(-1.5..1.5);
            let board = chip - 13.0 + self.rng.random_range(-1.0..1.0);
            // A dead fan heats the boards up.
            let heat = if left == 0 { 9.0 } else { 0.0 };
            readings = readings
                .with_hashrate(slot, (hashrate * 100.0).round() / 100.0)
                .with_temperature(slot, (chip + heat).round(), (board + heat).round());
        }

        readings
    }
}

impl Default for DemoSimulator {
    fn default() -> Self {
        Self::new()
    }
}
