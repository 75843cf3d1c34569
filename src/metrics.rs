//! Derived play metrics and the injected randomness seam
use crate::config::SettlementConfig;
use rand::Rng;

/// Source of the single random draw a settlement consumes. Injected so
/// the pipeline stays reproducible under test.
pub trait RandomSource {
    /// A draw in `[0, 1)`.
    fn draw(&mut self) -> f64;
}

pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn draw(&mut self) -> f64 {
        rand::rng().random()
    }
}

/// Pins the draw to a known value.
pub struct FixedDraw(pub f64);

impl RandomSource for FixedDraw {
    fn draw(&mut self) -> f64 {
        self.0
    }
}

/// Per-play audience metrics. Positive by construction: each figure has
/// an explicit floor from [`SettlementConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayMetrics {
    pub listeners: u32,
    pub hype_gained: u32,
    pub streams_boost: u32,
    pub sales_boost: u32,
}

impl PlayMetrics {
    /// Pure mapping from a station's listener base and a draw `r` in
    /// `[0, 1)`. Reproducible for a given `(listener_base, r)` pair.
    pub fn compute(listener_base: u32, r: f64, config: &SettlementConfig) -> Self {
        let multiplier = config.multiplier_floor + r * config.multiplier_span;
        let listeners = scaled(listener_base, multiplier).max(config.listener_floor);

        Self {
            listeners,
            hype_gained: scaled(listeners, config.hype_per_listener).max(config.hype_floor),
            streams_boost: scaled(listeners, config.streams_per_listener).max(config.streams_floor),
            sales_boost: scaled(listeners, config.sales_per_listener).max(config.sales_floor),
        }
    }
}

fn scaled(base: u32, rate: f64) -> u32 {
    (f64::from(base) * rate).round() as u32
}
