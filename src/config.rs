//! Numeric policy for play settlement

/// Constraints applied when settling a play. The floors guarantee every
/// aired play credits something; the earnings ledger conditional in the
/// band cascade still checks the sales boost because these values are
/// tunable.
#[derive(Debug, Clone)]
pub struct SettlementConfig {
    /// Lower bound of the audience multiplier.
    pub multiplier_floor: f64,
    /// Width of the multiplier range above the floor.
    pub multiplier_span: f64,
    pub listener_floor: u32,
    pub hype_per_listener: f64,
    pub hype_floor: u32,
    pub streams_per_listener: f64,
    pub streams_floor: u32,
    pub sales_per_listener: f64,
    pub sales_floor: u32,
    /// Band fame credited per aired play, applied at one-decimal precision.
    pub fame_per_play: f64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            multiplier_floor: 0.55,
            multiplier_span: 0.35,
            listener_floor: 100,
            hype_per_listener: 0.002,
            hype_floor: 1,
            streams_per_listener: 0.6,
            streams_floor: 10,
            sales_per_listener: 0.015,
            sales_floor: 5,
            fame_per_play: 0.1,
        }
    }
}
