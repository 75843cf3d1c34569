//! Utility functions for id minting and rounding

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique record id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

// infallible variant for the crate's own constant prefixes
pub(crate) fn mint_id(hrp: &str) -> String {
    let hrp = bech32::Hrp::parse_unchecked(hrp);
    bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())
        .expect("failed to serialise a uuid id to bech32 encoding.")
}

/// Round to one decimal place. Band fame is tracked at this precision.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round1_keeps_one_decimal() {
        assert_eq!(round1(2.0 + 0.1), 2.1);
        assert_eq!(round1(2.0999999), 2.1);
        assert_eq!(round1(0.25), 0.3);
    }
}
