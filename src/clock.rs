//! Clock configuration for the adapter's output stage.
//!
//! The adapter derives its output clock from the 12 MHz crystal through two
//! divider stages in series: a power-of-two prescaler N followed by an
//! 8-bit divisor M, giving `rate = crystal / N / M`. Both stages must land
//! in their register ranges at once, so picking them is a small search
//! rather than a division.
//!
//! Common pairs for the 12 MHz reference:
//!
//! | Rate (Sym/s) | N   | M   | Error   |
//! |--------------|-----|-----|---------|
//! |         2500 | 32  | 150 | exact   |
//! |         2000 | 32  | 188 | ~0.27%  |
//! |         1200 | 64  | 156 | ~0.16%  |
//!
//! [`divisors_for`] performs the search; [`apply`] writes the result to the
//! device together with the mode enable. The search is pure and device
//! independent, so it is unit-tested without hardware.

use crate::consts::{MAX_PRESCALE_EXP, MODE_CLOCKED_TX, REG_CLOCK_DIVISOR, REG_CLOCK_PRESCALE, REG_MODE};
use crate::error::TxError;
use crate::port::ControlPort;
use log::debug;
use std::ops::RangeInclusive;

/// Largest relative rate error accepted when no exact divisor pair exists.
///
/// Half a percent. The receiver resynchronizes on every carrier edge of the
/// 3-unit code, so drift accumulates over at most a few units before the
/// next edge corrects it; 0.5% keeps that drift under 2% of a unit period
/// and sits well inside the ~2% budget asynchronous receivers tolerate.
/// Exact pairs bypass the tolerance entirely.
pub const RATE_TOLERANCE: f64 = 0.005;

/// A validated prescale/divisor pair for the adapter's clock tree.
///
/// `prescale` is the N stage, always a power of two; the register stores
/// its exponent. `divisor` is the M stage, stored directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisorPair {
    /// First divider stage N.
    pub prescale: u32,
    /// Second divider stage M.
    pub divisor: u8,
}

impl DivisorPair {
    /// The output rate this pair actually produces from `reference_hz`.
    pub fn actual_rate(&self, reference_hz: u32) -> f64 {
        f64::from(reference_hz) / (f64::from(self.prescale) * f64::from(self.divisor))
    }

    /// The prescale stage as its register encoding, log2 N.
    pub fn prescale_exponent(&self) -> u16 {
        self.prescale.trailing_zeros() as u16
    }
}

/// The prescale values the adapter's register can express, ascending.
pub fn prescale_candidates() -> impl Iterator<Item = u32> {
    (0..=MAX_PRESCALE_EXP).map(|exponent| 1u32 << exponent)
}

/// Searches for a divisor pair reproducing `target_rate` from `reference_hz`.
///
/// Candidates are scanned in the given order (ascending for
/// [`prescale_candidates`]). For each prescale, the divisor is
/// `reference / N / target` rounded to the nearest integer in `divisors`.
/// The first pair that hits the rate exactly wins immediately; otherwise
/// the pair with the smallest relative error wins, provided the error is
/// within [`RATE_TOLERANCE`]. The result depends only on the arguments,
/// never on device state.
///
/// # Errors
/// [`TxError::UnrepresentableRate`] when no candidate pair lands within
/// tolerance, including a `target_rate` of zero.
pub fn divisors_for(
    target_rate: u32,
    reference_hz: u32,
    prescales: impl IntoIterator<Item = u32>,
    divisors: RangeInclusive<u8>,
) -> Result<DivisorPair, TxError> {
    if target_rate == 0 || reference_hz == 0 {
        return Err(TxError::UnrepresentableRate { target_rate, reference_hz });
    }

    let mut best: Option<(f64, DivisorPair)> = None;
    for prescale in prescales {
        debug_assert!(prescale.is_power_of_two());
        let ideal = f64::from(reference_hz) / (f64::from(prescale) * f64::from(target_rate));
        let rounded = ideal.round();
        if rounded < f64::from(*divisors.start()) || rounded > f64::from(*divisors.end()) {
            continue;
        }
        let pair = DivisorPair { prescale, divisor: rounded as u8 };

        let product = u64::from(prescale) * u64::from(pair.divisor) * u64::from(target_rate);
        if product == u64::from(reference_hz) {
            debug!(
                "clock: N={} M={} hits {target_rate} Sym/s exactly",
                pair.prescale, pair.divisor
            );
            return Ok(pair);
        }

        let error =
            (pair.actual_rate(reference_hz) - f64::from(target_rate)).abs() / f64::from(target_rate);
        if best.as_ref().is_none_or(|(best_error, _)| error < *best_error) {
            best = Some((error, pair));
        }
    }

    match best {
        Some((error, pair)) if error <= RATE_TOLERANCE => {
            debug!(
                "clock: N={} M={} gives {:.2} Sym/s for requested {target_rate} ({:.3}% off)",
                pair.prescale,
                pair.divisor,
                pair.actual_rate(reference_hz),
                error * 100.0
            );
            Ok(pair)
        }
        _ => Err(TxError::UnrepresentableRate { target_rate, reference_hz }),
    }
}

/// Writes a divisor pair to the device, enabling clocked output first.
///
/// Issues three configuration writes in a fixed order: mode enable, then
/// the prescale exponent, then the divisor. Re-applying a different pair
/// rewrites all three registers, so earlier configuration never bleeds
/// through.
///
/// # Errors
/// [`TxError::DeviceConfig`] naming the register on the first write that
/// fails. Callers must not transmit after a failed apply.
pub fn apply<P: ControlPort>(port: &mut P, pair: &DivisorPair) -> Result<(), TxError> {
    debug!(
        "configuring clock: prescale={} (exponent {}), divisor={}",
        pair.prescale,
        pair.prescale_exponent(),
        pair.divisor
    );
    let writes = [
        (REG_MODE, MODE_CLOCKED_TX),
        (REG_CLOCK_PRESCALE, pair.prescale_exponent()),
        (REG_CLOCK_DIVISOR, u16::from(pair.divisor)),
    ];
    for (register, value) in writes {
        port.write_config(register, value)
            .map_err(|source| TxError::DeviceConfig { register, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CRYSTAL_HZ;
    use crate::port::MockPort;

    fn search(target: u32) -> Result<DivisorPair, TxError> {
        divisors_for(target, CRYSTAL_HZ, prescale_candidates(), 1..=u8::MAX)
    }

    #[test]
    fn default_rate_resolves_exactly() {
        let pair = search(2500).unwrap();
        assert_eq!(pair, DivisorPair { prescale: 32, divisor: 150 });
        assert_eq!(pair.actual_rate(CRYSTAL_HZ), 2500.0);
        assert_eq!(pair.prescale_exponent(), 5);
    }

    #[test]
    fn smallest_exact_prescale_wins() {
        // 64/75 also hits 2500 exactly; the ascending scan must stop at 32.
        assert_eq!(search(2500).unwrap().prescale, 32);
    }

    #[test]
    fn near_even_rate_lands_within_tolerance() {
        // 2501 has no exact pair; (32, 150) is 2500.0, about 0.04% off.
        let pair = search(2501).unwrap();
        assert_eq!(pair, DivisorPair { prescale: 32, divisor: 150 });
    }

    #[test]
    fn unreachable_rates_are_rejected() {
        for target in [0, 1, 7, 40_000_000] {
            match search(target) {
                Err(TxError::UnrepresentableRate { target_rate, reference_hz }) => {
                    assert_eq!(target_rate, target);
                    assert_eq!(reference_hz, CRYSTAL_HZ);
                }
                other => panic!("expected UnrepresentableRate for {target}, got {other:?}"),
            }
        }
    }

    #[test]
    fn search_is_deterministic() {
        assert_eq!(search(2500).unwrap(), search(2500).unwrap());
        assert_eq!(search(2000).unwrap(), search(2000).unwrap());
    }

    #[test]
    fn apply_writes_mode_then_divisors() {
        let mut port = MockPort::default();
        let pair = DivisorPair { prescale: 32, divisor: 150 };
        apply(&mut port, &pair).unwrap();
        assert_eq!(
            port.configs,
            vec![
                (REG_MODE, MODE_CLOCKED_TX),
                (REG_CLOCK_PRESCALE, 5),
                (REG_CLOCK_DIVISOR, 150),
            ]
        );
        assert!(port.chunks.is_empty());
    }

    #[test]
    fn apply_reports_the_failing_register() {
        let mut port = MockPort { fail_config_at: Some(1), ..MockPort::default() };
        let pair = DivisorPair { prescale: 32, divisor: 150 };
        match apply(&mut port, &pair) {
            Err(TxError::DeviceConfig { register, .. }) => {
                assert_eq!(register, REG_CLOCK_PRESCALE);
            }
            other => panic!("expected DeviceConfig, got {other:?}"),
        }
        // The mode write went through before the fault.
        assert_eq!(port.configs.len(), 1);
    }
}
