//! Weighted driver selection.
//!
//! Each driver with weight > 0 occupies a half-open span
//! `[running_total, running_total + weight)` over the cumulative total, in
//! registration order. A uniform draw in `[0, total)` picks the span. When
//! the total is zero (no drivers with positive weight), selection falls
//! back to a uniform pick among ALL registered names, zero-weight ones
//! included.

use rand::Rng;
use tracing::debug;

use crate::domain::Driver;
use crate::error::RelayError;

struct Span<'a> {
    lo: u64,
    hi: u64,
    name: &'a str,
}

/// Pick a driver name. `drivers` must be in registration order.
///
/// The RNG is injected so callers can seed deterministically in tests; the
/// orchestrator hands in `thread_rng`.
pub(crate) fn pick_by_weight<R: Rng>(
    rng: &mut R,
    drivers: &[&Driver],
) -> Result<String, RelayError> {
    if drivers.is_empty() {
        return Err(RelayError::Configuration(
            "task has no drivers to select from".to_string(),
        ));
    }

    let mut spans = Vec::new();
    let mut total: u64 = 0;
    for driver in drivers {
        let weight = u64::from(driver.weight());
        if weight > 0 {
            spans.push(Span {
                lo: total,
                hi: total + weight,
                name: driver.name(),
            });
            total += weight;
        }
    }

    if total == 0 {
        let index = rng.gen_range(0..drivers.len());
        let name = drivers[index].name();
        debug!(driver = %name, "no positive weights, picked uniformly");
        return Ok(name.to_string());
    }

    let draw = rng.gen_range(0..total);
    for span in &spans {
        if draw >= span.lo && draw < span.hi {
            debug!(driver = %span.name, draw, total, "picked by weight");
            return Ok(span.name.to_string());
        }
    }

    // Unreachable while the span construction above is sound; surfaced
    // loudly rather than defaulted so a defect cannot hide.
    Err(RelayError::InternalInvariant(format!(
        "weighted draw {draw} landed in no span (total weight {total})"
    )))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::domain::WorkReport;

    fn driver(name: &str, weight: u32) -> Driver {
        Driver::new(
            name,
            weight,
            false,
            Arc::new(|_: Option<&serde_json::Value>| WorkReport::success(serde_json::Value::Null)),
        )
    }

    fn tally(drivers: &[&Driver], trials: usize) -> HashMap<String, usize> {
        let mut rng = rand::thread_rng();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            let name = pick_by_weight(&mut rng, drivers).unwrap();
            *counts.entry(name).or_default() += 1;
        }
        counts
    }

    #[test]
    fn empty_registry_is_a_configuration_error() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = pick_by_weight(&mut rng, &[]).unwrap_err();
        assert!(matches!(err, RelayError::Configuration(_)));
    }

    #[test]
    fn single_positive_weight_always_wins() {
        let only = driver("only", 5);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(pick_by_weight(&mut rng, &[&only]).unwrap(), "only");
        }
    }

    #[test]
    fn zero_weight_driver_never_drawn_when_total_is_positive() {
        let a = driver("a", 1);
        let b = driver("b", 0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(pick_by_weight(&mut rng, &[&a, &b]).unwrap(), "a");
        }
    }

    #[test]
    fn selection_ratio_follows_weights() {
        // weights 3:1 over 10k trials; expectation 7500/2500, sigma ~43.
        let heavy = driver("heavy", 3);
        let light = driver("light", 1);
        let counts = tally(&[&heavy, &light], 10_000);

        let heavy_hits = counts["heavy"];
        assert!(
            (7100..=7900).contains(&heavy_hits),
            "heavy drawn {heavy_hits} times out of 10000"
        );
    }

    #[test]
    fn all_zero_weights_fall_back_to_uniform() {
        let a = driver("a", 0);
        let b = driver("b", 0);
        let c = driver("c", 0);
        let counts = tally(&[&a, &b, &c], 9_000);

        for name in ["a", "b", "c"] {
            let hits = counts.get(name).copied().unwrap_or(0);
            assert!(
                (2600..=3400).contains(&hits),
                "{name} drawn {hits} times out of 9000"
            );
        }
    }
}
