//! Phase math.
//!
//! Canonical phase domain is `[0,2π)`. These three functions are the
//! numeric bedrock the rest of the crate builds on: wrapping, signed
//! shortest angular difference, and the Kuramoto order parameter.

use std::f64::consts::{PI, TAU};

/// Wrap `x` into `[0,2π)`.
pub fn wrap(x: f64) -> f64 {
    let w = x % TAU;
    if w < 0.0 {
        w + TAU
    } else {
        w
    }
}

/// Signed shortest phase difference `d` in `(-π, π]` such that
/// `wrap(current + d) == wrap(target)`.
pub fn phase_difference(target: f64, current: f64) -> f64 {
    let raw = wrap(target - current + PI) - PI;
    // wrap() never returns exactly 2π, so raw is in [-π, π). Boundary care:
    // exactly -π must map to +π per spec.
    if raw <= -PI {
        PI
    } else {
        raw
    }
}

/// Kuramoto order parameter over a slice of phases.
///
/// Returns 0 for an empty slice (callers must guard; spec leaves N=0
/// undefined) and 1 for a single phase.
pub fn order_parameter(phases: &[f64]) -> f64 {
    let n = phases.len();
    if n == 0 {
        return 0.0;
    }
    let (sum_cos, sum_sin) = phases
        .iter()
        .fold((0.0, 0.0), |(c, s), &p| (c + p.cos(), s + p.sin()));
    (sum_cos * sum_cos + sum_sin * sum_sin).sqrt() / n as f64
}
