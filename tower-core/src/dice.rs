//! Random rolls used throughout the engine.
//!
//! Every roll takes its generator explicitly, so the caller decides where
//! randomness comes from: a seeded `StdRng` in tests, entropy in play.
//! Ranges are repaired instead of rejected, which keeps weak heroes
//! (attack below 2) from producing inverted bounds.

use rand::seq::SliceRandom;
use rand::Rng;

/// Normalize an inclusive range: the lower bound is raised to zero and
/// an upper bound below it collapses onto the lower bound.
pub fn clamp_range(low: i32, high: i32) -> (i32, i32) {
    let low = low.max(0);
    (low, high.max(low))
}

/// Roll an integer in `[low, high]` after [`clamp_range`].
pub fn roll_between<R: Rng + ?Sized>(rng: &mut R, low: i32, high: i32) -> i32 {
    let (low, high) = clamp_range(low, high);
    if low == high {
        return low;
    }
    rng.gen_range(low..=high)
}

/// Roll an unsigned integer in `[low, high]`, tolerating `high < low`.
pub fn roll_count<R: Rng + ?Sized>(rng: &mut R, low: u32, high: u32) -> u32 {
    let high = high.max(low);
    if low == high {
        return low;
    }
    rng.gen_range(low..=high)
}

/// Uniform roll in `[0, 1)`.
pub fn roll_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// True with probability `p`.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    roll_unit(rng) < p
}

/// Integer part of `value * factor`.
pub fn scale(value: i32, factor: f64) -> i32 {
    (value as f64 * factor) as i32
}

/// Pick one element uniformly.
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// Pick a uniformly random index among those satisfying `pred`.
pub fn pick_index<T, R, F>(rng: &mut R, items: &[T], pred: F) -> Option<usize>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> bool,
{
    let candidates: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| pred(item))
        .map(|(i, _)| i)
        .collect();
    candidates.choose(rng).copied()
}

/// Weighted choice: roll `1..=total` and walk the cumulative weights.
///
/// Falls back to the first entry when every weight is zero.
pub fn weighted_pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, table: &[(T, u32)]) -> Option<T> {
    let first = table.first()?.0;
    let total: u32 = table.iter().map(|(_, w)| *w).sum();
    if total == 0 {
        return Some(first);
    }
    let roll = rng.gen_range(1..=total);
    let mut running = 0;
    for (item, weight) in table {
        running += weight;
        if roll <= running {
            return Some(*item);
        }
    }
    Some(first)
}
