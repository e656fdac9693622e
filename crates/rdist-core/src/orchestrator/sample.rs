//! Uniform host draw without replacement.

use rand::Rng;

/// Draws `count` distinct pool positions uniformly at random and returns those hosts
/// in draw order. Caller guarantees `count <= pool.len()`.
pub(super) fn draw_hosts<R: Rng + ?Sized>(pool: &[String], count: usize, rng: &mut R) -> Vec<String> {
    rand::seq::index::sample(rng, pool.len(), count)
        .into_iter()
        .map(|i| pool[i].clone())
        .collect()
}
