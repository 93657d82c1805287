use crate::evolution::Candidate;
use rand::Rng;

/// Highest rank the selector considers.
pub const RANK_BOUND: usize = 49;

/// Picks a parent from a population sorted by descending fitness.
///
/// Rank `i` wins when the uniform draw `t` satisfies `t <= 2^-i` and no higher
/// rank already did, so almost all of the mass sits on the first few ranks while
/// low ranks keep a small chance.
///
/// # Returns
/// * `Option<&Candidate>` - `None` only when the population is empty
pub fn select<'p, R: Rng>(population: &'p [Candidate], rng: &mut R) -> Option<&'p Candidate> {
    let t: f64 = rng.random();
    population.get(pick_rank(t, population.len())?)
}

/// The rank chosen for draw `t` in a population of `len` candidates, never past
/// the last index.
pub fn pick_rank(t: f64, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let start = RANK_BOUND.min(last);
    let rank = (0..=start)
        .rev()
        .find(|&i| t <= 0.5f64.powi(i as i32))
        .unwrap_or(0);
    Some(rank)
}
