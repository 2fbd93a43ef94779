//! Aging (approximate LRU) Replacement Policy.
//!
//! Every way of a set carries a small age counter in `0..=ways-1`. Age 0 marks the most
//! recently used way; the victim is the way with the largest age.
//!
//! - **Hit:** the hit way drops to 0. Every other valid way whose age is below both the
//!   cap (`ways-1`) and the hit way's age *before* the hit ages by one. Ways already older
//!   than the hit way keep their age, so several ways can age in lockstep and ties at the
//!   cap are possible.
//! - **Cold fill:** a line installed into an invalid way gets age 0 and every other way
//!   ages by one, capped at `ways-1`.
//! - **Replacement:** the way with the maximum age is overwritten (ties go to the lowest
//!   way index), then the set is updated as for a hit on that way. The new line already
//!   has age 0, so no other way is younger than it and the other ages stay put.
//!
//! # Performance
//!
//! - **Time Complexity:** O(W) per update or victim search, W the number of ways
//! - **Space Complexity:** one counter per way
//! - **Hardware Cost:** Low - log2(W) bits per way and a comparator tree

/// A set entry that carries a validity flag and an age counter.
pub trait Aged {
    /// Whether the entry holds a line.
    fn is_valid(&self) -> bool;
    /// Current age counter.
    fn age(&self) -> u8;
    /// Overwrites the age counter.
    fn set_age(&mut self, age: u8);
}

fn max_age(ways: usize) -> u8 {
    ways.saturating_sub(1) as u8
}

/// Updates ages after `way` was hit.
///
/// `prior_age` is the age `way` had before the access.
pub fn touch<E: Aged>(set: &mut [E], way: usize, prior_age: u8) {
    let cap = max_age(set.len());
    for (i, entry) in set.iter_mut().enumerate() {
        if i == way {
            entry.set_age(0);
        } else if entry.is_valid() && entry.age() < cap && entry.age() < prior_age {
            entry.set_age(entry.age() + 1);
        }
    }
}

/// Updates ages after `way` was overwritten with a new line.
pub fn replace<E: Aged>(set: &mut [E], way: usize) {
    touch(set, way, 0);
}

/// Updates ages after a cold fill of the previously invalid `way`.
pub fn fill<E: Aged>(set: &mut [E], way: usize) {
    let cap = max_age(set.len());
    for (i, entry) in set.iter_mut().enumerate() {
        if i == way {
            entry.set_age(0);
        } else if entry.age() < cap {
            entry.set_age(entry.age() + 1);
        }
    }
}

/// First invalid way of the set, if any.
pub fn free_way<E: Aged>(set: &[E]) -> Option<usize> {
    set.iter().position(|entry| !entry.is_valid())
}

/// The way to evict from a full set: maximum age, lowest index on ties.
pub fn victim<E: Aged>(set: &[E]) -> usize {
    set.iter()
        .enumerate()
        .fold((0, None::<u8>), |(best, best_age), (i, entry)| match best_age {
            Some(age) if entry.age() <= age => (best, best_age),
            _ => (i, Some(entry.age())),
        })
        .0
}
