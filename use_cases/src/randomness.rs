#[cfg(test)]
use mockall::automock;
use rand::Rng;

/// Injected randomness: driver selection spreads load by uniform pick and the
/// loyalty bonus draws a percentage, both pinned by test doubles.
#[cfg_attr(test, automock)]
pub trait Randomness: Send + Sync {
    /// Uniform index in `0..len`. Callers guarantee `len > 0`.
    fn pick_index(&self, len: usize) -> usize;

    /// Uniform integer in `[min, max]`.
    fn percent_between(&self, min: u8, max: u8) -> u8;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngRandomness;

impl Randomness for ThreadRngRandomness {
    fn pick_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn percent_between(&self, min: u8, max: u8) -> u8 {
        rand::thread_rng().gen_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_index_stays_in_bounds() {
        let randomness = ThreadRngRandomness;
        for _ in 0..100 {
            assert!(randomness.pick_index(5) < 5);
        }
    }

    #[test]
    fn test_percent_between_is_inclusive() {
        let randomness = ThreadRngRandomness;
        for _ in 0..100 {
            let percent = randomness.percent_between(5, 15);
            assert!((5..=15).contains(&percent));
        }
    }
}
