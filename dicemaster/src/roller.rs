use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seeded die roller. Every roll gets its own `Roller`, built from the seed
/// the entropy cache hands out.
#[derive(Debug)]
pub struct Roller {
    rng: StdRng,
}

impl Roller {
    pub fn from_seed(seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        Roller { rng }
    }

    /// One face of a `die_size`-sided die, never below 1.
    pub fn d(&mut self, die_size: u32) -> u32 {
        self.rng.random_range(1..=die_size.max(1)).max(1)
    }

    pub fn roll_many(&mut self, count: u32, die_size: u32) -> Vec<u32> {
        (0..count).map(|_| self.d(die_size)).collect()
    }

    #[cfg(test)]
    pub fn test_rng() -> Self {
        Self::from_seed(42)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_in_range() {
        let mut rng = Roller::test_rng();
        for die_size in [1, 2, 6, 20, 1000] {
            for _ in 0..2000 {
                let roll = rng.d(die_size);
                assert!((1..=die_size).contains(&roll));
            }
        }
    }

    #[test]
    fn test_single_face_die() {
        let mut rng = Roller::test_rng();
        assert!(rng.roll_many(50, 1).iter().all(|&r| r == 1));
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let a = Roller::from_seed(7).roll_many(10, 20);
        let b = Roller::from_seed(7).roll_many(10, 20);
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
    }
}
