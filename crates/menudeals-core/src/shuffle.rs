use rand::seq::SliceRandom;
use rand::Rng;

/// Uniformly random permutation of `items`, leaving the input untouched.
///
/// `SliceRandom::shuffle` is an in-place Fisher-Yates, so every permutation
/// is equally likely given a uniform `rng`.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut copy = items.to_vec();
    copy.shuffle(rng);
    copy
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn input_order_is_preserved() {
        let original = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let mut rng = StdRng::seed_from_u64(42);
        let out = shuffled(&original, &mut rng);
        assert_eq!(original, vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let mut sorted = out.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, original);
    }

    #[test]
    fn same_seed_same_permutation() {
        let items: Vec<u32> = (0..20).collect();
        let a = shuffled(&items, &mut StdRng::seed_from_u64(7));
        let b = shuffled(&items, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_and_single_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffled::<u8, _>(&[], &mut rng).is_empty());
        assert_eq!(shuffled(&["only"], &mut rng), vec!["only"]);
    }

    #[test]
    fn permutations_are_roughly_uniform() {
        let items = ['a', 'b', 'c'];
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts: HashMap<Vec<char>, u32> = HashMap::new();
        for _ in 0..6000 {
            *counts.entry(shuffled(&items, &mut rng)).or_default() += 1;
        }
        assert_eq!(counts.len(), 6, "every permutation should appear");
        for (perm, count) in counts {
            assert!(
                (850..=1150).contains(&count),
                "permutation {perm:?} seen {count} times"
            );
        }
    }
}
