//! Random selection of one exercise per slot.

use crate::categorize::BucketPools;
use crate::{CatalogExercise, MovementBucket};
use rand::seq::SliceRandom;
use rand::Rng;

/// Pick an exercise from `bucket` uniformly at random.
///
/// Returns `None` when the bucket is empty or was never populated; callers
/// turn that into a placeholder.
pub fn resolve<'a, R: Rng + ?Sized>(
    bucket: MovementBucket,
    pools: &'a BucketPools,
    rng: &mut R,
) -> Option<&'a CatalogExercise> {
    let picked = pools.get(bucket).choose(rng);
    if picked.is_none() {
        tracing::debug!("Bucket {} is empty", bucket);
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn pools_with_rows(n: usize) -> BucketPools {
        let mut pools = BucketPools::new();
        for i in 0..n {
            pools.insert(
                MovementBucket::HorizontalPullBilateral,
                CatalogExercise::new(format!("row_{}", i), "Row", "Strength", "horizontal pull bilateral"),
            );
        }
        pools
    }

    #[test]
    fn test_empty_bucket_resolves_to_none() {
        let pools = pools_with_rows(2);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(resolve(MovementBucket::Gait, &pools, &mut rng).is_none());
    }

    #[test]
    fn test_single_exercise_always_chosen() {
        let pools = pools_with_rows(1);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            let picked = resolve(MovementBucket::HorizontalPullBilateral, &pools, &mut rng).unwrap();
            assert_eq!(picked.id, "row_0");
        }
    }

    #[test]
    fn test_selection_covers_pool() {
        let pools = pools_with_rows(3);
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<_> = (0..200)
            .filter_map(|_| resolve(MovementBucket::HorizontalPullBilateral, &pools, &mut rng))
            .map(|e| e.id.clone())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_same_seed_same_choice() {
        let pools = pools_with_rows(5);
        let a = resolve(MovementBucket::HorizontalPullBilateral, &pools, &mut StdRng::seed_from_u64(9));
        let b = resolve(MovementBucket::HorizontalPullBilateral, &pools, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.map(|e| &e.id), b.map(|e| &e.id));
    }
}
