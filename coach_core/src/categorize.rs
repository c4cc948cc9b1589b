//! Rule-based classification of catalog exercises into movement buckets.
//!
//! Classification walks [`RULES`] in order and places each exercise in the
//! bucket of the first rule that matches. Exercises matching nothing are
//! left out. Labels are split into lower-cased words and rules match whole
//! words or phrases, so "Knee-Dominant_Bilateral" matches "knee dominant"
//! while "half-kneeling" does not.
//!
//! Family rules (warm-up, core, push, pull, ...) look only at the category and
//! movement-pattern labels. The bilateral/unilateral and flexed/extended
//! splits also look at the name and description.

use crate::{CatalogExercise, MovementBucket};
use std::collections::BTreeMap;

/// Normalised word views of an exercise, built once per classification
#[derive(Debug)]
pub struct ExerciseText {
    labels: Vec<String>,
    detail: Vec<String>,
}

impl ExerciseText {
    pub fn of(exercise: &CatalogExercise) -> Self {
        let mut labels = words(&exercise.category);
        labels.extend(words(&exercise.movement_pattern));

        let mut detail = words(&exercise.movement_pattern);
        detail.extend(words(&exercise.name));
        if let Some(description) = exercise.description.as_deref() {
            detail.extend(words(description));
        }

        Self { labels, detail }
    }

    fn label_has_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|t| has_term(&self.labels, t))
    }

    fn label_has_all(&self, terms: &[&str]) -> bool {
        terms.iter().all(|t| has_term(&self.labels, t))
    }

    fn detail_has_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|t| has_term(&self.detail, t))
    }
}

/// Lower-cased words; `-`, `_` and any other punctuation separate words
fn words(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `term` (one word or a space-separated phrase) appears as whole
/// consecutive words
fn has_term(words: &[String], term: &str) -> bool {
    let phrase: Vec<&str> = term.split(' ').collect();
    words
        .windows(phrase.len())
        .any(|w| w.iter().zip(&phrase).all(|(a, b)| a == b))
}

/// One link of the classification chain
pub struct BucketRule {
    pub bucket: MovementBucket,
    predicate: fn(&ExerciseText) -> bool,
}

impl BucketRule {
    pub fn matches(&self, text: &ExerciseText) -> bool {
        (self.predicate)(text)
    }
}

impl std::fmt::Debug for BucketRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketRule")
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// The classification chain. Order is significant: first match wins.
#[rustfmt::skip]
pub static RULES: [BucketRule; 20] = [
    BucketRule { bucket: MovementBucket::WarmUp, predicate: is_warm_up },
    BucketRule { bucket: MovementBucket::Core, predicate: is_core },
    BucketRule { bucket: MovementBucket::Stretch, predicate: is_stretch },
    BucketRule { bucket: MovementBucket::Plyometric, predicate: is_plyometric },
    BucketRule { bucket: MovementBucket::KneeDominantBilateral, predicate: is_knee_bilateral },
    BucketRule { bucket: MovementBucket::KneeDominantUnilateral, predicate: is_knee_dominant },
    BucketRule { bucket: MovementBucket::HipDominantFlexed, predicate: is_hip_flexed },
    BucketRule { bucket: MovementBucket::HipDominantExtended, predicate: is_hip_dominant },
    BucketRule { bucket: MovementBucket::HorizontalPushBilateral, predicate: is_horizontal_push_bilateral },
    BucketRule { bucket: MovementBucket::HorizontalPushUnilateral, predicate: is_horizontal_push },
    BucketRule { bucket: MovementBucket::HorizontalPullBilateral, predicate: is_horizontal_pull_bilateral },
    BucketRule { bucket: MovementBucket::HorizontalPullUnilateral, predicate: is_horizontal_pull },
    BucketRule { bucket: MovementBucket::VerticalPushBilateral, predicate: is_vertical_push_bilateral },
    BucketRule { bucket: MovementBucket::VerticalPushUnilateral, predicate: is_vertical_push },
    BucketRule { bucket: MovementBucket::VerticalPullBilateral, predicate: is_vertical_pull_bilateral },
    BucketRule { bucket: MovementBucket::VerticalPullUnilateral, predicate: is_vertical_pull },
    BucketRule { bucket: MovementBucket::Rotational, predicate: is_rotational },
    BucketRule { bucket: MovementBucket::Gait, predicate: is_gait },
    BucketRule { bucket: MovementBucket::Corrective, predicate: is_corrective },
    BucketRule { bucket: MovementBucket::Rehab, predicate: is_rehab },
];

fn is_warm_up(t: &ExerciseText) -> bool {
    t.label_has_any(&["warm up", "warmup", "echauffement", "échauffement"])
}

fn is_core(t: &ExerciseText) -> bool {
    t.label_has_any(&["core", "gainage"])
}

fn is_stretch(t: &ExerciseText) -> bool {
    t.label_has_any(&["stretch", "stretching", "etirement", "étirement", "mobility"])
}

fn is_plyometric(t: &ExerciseText) -> bool {
    t.label_has_any(&["plyo", "plyometric", "plyometrics", "jump", "jumps"])
}

fn is_knee_dominant(t: &ExerciseText) -> bool {
    t.label_has_any(&["knee dominant"])
}

fn is_hip_dominant(t: &ExerciseText) -> bool {
    t.label_has_any(&["hip dominant", "hinge"])
}

fn is_hip_extended(t: &ExerciseText) -> bool {
    t.detail_has_any(&["extended", "extension", "bridge", "bridges", "thrust", "thrusts"])
}

fn is_horizontal_push(t: &ExerciseText) -> bool {
    t.label_has_all(&["horizontal", "push"])
}

fn is_horizontal_pull(t: &ExerciseText) -> bool {
    t.label_has_all(&["horizontal", "pull"])
}

fn is_vertical_push(t: &ExerciseText) -> bool {
    t.label_has_all(&["vertical", "push"])
}

fn is_vertical_pull(t: &ExerciseText) -> bool {
    t.label_has_all(&["vertical", "pull"])
}

fn is_bilateral(t: &ExerciseText) -> bool {
    t.detail_has_any(&["bilateral"])
}

fn is_knee_bilateral(t: &ExerciseText) -> bool {
    is_knee_dominant(t) && is_bilateral(t)
}

fn is_hip_flexed(t: &ExerciseText) -> bool {
    is_hip_dominant(t) && !is_hip_extended(t)
}

fn is_horizontal_push_bilateral(t: &ExerciseText) -> bool {
    is_horizontal_push(t) && is_bilateral(t)
}

fn is_horizontal_pull_bilateral(t: &ExerciseText) -> bool {
    is_horizontal_pull(t) && is_bilateral(t)
}

fn is_vertical_push_bilateral(t: &ExerciseText) -> bool {
    is_vertical_push(t) && is_bilateral(t)
}

fn is_vertical_pull_bilateral(t: &ExerciseText) -> bool {
    is_vertical_pull(t) && is_bilateral(t)
}

fn is_rotational(t: &ExerciseText) -> bool {
    t.label_has_any(&["rotation", "rotational"])
}

fn is_gait(t: &ExerciseText) -> bool {
    t.label_has_any(&["gait", "carry", "carries", "locomotion"])
}

fn is_corrective(t: &ExerciseText) -> bool {
    t.label_has_any(&["corrective", "correction"])
}

fn is_rehab(t: &ExerciseText) -> bool {
    t.label_has_any(&["rehab", "rehabilitation"])
}

/// Bucket of the first matching rule, if any
pub fn classify(exercise: &CatalogExercise) -> Option<MovementBucket> {
    let text = ExerciseText::of(exercise);
    RULES.iter().find(|r| r.matches(&text)).map(|r| r.bucket)
}

/// Exercises grouped by movement bucket.
///
/// Each exercise appears in at most one bucket. Iteration follows bucket
/// order, and within a bucket the input order is kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BucketPools {
    pools: BTreeMap<MovementBucket, Vec<CatalogExercise>>,
}

impl BucketPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bucket: MovementBucket, exercise: CatalogExercise) {
        self.pools.entry(bucket).or_default().push(exercise);
    }

    /// Exercises in `bucket`; empty when the bucket has none
    pub fn get(&self, bucket: MovementBucket) -> &[CatalogExercise] {
        self.pools.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (MovementBucket, &[CatalogExercise])> {
        self.pools.iter().map(|(b, v)| (*b, v.as_slice()))
    }

    /// Total number of classified exercises
    pub fn total(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Classify every exercise into its bucket
pub fn categorize(exercises: &[CatalogExercise]) -> BucketPools {
    let mut pools = BucketPools::new();
    let mut unmatched = 0usize;

    for exercise in exercises {
        match classify(exercise) {
            Some(bucket) => pools.insert(bucket, exercise.clone()),
            None => {
                unmatched += 1;
                tracing::debug!(
                    "Exercise '{}' ({} / {}) matched no bucket",
                    exercise.id,
                    exercise.category,
                    exercise.movement_pattern
                );
            }
        }
    }

    tracing::info!(
        "Categorized {} exercises ({} unmatched)",
        pools.total(),
        unmatched
    );

    pools
}
