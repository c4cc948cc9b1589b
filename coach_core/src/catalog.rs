//! Exercise catalog access.
//!
//! The engine reads the catalog through [`CatalogStore`]. Two stores ship
//! here: any in-memory `Vec<CatalogExercise>` and [`CsvCatalog`] for catalogs
//! exported to CSV. A built-in demo catalog covering every movement bucket is
//! available through [`get_default_catalog`].

use crate::{CatalogExercise, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Read-only source of catalog exercises
pub trait CatalogStore {
    /// Snapshot of every active exercise
    fn list_active_exercises(&self) -> Result<Vec<CatalogExercise>>;
}

impl CatalogStore for Vec<CatalogExercise> {
    fn list_active_exercises(&self) -> Result<Vec<CatalogExercise>> {
        Ok(self.iter().filter(|e| e.active).cloned().collect())
    }
}

impl CatalogStore for [CatalogExercise] {
    fn list_active_exercises(&self) -> Result<Vec<CatalogExercise>> {
        Ok(self.iter().filter(|e| e.active).cloned().collect())
    }
}

// ============================================================================
// CSV catalog
// ============================================================================

/// CSV row format: `id,name,category,movement_pattern,description,difficulty,active`
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    name: String,
    category: String,
    movement_pattern: String,
    description: Option<String>,
    difficulty: u8,
    active: Option<bool>,
}

impl From<CsvRow> for CatalogExercise {
    fn from(row: CsvRow) -> Self {
        CatalogExercise {
            id: row.id,
            name: row.name,
            category: row.category,
            movement_pattern: row.movement_pattern,
            description: row.description.filter(|d| !d.trim().is_empty()),
            difficulty: row.difficulty,
            active: row.active.unwrap_or(true),
        }
    }
}

/// Catalog backed by a CSV file with a header row
#[derive(Clone, Debug)]
pub struct CsvCatalog {
    path: PathBuf,
}

impl CsvCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogStore for CsvCatalog {
    fn list_active_exercises(&self) -> Result<Vec<CatalogExercise>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut exercises = Vec::new();
        for (row_num, result) in reader.deserialize::<CsvRow>().enumerate() {
            match result {
                Ok(row) => {
                    let exercise = CatalogExercise::from(row);
                    if exercise.active {
                        exercises.push(exercise);
                    }
                }
                Err(e) => {
                    // Skip malformed rows, keep the rest of the catalog usable
                    tracing::warn!("Skipping catalog row {}: {}", row_num + 2, e);
                }
            }
        }

        tracing::debug!(
            "Read {} active exercises from {:?}",
            exercises.len(),
            self.path
        );
        Ok(exercises)
    }
}

// ============================================================================
// Built-in catalog
// ============================================================================

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Vec<CatalogExercise>> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Vec<CatalogExercise> {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Vec<CatalogExercise> {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> Vec<CatalogExercise> {
    let ex = CatalogExercise::new;

    vec![
        // Warm-up
        ex("jumping_jacks", "Jumping Jacks", "Warm-up", "general"),
        ex("arm_circles", "Arm Circles", "Warm-up", "shoulder prep"),
        // Core
        ex("front_plank", "Front Plank", "Core", "anti-extension"),
        ex("side_plank", "Side Plank", "Core", "anti-lateral flexion").with_difficulty(2),
        // Stretch
        ex(
            "half_kneeling_hip_flexor_stretch",
            "Half-Kneeling Hip Flexor Stretch",
            "Stretch",
            "hip flexor",
        ),
        ex("couch_stretch", "Couch Stretch", "Stretch", "quadriceps").with_difficulty(2),
        // Plyometric
        ex("box_jump", "Box Jump", "Plyometric", "jump bilateral").with_difficulty(2),
        ex("skater_jump", "Skater Jump", "Plyometric", "jump unilateral").with_difficulty(2),
        // Knee-dominant
        ex(
            "goblet_squat",
            "Kettlebell Goblet Squat",
            "Strength",
            "knee-dominant bilateral",
        )
        .with_difficulty(2),
        ex("back_squat", "Barbell Back Squat", "Strength", "knee-dominant bilateral")
            .with_difficulty(3),
        ex(
            "reverse_lunge",
            "Dumbbell Reverse Lunge",
            "Strength",
            "knee-dominant unilateral",
        )
        .with_difficulty(2),
        ex(
            "bulgarian_split_squat",
            "Bulgarian Split Squat",
            "Strength",
            "knee-dominant unilateral",
        )
        .with_difficulty(3),
        // Hip-dominant
        ex("romanian_deadlift", "Romanian Deadlift", "Strength", "hip-dominant")
            .with_difficulty(3),
        ex("kb_swing", "Kettlebell Swing", "Strength", "hip-dominant")
            .with_description("Ballistic hinge")
            .with_difficulty(2),
        ex("glute_bridge", "Glute Bridge", "Strength", "hip-dominant"),
        ex("hip_thrust", "Barbell Hip Thrust", "Strength", "hip-dominant").with_difficulty(3),
        // Horizontal push
        ex("push_up", "Push-up", "Strength", "horizontal push bilateral").with_difficulty(2),
        ex(
            "db_bench_press",
            "Dumbbell Bench Press",
            "Strength",
            "horizontal push bilateral",
        )
        .with_difficulty(2),
        ex(
            "single_arm_floor_press",
            "Single-Arm Dumbbell Floor Press",
            "Strength",
            "horizontal push unilateral",
        )
        .with_difficulty(2),
        // Horizontal pull
        ex("inverted_row", "Inverted Row", "Strength", "horizontal pull bilateral")
            .with_difficulty(2),
        ex(
            "single_arm_db_row",
            "Single-Arm Dumbbell Row",
            "Strength",
            "horizontal pull unilateral",
        )
        .with_difficulty(2),
        // Vertical push
        ex(
            "overhead_press",
            "Barbell Overhead Press",
            "Strength",
            "vertical push bilateral",
        )
        .with_difficulty(3),
        ex(
            "half_kneeling_kb_press",
            "Half-Kneeling KB Press",
            "Strength",
            "vertical push unilateral",
        )
        .with_difficulty(2),
        // Vertical pull
        ex("pull_up", "Pull-up", "Strength", "vertical pull bilateral").with_difficulty(4),
        ex("lat_pulldown", "Lat Pulldown", "Strength", "vertical pull bilateral"),
        ex(
            "single_arm_pulldown",
            "Single-Arm Lat Pulldown",
            "Strength",
            "vertical pull unilateral",
        )
        .with_difficulty(2),
        // Rotational
        ex("landmine_rotation", "Landmine Rotation", "Power", "rotational").with_difficulty(3),
        ex(
            "med_ball_rotational_throw",
            "Med Ball Rotational Throw",
            "Power",
            "rotational",
        )
        .with_difficulty(2),
        // Gait
        ex("farmers_carry", "Farmer's Carry", "Conditioning", "loaded carry").with_difficulty(2),
        ex("sled_push", "Sled Push", "Conditioning", "gait").with_difficulty(3),
        // Corrective and rehab
        ex("band_pull_apart", "Band Pull-Apart", "Corrective", "scapular"),
        ex("ankle_alphabet", "Ankle Alphabet", "Rehab", "ankle"),
        // Retired from the gym floor
        CatalogExercise {
            active: false,
            ..ex(
                "machine_chest_fly",
                "Machine Chest Fly",
                "Strength",
                "horizontal push bilateral",
            )
        },
    ]
}

/// Validate catalog contents for consistency
///
/// Returns a list of validation errors, or empty Vec if valid.
pub fn validate_exercises(exercises: &[CatalogExercise]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for exercise in exercises {
        if exercise.id.trim().is_empty() {
            errors.push(format!("Exercise '{}' has empty ID", exercise.name));
        } else if !seen.insert(exercise.id.as_str()) {
            errors.push(format!("Duplicate exercise ID '{}'", exercise.id));
        }
        if exercise.name.trim().is_empty() {
            errors.push(format!("Exercise '{}' has empty name", exercise.id));
        }
        if !(1..=5).contains(&exercise.difficulty) {
            errors.push(format!(
                "Exercise '{}': difficulty {} outside 1-5",
                exercise.id, exercise.difficulty
            ));
        }
    }

    errors
}
