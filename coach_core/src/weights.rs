//! Default-load annotation for exercises that look loadable.
//!
//! Best effort: an exercise whose name mentions a kettlebell or dumbbell gets
//! the configured default load. Missing a loadable exercise is fine. Giving a
//! load to a placeholder or correction entry is not, so only catalog
//! exercises are ever considered.

use crate::config::GenerationConfig;
use crate::{ExerciseSource, ResolvedExercise, ResolvedSection};

/// Keywords up to this length must match a whole word ("kb", "db")
const SHORT_KEYWORD_LEN: usize = 2;

/// Keyword set and load used by [`annotate`]
#[derive(Clone, Debug)]
pub struct LoadRules {
    pub default_weight_kg: f32,
    pub keywords: Vec<String>,
}

impl Default for LoadRules {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl LoadRules {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            default_weight_kg: config.default_weight_kg,
            keywords: config
                .loadable_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    /// Whether `name` mentions loadable equipment
    pub fn is_loadable(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        let words: Vec<&str> = name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        self.keywords.iter().any(|k| {
            if k.chars().count() <= SHORT_KEYWORD_LEN {
                words.iter().any(|w| *w == k.as_str())
            } else {
                name.contains(k.as_str())
            }
        })
    }

    fn eligible(&self, exercise: &ResolvedExercise) -> bool {
        exercise.source == ExerciseSource::Catalog
            && exercise.weight_kg.is_none()
            && self.is_loadable(&exercise.name)
    }
}

/// Assign the default load to eligible exercises in place.
///
/// Returns how many exercises were annotated.
pub fn annotate(sections: &mut [ResolvedSection], rules: &LoadRules) -> usize {
    let mut annotated = 0;

    for exercise in sections.iter_mut().flat_map(|s| s.exercises.iter_mut()) {
        if rules.eligible(exercise) {
            exercise.weight_kg = Some(rules.default_weight_kg);
            annotated += 1;
            tracing::debug!(
                "Default load {} kg for '{}'",
                rules.default_weight_kg,
                exercise.name
            );
        }
    }

    annotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reps;

    fn exercise(id: &str, name: &str, source: ExerciseSource) -> ResolvedExercise {
        ResolvedExercise {
            exercise_id: id.into(),
            name: name.into(),
            source,
            sets: 3,
            reps: Reps::Count(8),
            rest_seconds: 60,
            instruction: None,
            weight_kg: None,
        }
    }

    fn section(exercises: Vec<ResolvedExercise>) -> Vec<ResolvedSection> {
        vec![ResolvedSection {
            name: "Test".into(),
            exercises,
        }]
    }

    #[test]
    fn test_keyword_matching() {
        let rules = LoadRules::default();
        assert!(rules.is_loadable("Kettlebell Swing"));
        assert!(rules.is_loadable("KB goblet squat"));
        assert!(rules.is_loadable("Single-arm DB row"));
        assert!(rules.is_loadable("Développé haltères"));
        assert!(!rules.is_loadable("Push-up"));
        // Short keywords need a whole word
        assert!(!rules.is_loadable("Kbox jump"));
        assert!(!rules.is_loadable("Feedback drill"));
    }

    #[test]
    fn test_annotates_catalog_exercise() {
        let rules = LoadRules::default();
        let mut sections = section(vec![exercise("ex1", "Kettlebell Swing", ExerciseSource::Catalog)]);

        assert_eq!(annotate(&mut sections, &rules), 1);
        assert_eq!(sections[0].exercises[0].weight_kg, Some(12.0));
    }

    #[test]
    fn test_existing_weight_untouched() {
        let rules = LoadRules::default();
        let mut ex = exercise("ex1", "Kettlebell Swing", ExerciseSource::Catalog);
        ex.weight_kg = Some(24.0);
        let mut sections = section(vec![ex]);

        assert_eq!(annotate(&mut sections, &rules), 0);
        assert_eq!(sections[0].exercises[0].weight_kg, Some(24.0));
    }

    #[test]
    fn test_placeholder_and_correction_untouched() {
        let rules = LoadRules::default();
        let mut sections = section(vec![
            exercise("placeholder-gait", "Kettlebell carry", ExerciseSource::Placeholder),
            exercise("fms-correction-1", "KB halo", ExerciseSource::Correction),
        ]);

        assert_eq!(annotate(&mut sections, &rules), 0);
        assert!(sections[0].exercises.iter().all(|e| e.weight_kg.is_none()));
    }

    #[test]
    fn test_custom_rules() {
        let rules = LoadRules {
            default_weight_kg: 8.0,
            keywords: vec!["sandbag".into()],
        };
        let mut sections = section(vec![
            exercise("a", "Sandbag carry", ExerciseSource::Catalog),
            exercise("b", "Kettlebell Swing", ExerciseSource::Catalog),
        ]);

        assert_eq!(annotate(&mut sections, &rules), 1);
        assert_eq!(sections[0].exercises[0].weight_kg, Some(8.0));
        assert_eq!(sections[0].exercises[1].weight_kg, None);
    }
}
