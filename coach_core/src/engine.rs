//! Program generation engine.
//!
//! This module turns a program day into a complete training day:
//! - Walk the day's template slot by slot
//! - Fill bucket slots from the categorized catalog, or a placeholder
//! - Fill correction slots from the assessment's correction tags
//! - Annotate loadable exercises and assemble the summary

use crate::assessment::AssessmentStore;
use crate::catalog::CatalogStore;
use crate::categorize::{categorize, BucketPools};
use crate::config::Config;
use crate::templates::{template_for, SlotTarget, SlotTemplate};
use crate::weights::{annotate, LoadRules};
use crate::{
    corrective, resolver, CorrectionTag, Error, ExerciseSource, GeneratedProgram, MovementBucket,
    ProgramDay, ProgramSummary, ProgramType, ResolvedExercise, ResolvedSection, Result,
    CORRECTION_PREFIX, PLACEHOLDER_PREFIX,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Name and instruction shown for a correction slot with no tag left
pub const OPEN_CORRECTION_LABEL: &str = "Optional corrective exercise";

/// Who and what to generate for
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub user_id: String,
    pub program: ProgramType,
    pub day: u8,
    pub now: DateTime<Utc>,
}

impl GenerationRequest {
    pub fn new(user_id: impl Into<String>, program: ProgramType, day: u8) -> Self {
        Self {
            user_id: user_id.into(),
            program,
            day,
            now: Utc::now(),
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Composed sections plus slot accounting
#[derive(Clone, Debug, PartialEq)]
pub struct SectionsOutcome {
    pub sections: Vec<ResolvedSection>,
    pub corrections_used: usize,
    pub placeholder_slots: usize,
    pub open_correction_slots: usize,
    /// Buckets that fell back to a placeholder, in bucket order
    pub empty_buckets: BTreeSet<MovementBucket>,
}

fn from_slot(
    slot: &SlotTemplate,
    exercise_id: String,
    name: String,
    source: ExerciseSource,
) -> ResolvedExercise {
    ResolvedExercise {
        exercise_id,
        name,
        source,
        sets: slot.sets,
        reps: slot.reps.to_reps(),
        rest_seconds: slot.rest_seconds,
        instruction: slot.instruction.map(str::to_string),
        weight_kg: None,
    }
}

/// Compose the sections of `program_day` from bucket pools and correction tags.
///
/// Correction slots take tags in order; the n-th tag used is identified as
/// `fms-correction-<n>`. Slots left over once tags run out become optional
/// entries. Tags beyond the available slots are dropped.
pub fn generate_sections<R: Rng + ?Sized>(
    program_day: ProgramDay,
    pools: &BucketPools,
    corrections: &[CorrectionTag],
    rng: &mut R,
) -> Result<SectionsOutcome> {
    let template = template_for(program_day)?;
    let mut tags = corrections.iter().enumerate();

    let mut outcome = SectionsOutcome {
        sections: Vec::with_capacity(template.sections.len()),
        corrections_used: 0,
        placeholder_slots: 0,
        open_correction_slots: 0,
        empty_buckets: BTreeSet::new(),
    };

    for section in template.sections {
        let mut exercises = Vec::with_capacity(section.slots.len());

        for slot in section.slots {
            let exercise = match slot.target {
                SlotTarget::Bucket(bucket) => match resolver::resolve(bucket, pools, rng) {
                    Some(picked) => from_slot(
                        slot,
                        picked.id.clone(),
                        picked.name.clone(),
                        ExerciseSource::Catalog,
                    ),
                    None => {
                        outcome.placeholder_slots += 1;
                        outcome.empty_buckets.insert(bucket);
                        from_slot(
                            slot,
                            bucket.placeholder_id(),
                            bucket.fallback_label().to_string(),
                            ExerciseSource::Placeholder,
                        )
                    }
                },
                SlotTarget::Correction => match tags.next() {
                    Some((index, tag)) => {
                        outcome.corrections_used += 1;
                        let mut exercise = from_slot(
                            slot,
                            format!("{}{}", CORRECTION_PREFIX, index + 1),
                            tag.text.clone(),
                            ExerciseSource::Correction,
                        );
                        if exercise.instruction.is_none() {
                            let screen = tag.screen.label().to_lowercase();
                            exercise.instruction = Some(format!("Corrective for {}", screen));
                        }
                        exercise
                    }
                    None => {
                        outcome.open_correction_slots += 1;
                        let mut exercise = from_slot(
                            slot,
                            format!("{}correction", PLACEHOLDER_PREFIX),
                            OPEN_CORRECTION_LABEL.to_string(),
                            ExerciseSource::Placeholder,
                        );
                        exercise.instruction = Some(OPEN_CORRECTION_LABEL.to_string());
                        exercise
                    }
                },
            };
            exercises.push(exercise);
        }

        outcome.sections.push(ResolvedSection {
            name: section.name.to_string(),
            exercises,
        });
    }

    let dropped = corrections.len().saturating_sub(template.correction_slots());
    if dropped > 0 {
        tracing::info!(
            "{} correction tags did not fit into {}",
            dropped,
            program_day
        );
    }

    Ok(outcome)
}

/// Generate a complete program for the request.
///
/// The day is validated before any store is read. A failing or empty catalog
/// aborts generation; a failing assessment store only costs the corrections.
pub fn generate_program<C, A, R>(
    request: &GenerationRequest,
    catalog: &C,
    assessments: &A,
    config: &Config,
    rng: &mut R,
) -> Result<GeneratedProgram>
where
    C: CatalogStore + ?Sized,
    A: AssessmentStore + ?Sized,
    R: Rng + ?Sized,
{
    let program_day = ProgramDay::new(request.program, request.day)?;
    let template = template_for(program_day)?;

    let exercises = catalog.list_active_exercises().map_err(|e| match e {
        Error::CatalogUnavailable(_) => e,
        other => Error::CatalogUnavailable(other.to_string()),
    })?;
    if exercises.is_empty() {
        return Err(Error::CatalogUnavailable(
            "catalog has no active exercises".into(),
        ));
    }

    let mut notes = Vec::new();
    let assessment = match assessments.latest_assessment(&request.user_id) {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(
                "Assessment for {} unavailable, generating without corrections: {}",
                request.user_id,
                e
            );
            notes.push("Assessment could not be read; no corrections applied".to_string());
            None
        }
    };

    let pools = categorize(&exercises);
    let corrections = corrective::recommend(assessment.as_ref(), rng);
    let mut outcome = generate_sections(program_day, &pools, &corrections, rng)?;

    let weighted = annotate(
        &mut outcome.sections,
        &LoadRules::from_config(&config.generation),
    );

    if !outcome.empty_buckets.is_empty() {
        let buckets: Vec<&str> = outcome.empty_buckets.iter().map(|b| b.as_str()).collect();
        notes.push(format!(
            "{} slot(s) use generic stand-ins, no catalog exercises for: {}",
            outcome.placeholder_slots,
            buckets.join(", ")
        ));
    }
    if corrections.len() > outcome.corrections_used {
        notes.push(format!(
            "{} correction(s) did not fit into this day",
            corrections.len() - outcome.corrections_used
        ));
    }
    if outcome.open_correction_slots > 0 {
        notes.push(format!(
            "{} corrective slot(s) are optional",
            outcome.open_correction_slots
        ));
    }

    let summary = ProgramSummary {
        corrections_used: outcome.corrections_used,
        placeholder_slots: outcome.placeholder_slots,
        open_correction_slots: outcome.open_correction_slots,
        degraded: outcome.placeholder_slots > 0,
        notes,
    };

    tracing::info!(
        "Generated {} for {}: {} sections, {} corrections, {} placeholders, {} weighted",
        program_day,
        request.user_id,
        outcome.sections.len(),
        summary.corrections_used,
        summary.placeholder_slots,
        weighted
    );

    Ok(GeneratedProgram {
        id: Uuid::new_v4(),
        user_id: request.user_id.clone(),
        title: template.title(),
        description: template.description.to_string(),
        date: request.now.date_naive(),
        duration_minutes: config.generation.session_minutes,
        program: program_day.program(),
        day: program_day.day(),
        sections: outcome.sections,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::NoAssessments;
    use crate::catalog::get_default_catalog;
    use crate::categorize::classify;
    use crate::{AssessmentResult, CatalogExercise, Screen, ScreenScores};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    /// One exercise per bucket
    fn one_per_bucket() -> Vec<CatalogExercise> {
        categorize(get_default_catalog())
            .iter()
            .map(|(_, pool)| pool[0].clone())
            .collect()
    }

    fn assessment_with(screen: Screen, score: u8) -> AssessmentResult {
        let mut scores = ScreenScores::uniform(3);
        scores.set(screen, score);
        AssessmentResult {
            scores,
            notes: None,
            assessed_at: Utc::now(),
        }
    }

    fn request(program: ProgramType, day: u8) -> GenerationRequest {
        GenerationRequest::new("alice", program, day)
    }

    /// Catalog store that counts how often it is read
    struct CountingCatalog {
        calls: Cell<usize>,
        exercises: Vec<CatalogExercise>,
    }

    impl CatalogStore for CountingCatalog {
        fn list_active_exercises(&self) -> Result<Vec<CatalogExercise>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.exercises.clone())
        }
    }

    struct FailingCatalog;

    impl CatalogStore for FailingCatalog {
        fn list_active_exercises(&self) -> Result<Vec<CatalogExercise>> {
            Err(Error::Other("connection refused".into()))
        }
    }

    struct FailingAssessments;

    impl AssessmentStore for FailingAssessments {
        fn latest_assessment(&self, _user_id: &str) -> Result<Option<AssessmentResult>> {
            Err(Error::AssessmentUnavailable("timed out".into()))
        }
    }

    #[test]
    fn test_every_bucket_populated_no_assessment() {
        let catalog = one_per_bucket();
        assert_eq!(catalog.len(), MovementBucket::ALL.len());

        let mut rng = StdRng::seed_from_u64(1);
        let program = generate_program(
            &request(ProgramType::FourDay, 1),
            &catalog,
            &NoAssessments,
            &Config::default(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(program.sections.len(), 6);
        assert_eq!(program.title, "Four-day program - Day 1: Explosive focus");
        assert_eq!(program.summary.corrections_used, 0);
        assert_eq!(program.summary.placeholder_slots, 0);
        assert_eq!(program.summary.open_correction_slots, 2);
        assert!(!program.summary.degraded);

        let ids: Vec<_> = catalog.iter().map(|e| e.id.as_str()).collect();
        for exercise in program.exercises() {
            match exercise.source {
                ExerciseSource::Catalog => assert!(ids.contains(&exercise.exercise_id.as_str())),
                ExerciseSource::Placeholder => {
                    assert_eq!(exercise.exercise_id, "placeholder-correction")
                }
                ExerciseSource::Correction => panic!("no assessment, no corrections"),
            }
        }
    }

    #[test]
    fn test_missing_knee_exercises_degrade_to_placeholders() {
        let catalog: Vec<_> = get_default_catalog()
            .iter()
            .filter(|e| {
                !matches!(
                    classify(e),
                    Some(
                        MovementBucket::KneeDominantBilateral
                            | MovementBucket::KneeDominantUnilateral
                    )
                )
            })
            .cloned()
            .collect();

        let mut rng = StdRng::seed_from_u64(2);
        let program = generate_program(
            &request(ProgramType::FourDay, 1),
            &catalog,
            &NoAssessments,
            &Config::default(),
            &mut rng,
        )
        .unwrap();

        let names: Vec<_> = program.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Warm-up",
                "Plyometric",
                "Core",
                "Hip-flexor stretch",
                "First circuit",
                "Second circuit"
            ]
        );

        let first_circuit = &program.sections[4].exercises[0];
        assert_eq!(first_circuit.exercise_id, "placeholder-knee-dominant-bilateral");
        assert_eq!(first_circuit.name, "Generic squat-pattern exercise");
        assert!(first_circuit.is_placeholder());
        assert_eq!(first_circuit.weight_kg, None);

        assert_eq!(program.summary.placeholder_slots, 1);
        assert!(program.summary.degraded);
        assert!(program
            .summary
            .notes
            .iter()
            .any(|n| n.contains("knee-dominant-bilateral")));
    }

    #[test]
    fn test_single_failing_screen_fills_first_correction_slot() {
        let assessment = assessment_with(Screen::DeepSquat, 1);
        let mut rng = StdRng::seed_from_u64(3);
        let program = generate_program(
            &request(ProgramType::FourDay, 1),
            get_default_catalog(),
            &assessment,
            &Config::default(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(program.summary.corrections_used, 1);
        assert_eq!(program.summary.open_correction_slots, 1);

        let warm_up = &program.sections[0].exercises;
        assert_eq!(warm_up[1].exercise_id, "fms-correction-1");
        assert_eq!(warm_up[1].source, ExerciseSource::Correction);
        assert!(corrective::candidates(Screen::DeepSquat).contains(&warm_up[1].name.as_str()));
        assert_eq!(warm_up[2].exercise_id, "placeholder-correction");
        assert_eq!(warm_up[2].instruction.as_deref(), Some(OPEN_CORRECTION_LABEL));
    }

    #[test]
    fn test_invalid_day_fails_before_catalog_read() {
        let catalog = CountingCatalog {
            calls: Cell::new(0),
            exercises: get_default_catalog().clone(),
        };
        let mut rng = StdRng::seed_from_u64(4);

        let result = generate_program(
            &request(ProgramType::TwoDay, 3),
            &catalog,
            &NoAssessments,
            &Config::default(),
            &mut rng,
        );

        assert!(matches!(
            result,
            Err(Error::InvalidProgramDay { day: 3, .. })
        ));
        assert_eq!(catalog.calls.get(), 0);
    }

    #[test]
    fn test_empty_catalog_is_unavailable() {
        let mut rng = StdRng::seed_from_u64(5);
        let result = generate_program(
            &request(ProgramType::TwoDay, 1),
            &Vec::<CatalogExercise>::new(),
            &NoAssessments,
            &Config::default(),
            &mut rng,
        );
        assert!(matches!(result, Err(Error::CatalogUnavailable(_))));
    }

    #[test]
    fn test_failing_catalog_is_unavailable() {
        let mut rng = StdRng::seed_from_u64(6);
        let result = generate_program(
            &request(ProgramType::TwoDay, 1),
            &FailingCatalog,
            &NoAssessments,
            &Config::default(),
            &mut rng,
        );
        assert!(matches!(result, Err(Error::CatalogUnavailable(_))));
    }

    #[test]
    fn test_failing_assessment_store_degrades() {
        crate::logging::init_test();
        let mut rng = StdRng::seed_from_u64(7);
        let program = generate_program(
            &request(ProgramType::ThreeDay, 2),
            get_default_catalog(),
            &FailingAssessments,
            &Config::default(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(program.summary.corrections_used, 0);
        assert!(program
            .summary
            .notes
            .iter()
            .any(|n| n.contains("Assessment could not be read")));
    }

    #[test]
    fn test_same_seed_same_program() {
        let assessment = assessment_with(Screen::RotaryStability, 0);
        let generate = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            generate_program(
                &request(ProgramType::ThreeDay, 3),
                get_default_catalog(),
                &assessment,
                &Config::default(),
                &mut rng,
            )
            .unwrap()
        };

        let a = generate(42);
        let b = generate(42);
        assert_eq!(a.sections, b.sections);
        assert_eq!(a.summary, b.summary);
    }

    #[test]
    fn test_program_metadata_from_template_and_config() {
        let mut config = Config::default();
        config.generation.session_minutes = 45;
        let now = "2024-05-06T08:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let mut rng = StdRng::seed_from_u64(8);
        let program = generate_program(
            &request(ProgramType::TwoDay, 2).at(now),
            get_default_catalog(),
            &NoAssessments,
            &config,
            &mut rng,
        )
        .unwrap();

        assert_eq!(program.title, "Two-day program - Day 2: Full body B");
        assert_eq!(program.duration_minutes, 45);
        assert_eq!(program.date.to_string(), "2024-05-06");
        assert_eq!(program.program, ProgramType::TwoDay);
        assert_eq!(program.day, 2);
        assert_eq!(program.user_id, "alice");
    }

    #[test]
    fn test_loadable_exercises_get_configured_weight() {
        let catalog = vec![
            CatalogExercise::new(
                "goblet_squat",
                "Kettlebell Goblet Squat",
                "Strength",
                "knee-dominant bilateral",
            ),
            CatalogExercise::new("push_up", "Push-up", "Strength", "horizontal push bilateral"),
        ];
        let mut config = Config::default();
        config.generation.default_weight_kg = 16.0;

        let mut rng = StdRng::seed_from_u64(9);
        let program = generate_program(
            &request(ProgramType::FourDay, 1),
            &catalog,
            &NoAssessments,
            &config,
            &mut rng,
        )
        .unwrap();

        for exercise in program.exercises() {
            match exercise.exercise_id.as_str() {
                "goblet_squat" => assert_eq!(exercise.weight_kg, Some(16.0)),
                _ => assert_eq!(exercise.weight_kg, None),
            }
        }
    }

    #[test]
    fn test_extra_tags_are_dropped() {
        let tags: Vec<_> = Screen::ALL
            .iter()
            .map(|&screen| CorrectionTag {
                screen,
                text: corrective::candidates(screen)[0].to_string(),
            })
            .collect();
        let pools = categorize(get_default_catalog());
        let day = ProgramDay::new(ProgramType::TwoDay, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(10);

        let outcome = generate_sections(day, &pools, &tags, &mut rng).unwrap();
        assert_eq!(outcome.corrections_used, 2);
        assert_eq!(template_for(day).unwrap().correction_slots(), 2);
        assert_eq!(outcome.open_correction_slots, 0);
        assert_eq!(outcome.sections[0].exercises[2].exercise_id, "fms-correction-2");
        assert_eq!(outcome.sections[0].exercises[2].name, tags[1].text);
    }

    #[test]
    fn test_every_day_resolves_with_empty_pools() {
        let pools = BucketPools::new();
        let mut rng = StdRng::seed_from_u64(11);

        for day in ProgramDay::all() {
            let outcome = generate_sections(day, &pools, &[], &mut rng).unwrap();
            let template = template_for(day).unwrap();
            assert_eq!(outcome.sections.len(), template.sections.len());
            assert_eq!(
                outcome.placeholder_slots + outcome.open_correction_slots,
                template.slots().count()
            );
            for exercise in outcome.sections.iter().flat_map(|s| &s.exercises) {
                assert!(exercise.exercise_id.starts_with(PLACEHOLDER_PREFIX));
                assert!(!exercise.name.is_empty());
            }
        }
    }
}
