//! Core domain types for the program synthesis engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Catalog exercises and the movement buckets they are sorted into
//! - Movement-screen assessments and the correction tags derived from them
//! - Program types and validated program days
//! - Resolved sections and the generated program handed to the workout store

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Catalog Types
// ============================================================================

/// An exercise as supplied by the catalog store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogExercise {
    pub id: String,
    pub name: String,
    pub category: String,
    pub movement_pattern: String,
    #[serde(default)]
    pub description: Option<String>,
    pub difficulty: u8,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl CatalogExercise {
    /// Convenience constructor for an active exercise without description
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        movement_pattern: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            movement_pattern: movement_pattern.into(),
            description: None,
            difficulty: 1,
            active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = difficulty;
        self
    }
}

// ============================================================================
// Movement Buckets
// ============================================================================

/// Movement-pattern bucket an exercise can be classified into.
///
/// Variant order matches the classification rule order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum MovementBucket {
    WarmUp,
    Core,
    Stretch,
    Plyometric,
    KneeDominantBilateral,
    KneeDominantUnilateral,
    HipDominantFlexed,
    HipDominantExtended,
    HorizontalPushBilateral,
    HorizontalPushUnilateral,
    HorizontalPullBilateral,
    HorizontalPullUnilateral,
    VerticalPushBilateral,
    VerticalPushUnilateral,
    VerticalPullBilateral,
    VerticalPullUnilateral,
    Rotational,
    Gait,
    Corrective,
    Rehab,
}

impl MovementBucket {
    pub const ALL: [MovementBucket; 20] = [
        MovementBucket::WarmUp,
        MovementBucket::Core,
        MovementBucket::Stretch,
        MovementBucket::Plyometric,
        MovementBucket::KneeDominantBilateral,
        MovementBucket::KneeDominantUnilateral,
        MovementBucket::HipDominantFlexed,
        MovementBucket::HipDominantExtended,
        MovementBucket::HorizontalPushBilateral,
        MovementBucket::HorizontalPushUnilateral,
        MovementBucket::HorizontalPullBilateral,
        MovementBucket::HorizontalPullUnilateral,
        MovementBucket::VerticalPushBilateral,
        MovementBucket::VerticalPushUnilateral,
        MovementBucket::VerticalPullBilateral,
        MovementBucket::VerticalPullUnilateral,
        MovementBucket::Rotational,
        MovementBucket::Gait,
        MovementBucket::Corrective,
        MovementBucket::Rehab,
    ];

    /// Stable kebab-case bucket name
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementBucket::WarmUp => "warm-up",
            MovementBucket::Core => "core",
            MovementBucket::Stretch => "stretch",
            MovementBucket::Plyometric => "plyometric",
            MovementBucket::KneeDominantBilateral => "knee-dominant-bilateral",
            MovementBucket::KneeDominantUnilateral => "knee-dominant-unilateral",
            MovementBucket::HipDominantFlexed => "hip-dominant-flexed",
            MovementBucket::HipDominantExtended => "hip-dominant-extended",
            MovementBucket::HorizontalPushBilateral => "horizontal-push-bilateral",
            MovementBucket::HorizontalPushUnilateral => "horizontal-push-unilateral",
            MovementBucket::HorizontalPullBilateral => "horizontal-pull-bilateral",
            MovementBucket::HorizontalPullUnilateral => "horizontal-pull-unilateral",
            MovementBucket::VerticalPushBilateral => "vertical-push-bilateral",
            MovementBucket::VerticalPushUnilateral => "vertical-push-unilateral",
            MovementBucket::VerticalPullBilateral => "vertical-pull-bilateral",
            MovementBucket::VerticalPullUnilateral => "vertical-pull-unilateral",
            MovementBucket::Rotational => "rotational",
            MovementBucket::Gait => "gait",
            MovementBucket::Corrective => "corrective",
            MovementBucket::Rehab => "rehab",
        }
    }

    /// Synthetic identifier used when this bucket has nothing to offer
    pub fn placeholder_id(&self) -> String {
        format!("{}{}", PLACEHOLDER_PREFIX, self.as_str())
    }

    /// Human-readable stand-in shown instead of an empty slot
    pub fn fallback_label(&self) -> &'static str {
        match self {
            MovementBucket::WarmUp => "Generic warm-up drill",
            MovementBucket::Core => "Generic core exercise",
            MovementBucket::Stretch => "Generic stretch",
            MovementBucket::Plyometric => "Generic jump or bound",
            MovementBucket::KneeDominantBilateral => "Generic squat-pattern exercise",
            MovementBucket::KneeDominantUnilateral => "Generic lunge or split-squat exercise",
            MovementBucket::HipDominantFlexed => "Generic hinge-pattern exercise",
            MovementBucket::HipDominantExtended => "Generic bridge or hip-thrust exercise",
            MovementBucket::HorizontalPushBilateral => "Generic horizontal press",
            MovementBucket::HorizontalPushUnilateral => "Generic single-arm horizontal press",
            MovementBucket::HorizontalPullBilateral => "Generic row",
            MovementBucket::HorizontalPullUnilateral => "Generic single-arm row",
            MovementBucket::VerticalPushBilateral => "Generic overhead press",
            MovementBucket::VerticalPushUnilateral => "Generic single-arm overhead press",
            MovementBucket::VerticalPullBilateral => "Generic pull-up or pulldown",
            MovementBucket::VerticalPullUnilateral => "Generic single-arm pulldown",
            MovementBucket::Rotational => "Generic rotational exercise",
            MovementBucket::Gait => "Generic carry or locomotion drill",
            MovementBucket::Corrective => "Generic corrective exercise",
            MovementBucket::Rehab => "Generic rehab exercise",
        }
    }
}

impl fmt::Display for MovementBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementBucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        MovementBucket::ALL
            .into_iter()
            .find(|b| b.as_str() == wanted)
            .ok_or_else(|| Error::Other(format!("Unknown movement bucket: {}", s)))
    }
}

/// Prefix of identifiers standing in for unresolved slots
pub const PLACEHOLDER_PREFIX: &str = "placeholder-";

/// Prefix of identifiers for slots backed by a correction tag
pub const CORRECTION_PREFIX: &str = "fms-correction-";

// ============================================================================
// Assessment Types
// ============================================================================

/// Highest score a single screen can receive
pub const MAX_SCREEN_SCORE: u8 = 3;

/// The seven movement screens, in evaluation order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    DeepSquat,
    HurdleStep,
    InlineLunge,
    ShoulderMobility,
    ActiveStraightLegRaise,
    TrunkStabilityPushUp,
    RotaryStability,
}

impl Screen {
    /// Fixed evaluation order. Correction slots are filled positionally from
    /// tags produced in this order.
    pub const ALL: [Screen; 7] = [
        Screen::DeepSquat,
        Screen::HurdleStep,
        Screen::InlineLunge,
        Screen::ShoulderMobility,
        Screen::ActiveStraightLegRaise,
        Screen::TrunkStabilityPushUp,
        Screen::RotaryStability,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Screen::DeepSquat => "Deep squat",
            Screen::HurdleStep => "Hurdle step",
            Screen::InlineLunge => "In-line lunge",
            Screen::ShoulderMobility => "Shoulder mobility",
            Screen::ActiveStraightLegRaise => "Active straight-leg raise",
            Screen::TrunkStabilityPushUp => "Trunk stability push-up",
            Screen::RotaryStability => "Rotary stability",
        }
    }
}

/// Scores for each screen, 0 to 3
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenScores {
    pub deep_squat: u8,
    pub hurdle_step: u8,
    pub inline_lunge: u8,
    pub shoulder_mobility: u8,
    pub active_straight_leg_raise: u8,
    pub trunk_stability_push_up: u8,
    pub rotary_stability: u8,
}

impl ScreenScores {
    /// Every screen at the same score
    pub fn uniform(score: u8) -> Self {
        Self {
            deep_squat: score,
            hurdle_step: score,
            inline_lunge: score,
            shoulder_mobility: score,
            active_straight_leg_raise: score,
            trunk_stability_push_up: score,
            rotary_stability: score,
        }
    }

    pub fn score(&self, screen: Screen) -> u8 {
        match screen {
            Screen::DeepSquat => self.deep_squat,
            Screen::HurdleStep => self.hurdle_step,
            Screen::InlineLunge => self.inline_lunge,
            Screen::ShoulderMobility => self.shoulder_mobility,
            Screen::ActiveStraightLegRaise => self.active_straight_leg_raise,
            Screen::TrunkStabilityPushUp => self.trunk_stability_push_up,
            Screen::RotaryStability => self.rotary_stability,
        }
    }

    pub fn set(&mut self, screen: Screen, score: u8) {
        let slot = match screen {
            Screen::DeepSquat => &mut self.deep_squat,
            Screen::HurdleStep => &mut self.hurdle_step,
            Screen::InlineLunge => &mut self.inline_lunge,
            Screen::ShoulderMobility => &mut self.shoulder_mobility,
            Screen::ActiveStraightLegRaise => &mut self.active_straight_leg_raise,
            Screen::TrunkStabilityPushUp => &mut self.trunk_stability_push_up,
            Screen::RotaryStability => &mut self.rotary_stability,
        };
        *slot = score;
    }
}

/// A movement-screen assessment as supplied by the assessment store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssessmentResult {
    pub scores: ScreenScores,
    #[serde(default)]
    pub notes: Option<String>,
    pub assessed_at: DateTime<Utc>,
}

impl AssessmentResult {
    /// Check every score is within 0..=3
    pub fn validate(&self) -> Result<()> {
        for screen in Screen::ALL {
            let score = self.scores.score(screen);
            if score > MAX_SCREEN_SCORE {
                return Err(Error::AssessmentUnavailable(format!(
                    "{} score {} exceeds {}",
                    screen.label(),
                    score,
                    MAX_SCREEN_SCORE
                )));
            }
        }
        Ok(())
    }
}

/// One recommended corrective theme
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorrectionTag {
    pub screen: Screen,
    pub text: String,
}

// ============================================================================
// Program Selection
// ============================================================================

/// Supported program lengths
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramType {
    TwoDay,
    ThreeDay,
    FourDay,
}

impl ProgramType {
    pub const ALL: [ProgramType; 3] = [
        ProgramType::TwoDay,
        ProgramType::ThreeDay,
        ProgramType::FourDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramType::TwoDay => "two-day",
            ProgramType::ThreeDay => "three-day",
            ProgramType::FourDay => "four-day",
        }
    }

    /// Number of training days, which is also the highest valid day index
    pub fn days(&self) -> u8 {
        match self {
            ProgramType::TwoDay => 2,
            ProgramType::ThreeDay => 3,
            ProgramType::FourDay => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgramType::TwoDay => "Two-day program",
            ProgramType::ThreeDay => "Three-day program",
            ProgramType::FourDay => "Four-day program",
        }
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgramType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "two-day" | "twoday" | "2-day" | "2" => Ok(ProgramType::TwoDay),
            "three-day" | "threeday" | "3-day" | "3" => Ok(ProgramType::ThreeDay),
            "four-day" | "fourday" | "4-day" | "4" => Ok(ProgramType::FourDay),
            _ => Err(Error::UnknownProgramType(s.to_string())),
        }
    }
}

/// A program type paired with a day index that is known to be in range
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
pub struct ProgramDay {
    program: ProgramType,
    day: u8,
}

impl ProgramDay {
    /// Validate `day` against the program length. Out-of-range days are
    /// rejected, never clamped.
    pub fn new(program: ProgramType, day: u8) -> Result<Self> {
        if day == 0 || day > program.days() {
            return Err(Error::InvalidProgramDay {
                program: program.as_str().to_string(),
                day,
            });
        }
        Ok(Self { program, day })
    }

    pub fn program(&self) -> ProgramType {
        self.program
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Every valid (program, day) pair
    pub fn all() -> impl Iterator<Item = ProgramDay> {
        ProgramType::ALL
            .into_iter()
            .flat_map(|program| (1..=program.days()).map(move |day| ProgramDay { program, day }))
    }
}

impl fmt::Display for ProgramDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} day {}", self.program, self.day)
    }
}

// ============================================================================
// Resolved Program Types
// ============================================================================

/// Prescribed repetitions: a plain count or a textual range ("8-10", "30 s")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Reps {
    Count(u32),
    Text(String),
}

impl fmt::Display for Reps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reps::Count(n) => write!(f, "{}", n),
            Reps::Text(s) => f.write_str(s),
        }
    }
}

/// Where a resolved exercise came from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseSource {
    /// A real exercise from the catalog
    Catalog,
    /// Synthetic stand-in for a slot that could not be resolved
    Placeholder,
    /// A recommended corrective theme rather than a catalog exercise
    Correction,
}

/// One filled slot of a generated program
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedExercise {
    pub exercise_id: String,
    pub name: String,
    pub source: ExerciseSource,
    pub sets: u32,
    pub reps: Reps,
    pub rest_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f32>,
}

impl ResolvedExercise {
    pub fn is_placeholder(&self) -> bool {
        self.source == ExerciseSource::Placeholder
    }
}

/// A named, ordered group of resolved exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedSection {
    pub name: String,
    pub exercises: Vec<ResolvedExercise>,
}

/// Generation metadata surfaced to the UI
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProgramSummary {
    /// Correction tags placed into correction slots
    pub corrections_used: usize,
    /// Bucket slots that fell back to a placeholder
    pub placeholder_slots: usize,
    /// Correction slots left without a tag
    pub open_correction_slots: usize,
    /// True when at least one bucket slot is a placeholder
    pub degraded: bool,
    pub notes: Vec<String>,
}

/// A complete generated training day, ready for the workout store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratedProgram {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub program: ProgramType,
    pub day: u8,
    pub sections: Vec<ResolvedSection>,
    pub summary: ProgramSummary,
}

impl GeneratedProgram {
    /// Iterate over every resolved exercise in section order
    pub fn exercises(&self) -> impl Iterator<Item = &ResolvedExercise> {
        self.sections.iter().flat_map(|s| s.exercises.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_names_roundtrip_through_serde() {
        for bucket in MovementBucket::ALL {
            let json = serde_json::to_string(&bucket).unwrap();
            assert_eq!(json, format!("\"{}\"", bucket.as_str()));
            assert_eq!(bucket.as_str().parse::<MovementBucket>().unwrap(), bucket);
        }
    }

    #[test]
    fn test_placeholder_id_format() {
        assert_eq!(
            MovementBucket::KneeDominantBilateral.placeholder_id(),
            "placeholder-knee-dominant-bilateral"
        );
    }

    #[test]
    fn test_parse_program_types() {
        assert_eq!("two-day".parse::<ProgramType>().unwrap(), ProgramType::TwoDay);
        assert_eq!("THREE_DAY".parse::<ProgramType>().unwrap(), ProgramType::ThreeDay);
        assert_eq!("4".parse::<ProgramType>().unwrap(), ProgramType::FourDay);
        assert!(matches!(
            "five-day".parse::<ProgramType>(),
            Err(Error::UnknownProgramType(_))
        ));
    }

    #[test]
    fn test_program_day_bounds() {
        assert!(ProgramDay::new(ProgramType::TwoDay, 2).is_ok());
        assert!(ProgramDay::new(ProgramType::FourDay, 4).is_ok());

        match ProgramDay::new(ProgramType::TwoDay, 3) {
            Err(Error::InvalidProgramDay { program, day }) => {
                assert_eq!(program, "two-day");
                assert_eq!(day, 3);
            }
            other => panic!("Expected InvalidProgramDay, got {:?}", other),
        }

        assert!(ProgramDay::new(ProgramType::ThreeDay, 0).is_err());
        assert!(ProgramDay::new(ProgramType::ThreeDay, 4).is_err());
    }

    #[test]
    fn test_all_program_days() {
        assert_eq!(ProgramDay::all().count(), 9);
    }

    #[test]
    fn test_assessment_validation_rejects_out_of_range() {
        let mut scores = ScreenScores::uniform(3);
        scores.set(Screen::RotaryStability, 4);
        let assessment = AssessmentResult {
            scores,
            notes: None,
            assessed_at: Utc::now(),
        };
        assert!(matches!(
            assessment.validate(),
            Err(Error::AssessmentUnavailable(_))
        ));
    }

    #[test]
    fn test_reps_serialize_untagged() {
        assert_eq!(serde_json::to_string(&Reps::Count(8)).unwrap(), "8");
        assert_eq!(
            serde_json::to_string(&Reps::Text("30 s".into())).unwrap(),
            "\"30 s\""
        );
    }
}
