//! Corrective exercise recommendations from a movement-screen assessment.
//!
//! Every screen scoring below [`PASSING_SCORE`] contributes exactly one tag,
//! chosen uniformly from that screen's candidate list. Screens are visited in
//! [`Screen::ALL`] order so the first tag always belongs to the earliest
//! failing screen.

use crate::{AssessmentResult, CorrectionTag, Screen};
use rand::seq::SliceRandom;
use rand::Rng;

/// Scores at or above this need no correction
pub const PASSING_SCORE: u8 = 2;

/// Candidate corrective themes for a screen
pub fn candidates(screen: Screen) -> &'static [&'static str] {
    match screen {
        Screen::DeepSquat => &[
            "Goblet squat hold with heel elevation",
            "Ankle dorsiflexion mobilization",
            "Thoracic extension on foam roller",
        ],
        Screen::HurdleStep => &[
            "Single-leg balance with hip flexion",
            "Half-kneeling hip flexor mobilization",
        ],
        Screen::InlineLunge => &[
            "Half-kneeling hip flexor stretch",
            "Split squat with dowel alignment",
            "Adductor rock-back",
        ],
        Screen::ShoulderMobility => &[
            "Quadruped thoracic rotation",
            "Sleeper stretch",
            "Wall slides",
        ],
        Screen::ActiveStraightLegRaise => &[
            "Band-assisted leg lowering",
            "Active hamstring floss",
        ],
        Screen::TrunkStabilityPushUp => &[
            "Plank with shoulder taps",
            "Elevated push-up hold",
        ],
        Screen::RotaryStability => &[
            "Quadruped bird dog",
            "Dead bug with contralateral reach",
            "Half-kneeling cable chop",
        ],
    }
}

/// Recommend correction tags for an optional assessment.
///
/// Returns an empty list when no assessment is on file.
pub fn recommend<R: Rng + ?Sized>(
    assessment: Option<&AssessmentResult>,
    rng: &mut R,
) -> Vec<CorrectionTag> {
    let Some(assessment) = assessment else {
        tracing::debug!("No assessment on file, no corrections recommended");
        return Vec::new();
    };

    let mut tags = Vec::new();
    for screen in Screen::ALL {
        let score = assessment.scores.score(screen);
        if score >= PASSING_SCORE {
            continue;
        }

        if let Some(text) = candidates(screen).choose(rng) {
            tracing::debug!("{} scored {}, recommending '{}'", screen.label(), score, text);
            tags.push(CorrectionTag {
                screen,
                text: (*text).to_string(),
            });
        }
    }

    tracing::info!("Recommended {} corrective exercises", tags.len());
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScreenScores;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assessment(scores: ScreenScores) -> AssessmentResult {
        AssessmentResult {
            scores,
            notes: None,
            assessed_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_assessment_no_tags() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(recommend(None, &mut rng).is_empty());
    }

    #[test]
    fn test_passing_scores_no_tags() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = assessment(ScreenScores::uniform(2));
        assert!(recommend(Some(&a), &mut rng).is_empty());
    }

    #[test]
    fn test_deep_squat_only() {
        let mut scores = ScreenScores::uniform(3);
        scores.set(Screen::DeepSquat, 1);
        let a = assessment(scores);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let tags = recommend(Some(&a), &mut rng);
            assert_eq!(tags.len(), 1);
            assert_eq!(tags[0].screen, Screen::DeepSquat);
            assert!(candidates(Screen::DeepSquat).contains(&tags[0].text.as_str()));
        }
    }

    #[test]
    fn test_all_failing_gives_seven_in_screen_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = assessment(ScreenScores::uniform(0));
        let tags = recommend(Some(&a), &mut rng);

        assert_eq!(tags.len(), 7);
        let screens: Vec<_> = tags.iter().map(|t| t.screen).collect();
        assert_eq!(screens, Screen::ALL.to_vec());
    }

    #[test]
    fn test_one_tag_per_failing_screen() {
        let mut scores = ScreenScores::uniform(3);
        scores.set(Screen::ShoulderMobility, 0);
        scores.set(Screen::HurdleStep, 1);
        scores.set(Screen::RotaryStability, 2);
        let a = assessment(scores);

        let mut rng = StdRng::seed_from_u64(3);
        let tags = recommend(Some(&a), &mut rng);
        let screens: Vec<_> = tags.iter().map(|t| t.screen).collect();
        assert_eq!(screens, vec![Screen::HurdleStep, Screen::ShoulderMobility]);
    }

    #[test]
    fn test_candidate_lists_are_distinct_and_sized() {
        let mut all = std::collections::HashSet::new();
        for screen in Screen::ALL {
            let list = candidates(screen);
            assert!((2..=3).contains(&list.len()), "{:?}", screen);
            for text in list {
                assert!(all.insert(*text), "duplicate candidate '{}'", text);
            }
        }
    }
}
