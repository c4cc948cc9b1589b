//! Static program templates.
//!
//! Every valid (program type, day) pair maps to one [`ProgramTemplate`]: a
//! theme plus an ordered list of sections, each an ordered list of slots.
//! The composer in [`crate::engine`] interprets these generically; program
//! and day differences live here as data only.

use crate::{Error, MovementBucket as B, ProgramDay, ProgramType, Reps, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// What a slot is filled from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotTarget {
    /// A random exercise from this bucket
    Bucket(B),
    /// The next unused correction tag
    Correction,
}

impl fmt::Display for SlotTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotTarget::Bucket(b) => write!(f, "{}", b),
            SlotTarget::Correction => f.write_str("correction"),
        }
    }
}

/// Reps as written in a template
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepsSpec {
    Count(u32),
    Text(&'static str),
}

impl RepsSpec {
    pub fn to_reps(self) -> Reps {
        match self {
            RepsSpec::Count(n) => Reps::Count(n),
            RepsSpec::Text(s) => Reps::Text(s.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotTemplate {
    pub target: SlotTarget,
    pub sets: u32,
    pub reps: RepsSpec,
    pub rest_seconds: u32,
    pub instruction: Option<&'static str>,
}

impl SlotTemplate {
    const fn note(self, instruction: &'static str) -> Self {
        SlotTemplate {
            instruction: Some(instruction),
            ..self
        }
    }
}

#[derive(Debug)]
pub struct SectionTemplate {
    pub name: &'static str,
    pub slots: &'static [SlotTemplate],
}

#[derive(Debug)]
pub struct ProgramTemplate {
    pub program: ProgramType,
    pub day: u8,
    pub theme: &'static str,
    pub description: &'static str,
    pub sections: &'static [SectionTemplate],
}

impl ProgramTemplate {
    /// Display title, e.g. "Four-day program - Day 1: Explosive focus"
    pub fn title(&self) -> String {
        format!("{} - Day {}: {}", self.program.label(), self.day, self.theme)
    }

    pub fn slots(&self) -> impl Iterator<Item = &SlotTemplate> {
        self.sections.iter().flat_map(|s| s.slots.iter())
    }

    pub fn correction_slots(&self) -> usize {
        self.slots()
            .filter(|s| s.target == SlotTarget::Correction)
            .count()
    }
}

const fn slot(bucket: B, sets: u32, reps: RepsSpec, rest_seconds: u32) -> SlotTemplate {
    SlotTemplate {
        target: SlotTarget::Bucket(bucket),
        sets,
        reps,
        rest_seconds,
        instruction: None,
    }
}

const fn correction(sets: u32, reps: RepsSpec, rest_seconds: u32) -> SlotTemplate {
    SlotTemplate {
        target: SlotTarget::Correction,
        sets,
        reps,
        rest_seconds,
        instruction: None,
    }
}

const fn reps(n: u32) -> RepsSpec {
    RepsSpec::Count(n)
}

const fn text(s: &'static str) -> RepsSpec {
    RepsSpec::Text(s)
}

// ============================================================================
// Shared sections
// ============================================================================

const WARM_UP: SectionTemplate = SectionTemplate {
    name: "Warm-up",
    slots: &[
        slot(B::WarmUp, 1, text("5 min"), 0),
        correction(2, reps(8), 30),
        correction(2, reps(8), 30),
    ],
};

const COOL_DOWN: SectionTemplate = SectionTemplate {
    name: "Cool-down stretch",
    slots: &[slot(B::Stretch, 2, text("30 s per side"), 0)],
};

// ============================================================================
// Templates
// ============================================================================

pub static TEMPLATES: [ProgramTemplate; 9] = [
    // ------------------------------------------------------------------ two-day
    ProgramTemplate {
        program: ProgramType::TwoDay,
        day: 1,
        theme: "Full body A",
        description: "Squat, press and pull pattern day with a short plyometric primer.",
        sections: &[
            WARM_UP,
            SectionTemplate {
                name: "Plyometric",
                slots: &[slot(B::Plyometric, 3, reps(5), 60)],
            },
            SectionTemplate {
                name: "First circuit",
                slots: &[
                    slot(B::KneeDominantBilateral, 3, reps(8), 90),
                    slot(B::HorizontalPushBilateral, 3, reps(8), 90),
                    slot(B::VerticalPullBilateral, 3, reps(8), 90),
                ],
            },
            SectionTemplate {
                name: "Second circuit",
                slots: &[
                    slot(B::HipDominantFlexed, 3, reps(10), 60),
                    slot(B::HorizontalPullUnilateral, 3, text("10 per side"), 60),
                    slot(B::Core, 3, text("30 s"), 30),
                ],
            },
            COOL_DOWN,
        ],
    },
    ProgramTemplate {
        program: ProgramType::TwoDay,
        day: 2,
        theme: "Full body B",
        description: "Single-leg, overhead and rotational work finished with a carry.",
        sections: &[
            WARM_UP,
            SectionTemplate {
                name: "First circuit",
                slots: &[
                    slot(B::KneeDominantUnilateral, 3, text("8 per side"), 90),
                    slot(B::VerticalPushBilateral, 3, reps(8), 90),
                    slot(B::HorizontalPullBilateral, 3, reps(10), 90),
                ],
            },
            SectionTemplate {
                name: "Second circuit",
                slots: &[
                    slot(B::HipDominantExtended, 3, reps(12), 60),
                    slot(B::HorizontalPushUnilateral, 3, text("10 per side"), 60),
                    slot(B::Rotational, 3, text("8 per side"), 45),
                ],
            },
            SectionTemplate {
                name: "Finisher",
                slots: &[slot(B::Gait, 3, text("30 m"), 60)],
            },
            COOL_DOWN,
        ],
    },
    // ---------------------------------------------------------------- three-day
    ProgramTemplate {
        program: ProgramType::ThreeDay,
        day: 1,
        theme: "Lower-body emphasis",
        description: "Heavy knee- and hip-dominant work with a pulling accessory.",
        sections: &[
            WARM_UP,
            SectionTemplate {
                name: "Plyometric",
                slots: &[slot(B::Plyometric, 3, reps(5), 60)],
            },
            SectionTemplate {
                name: "Strength block",
                slots: &[
                    slot(B::KneeDominantBilateral, 4, reps(6), 120),
                    slot(B::HipDominantFlexed, 4, reps(6), 120),
                    slot(B::KneeDominantUnilateral, 3, text("8 per side"), 90),
                ],
            },
            SectionTemplate {
                name: "Accessory",
                slots: &[
                    slot(B::HorizontalPullBilateral, 3, reps(10), 60),
                    slot(B::Core, 3, text("30 s"), 30),
                ],
            },
            COOL_DOWN,
        ],
    },
    ProgramTemplate {
        program: ProgramType::ThreeDay,
        day: 2,
        theme: "Upper-body emphasis",
        description: "Horizontal and vertical pressing and pulling with trunk work.",
        sections: &[
            WARM_UP,
            SectionTemplate {
                name: "Strength block",
                slots: &[
                    slot(B::HorizontalPushBilateral, 4, reps(6), 120),
                    slot(B::VerticalPullBilateral, 4, reps(6), 120),
                    slot(B::VerticalPushUnilateral, 3, text("8 per side"), 90),
                    slot(B::HorizontalPullUnilateral, 3, text("10 per side"), 60),
                ],
            },
            SectionTemplate {
                name: "Core",
                slots: &[
                    slot(B::Core, 3, text("30 s"), 30),
                    slot(B::Rotational, 3, text("8 per side"), 45),
                ],
            },
            COOL_DOWN,
        ],
    },
    ProgramTemplate {
        program: ProgramType::ThreeDay,
        day: 3,
        theme: "Full-body circuit",
        description: "Unilateral full-body circuit with short rests.",
        sections: &[
            WARM_UP,
            SectionTemplate {
                name: "Circuit",
                slots: &[
                    slot(B::KneeDominantUnilateral, 3, text("10 per side"), 30),
                    slot(B::HipDominantExtended, 3, reps(12), 30),
                    slot(B::HorizontalPushUnilateral, 3, text("10 per side"), 30),
                    slot(B::VerticalPullUnilateral, 3, text("10 per side"), 30),
                    slot(B::Gait, 3, text("30 m"), 90)
                        .note("Rest after the carry, then start the next round"),
                ],
            },
            SectionTemplate {
                name: "Core",
                slots: &[slot(B::Core, 3, text("40 s"), 30)],
            },
            COOL_DOWN,
        ],
    },
    // ----------------------------------------------------------------- four-day
    ProgramTemplate {
        program: ProgramType::FourDay,
        day: 1,
        theme: "Explosive focus",
        description: "Jumps first, then fast concentric strength work in two circuits.",
        sections: &[
            WARM_UP,
            SectionTemplate {
                name: "Plyometric",
                slots: &[slot(B::Plyometric, 4, reps(5), 60)
                    .note("Full recovery between sets, land softly")],
            },
            SectionTemplate {
                name: "Core",
                slots: &[slot(B::Core, 3, text("30 s"), 30)],
            },
            SectionTemplate {
                name: "Hip-flexor stretch",
                slots: &[slot(B::Stretch, 2, text("30 s per side"), 0)],
            },
            SectionTemplate {
                name: "First circuit",
                slots: &[
                    slot(B::KneeDominantBilateral, 4, reps(6), 90)
                        .note("Drive up as fast as possible"),
                    slot(B::HorizontalPushBilateral, 4, reps(8), 90),
                    slot(B::HorizontalPullBilateral, 4, reps(8), 90),
                ],
            },
            SectionTemplate {
                name: "Second circuit",
                slots: &[
                    slot(B::HipDominantFlexed, 3, reps(8), 75),
                    slot(B::VerticalPushUnilateral, 3, text("8 per side"), 75),
                    slot(B::Rotational, 3, text("6 per side"), 60),
                ],
            },
        ],
    },
    ProgramTemplate {
        program: ProgramType::FourDay,
        day: 2,
        theme: "Strength focus",
        description: "Lower reps, longer rests, finished with a loaded carry.",
        sections: &[
            WARM_UP,
            SectionTemplate {
                name: "Core",
                slots: &[slot(B::Core, 3, text("40 s"), 30)],
            },
            SectionTemplate {
                name: "First circuit",
                slots: &[
                    slot(B::KneeDominantUnilateral, 4, text("6 per side"), 120),
                    slot(B::VerticalPullBilateral, 4, reps(6), 120),
                    slot(B::VerticalPushBilateral, 4, reps(6), 120),
                ],
            },
            SectionTemplate {
                name: "Second circuit",
                slots: &[
                    slot(B::HipDominantExtended, 3, reps(8), 90),
                    slot(B::HorizontalPullUnilateral, 3, text("8 per side"), 90),
                    slot(B::HorizontalPushUnilateral, 3, text("8 per side"), 90),
                ],
            },
            SectionTemplate {
                name: "Finisher",
                slots: &[slot(B::Gait, 3, text("30 m"), 60)],
            },
        ],
    },
    ProgramTemplate {
        program: ProgramType::FourDay,
        day: 3,
        theme: "Combined circuit",
        description: "One long full-body circuit mixing every main pattern.",
        sections: &[
            WARM_UP,
            SectionTemplate {
                name: "Plyometric",
                slots: &[slot(B::Plyometric, 3, reps(6), 60)],
            },
            SectionTemplate {
                name: "Circuit",
                slots: &[
                    slot(B::KneeDominantBilateral, 4, reps(10), 30),
                    slot(B::HipDominantFlexed, 4, reps(10), 30),
                    slot(B::HorizontalPushBilateral, 4, reps(10), 30),
                    slot(B::VerticalPullBilateral, 4, reps(8), 30),
                    slot(B::Rotational, 4, text("8 per side"), 30),
                    slot(B::Gait, 4, text("20 m"), 90)
                        .note("Rest after the carry, then start the next round"),
                ],
            },
            SectionTemplate {
                name: "Core",
                slots: &[slot(B::Core, 3, text("30 s"), 30)],
            },
        ],
    },
    ProgramTemplate {
        program: ProgramType::FourDay,
        day: 4,
        theme: "Mobility and recovery focus",
        description: "Corrective and mobility work at low intensity.",
        sections: &[
            SectionTemplate {
                name: "Warm-up",
                slots: &[
                    slot(B::WarmUp, 1, text("5 min"), 0),
                    correction(2, reps(8), 30),
                    correction(2, reps(8), 30),
                    correction(2, reps(8), 30),
                ],
            },
            SectionTemplate {
                name: "Mobility",
                slots: &[
                    slot(B::Stretch, 2, text("45 s per side"), 0),
                    slot(B::Stretch, 2, text("45 s per side"), 0),
                    slot(B::Stretch, 2, text("45 s per side"), 0),
                ],
            },
            SectionTemplate {
                name: "Core",
                slots: &[slot(B::Core, 2, text("30 s"), 30)],
            },
            SectionTemplate {
                name: "Recovery",
                slots: &[
                    slot(B::Corrective, 2, reps(10), 30),
                    slot(B::Rehab, 2, reps(12), 30),
                    slot(B::Gait, 1, text("10 min"), 0).note("Easy pace"),
                ],
            },
        ],
    },
];

static INDEX: Lazy<HashMap<ProgramDay, &'static ProgramTemplate>> = Lazy::new(|| {
    TEMPLATES
        .iter()
        .filter_map(|t| ProgramDay::new(t.program, t.day).ok().map(|key| (key, t)))
        .collect()
});

/// Template for a validated program day
pub fn template_for(day: ProgramDay) -> Result<&'static ProgramTemplate> {
    INDEX
        .get(&day)
        .copied()
        .ok_or_else(|| Error::Other(format!("No template defined for {}", day)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_program_day_has_a_template() {
        for day in ProgramDay::all() {
            let template = template_for(day).unwrap();
            assert_eq!(template.program, day.program());
            assert_eq!(template.day, day.day());
        }
    }

    #[test]
    fn test_template_keys_are_unique_and_valid() {
        let keys: HashSet<_> = TEMPLATES.iter().map(|t| (t.program, t.day)).collect();
        assert_eq!(keys.len(), TEMPLATES.len());
        assert_eq!(INDEX.len(), TEMPLATES.len());
    }

    #[test]
    fn test_four_day_day_one_sections() {
        let day = ProgramDay::new(ProgramType::FourDay, 1).unwrap();
        let names: Vec<_> = template_for(day)
            .unwrap()
            .sections
            .iter()
            .map(|s| s.name)
            .collect();
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
    }

    #[test]
    fn test_four_day_themes() {
        let themes: Vec<_> = (1..=4)
            .map(|d| {
                let day = ProgramDay::new(ProgramType::FourDay, d).unwrap();
                template_for(day).unwrap().theme
            })
            .collect();
        assert_eq!(
            themes,
            vec![
                "Explosive focus",
                "Strength focus",
                "Combined circuit",
                "Mobility and recovery focus"
            ]
        );
    }

    #[test]
    fn test_every_template_opens_with_correctives() {
        for t in TEMPLATES.iter() {
            assert_eq!(t.sections[0].name, "Warm-up", "{}", t.title());
            assert!(t.correction_slots() >= 2, "{}", t.title());
            assert!(t.sections.iter().all(|s| !s.slots.is_empty()));
        }
    }

    #[test]
    fn test_title_format() {
        let day = ProgramDay::new(ProgramType::TwoDay, 2).unwrap();
        assert_eq!(
            template_for(day).unwrap().title(),
            "Two-day program - Day 2: Full body B"
        );
    }
}
