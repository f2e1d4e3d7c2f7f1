//! Chat notifications telling a player what they were awarded.

use crate::text::{TextArg, TranslatableText};

const POINTS_AWARDED: &str = "valhelsia.advancement_levels.points.awarded";
const PROGRESS_AWARDED: &str = "valhelsia.advancement_levels.progress.awarded";
const LEVELS_AWARDED: &str = "valhelsia.advancement_levels.levels.awarded";
const SKILL_AWARDED: &str = "valhelsia.advancement_levels.skills.awarded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Unspent skill points.
    Points(i64),
    /// Progress towards the next level.
    Progress(i64),
    Levels(i64),
    /// Points put straight into a named skill.
    Skill { skill: String, points: i64 },
}

impl Notification {
    /// Map a reward record's stat name to the matching notification.
    #[must_use]
    pub fn for_stat(stat: &str, points: i64) -> Self {
        match stat {
            "points" => Self::Points(points),
            "progress" => Self::Progress(points),
            "level" => Self::Levels(points),
            skill => Self::Skill {
                skill: skill.to_string(),
                points,
            },
        }
    }

    #[must_use]
    pub fn to_text(&self) -> TranslatableText {
        match self {
            Self::Points(points) => {
                TranslatableText::translate(POINTS_AWARDED, vec![TextArg::Number(*points)])
            }
            Self::Progress(points) => {
                TranslatableText::translate(PROGRESS_AWARDED, vec![TextArg::Number(*points)])
            }
            Self::Levels(points) => {
                TranslatableText::translate(LEVELS_AWARDED, vec![TextArg::Number(*points)])
            }
            Self::Skill { skill, points } => TranslatableText::translate(
                SKILL_AWARDED,
                vec![TextArg::Number(*points), skill_name(skill).into()],
            ),
        }
    }
}

/// LevelZ display name of a skill.
#[must_use]
pub fn skill_name(skill: &str) -> TranslatableText {
    TranslatableText::translate(format!("spritetip.levelz.{skill}_skill"), Vec::new())
}
