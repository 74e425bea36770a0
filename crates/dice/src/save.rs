//! Saving throws against a difficulty class.

use crate::roll::D20Roll;
use crate::rules::SaveExtremes;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SaveOutcome {
    Success,
    Failure,
}

impl SaveOutcome {
    pub const fn is_success(self) -> bool {
        matches!(self, SaveOutcome::Success)
    }
}

/// Resolves a saving throw. Ties go to the defender.
pub fn resolve_saving_throw(roll: &D20Roll, dc: i32, extremes: SaveExtremes) -> SaveOutcome {
    if extremes == SaveExtremes::NaturalOneAndTwenty {
        if roll.is_critical() {
            return SaveOutcome::Success;
        }
        if roll.is_fumble() {
            return SaveOutcome::Failure;
        }
    }
    if roll.total() >= dc {
        SaveOutcome::Success
    } else {
        SaveOutcome::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::AdvantageState;

    fn roll(natural: u32, modifier: i32) -> D20Roll {
        D20Roll::from_naturals(natural, None, modifier, AdvantageState::Normal)
    }

    #[test]
    fn ties_favour_the_defender() {
        assert_eq!(resolve_saving_throw(&roll(12, 1), 13, SaveExtremes::None), SaveOutcome::Success);
        assert_eq!(resolve_saving_throw(&roll(11, 1), 13, SaveExtremes::None), SaveOutcome::Failure);
    }

    #[test]
    fn naturals_only_matter_when_configured() {
        assert_eq!(resolve_saving_throw(&roll(20, -5), 18, SaveExtremes::None), SaveOutcome::Failure);
        assert_eq!(
            resolve_saving_throw(&roll(20, -5), 18, SaveExtremes::NaturalOneAndTwenty),
            SaveOutcome::Success
        );
        assert_eq!(resolve_saving_throw(&roll(1, 20), 10, SaveExtremes::None), SaveOutcome::Success);
        assert_eq!(
            resolve_saving_throw(&roll(1, 20), 10, SaveExtremes::NaturalOneAndTwenty),
            SaveOutcome::Failure
        );
    }
}
