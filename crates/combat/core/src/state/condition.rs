//! Condition instances and their duration bookkeeping.

use arrayvec::ArrayVec;
use dice_resolution::{Ability, ConditionKind};

use crate::config::CombatConfig;

use super::token::TokenId;

/// How long a condition lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConditionDuration {
    /// Counts down at the end of each of the affected creature's turns and
    /// expires at zero.
    Rounds(u32),
    /// Ends when the affected creature succeeds on a saving throw at the end
    /// of one of its turns.
    UntilSave { ability: Ability, dc: i32 },
    /// Lasts until removed explicitly.
    Permanent,
}

impl ConditionDuration {
    /// Ordering used by the refresh rule: round counts compare by value, a
    /// save-ended duration outlasts any round count (higher DC wins between
    /// two), and permanent outlasts everything.
    fn rank(&self) -> (u8, i64) {
        match *self {
            ConditionDuration::Rounds(n) => (0, n as i64),
            ConditionDuration::UntilSave { dc, .. } => (1, dc as i64),
            ConditionDuration::Permanent => (2, 0),
        }
    }

    pub fn outlasts(&self, other: &ConditionDuration) -> bool {
        self.rank() > other.rank()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionInstance {
    pub kind: ConditionKind,
    /// Token that imposed the condition, if any.
    pub source: Option<TokenId>,
    pub duration: ConditionDuration,
}

impl ConditionInstance {
    pub const fn new(kind: ConditionKind, duration: ConditionDuration) -> Self {
        Self {
            kind,
            source: None,
            duration,
        }
    }

    pub const fn from_source(mut self, source: TokenId) -> Self {
        self.source = Some(source);
        self
    }
}

/// Result of adding a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionUpdate {
    Added,
    /// Already present; the longer duration now applies.
    Refreshed,
    /// Already present with an equal or longer duration.
    Unchanged,
    /// No room for another condition.
    Full,
}

/// Active conditions on a creature. At most one instance per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conditions {
    active: ArrayVec<ConditionInstance, { CombatConfig::MAX_CONDITIONS }>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, kind: ConditionKind) -> bool {
        self.active.iter().any(|c| c.kind == kind)
    }

    pub fn get(&self, kind: ConditionKind) -> Option<&ConditionInstance> {
        self.active.iter().find(|c| c.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConditionInstance> {
        self.active.iter()
    }

    /// Kinds currently active, in application order.
    pub fn kinds(&self) -> Vec<ConditionKind> {
        self.active.iter().map(|c| c.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Adds a condition. Reapplying an active kind keeps whichever duration
    /// lasts longer.
    pub fn apply(&mut self, instance: ConditionInstance) -> ConditionUpdate {
        if let Some(existing) = self.active.iter_mut().find(|c| c.kind == instance.kind) {
            if instance.duration.outlasts(&existing.duration) {
                *existing = instance;
                return ConditionUpdate::Refreshed;
            }
            return ConditionUpdate::Unchanged;
        }
        match self.active.try_push(instance) {
            Ok(()) => ConditionUpdate::Added,
            Err(_) => ConditionUpdate::Full,
        }
    }

    pub fn remove(&mut self, kind: ConditionKind) -> bool {
        let before = self.active.len();
        self.active.retain(|c| c.kind != kind);
        self.active.len() != before
    }

    /// Decrements every round-based duration by one and drops those that
    /// reach zero. Returns the expired kinds.
    pub fn tick_rounds(&mut self) -> Vec<ConditionKind> {
        let mut expired = Vec::new();
        for condition in self.active.iter_mut() {
            if let ConditionDuration::Rounds(n) = &mut condition.duration {
                *n = n.saturating_sub(1);
                if *n == 0 {
                    expired.push(condition.kind);
                }
            }
        }
        self.active
            .retain(|c| !matches!(c.duration, ConditionDuration::Rounds(0)));
        expired
    }

    /// Conditions that end on a successful save, with the save to roll.
    pub fn save_ended(&self) -> Vec<(ConditionKind, Ability, i32)> {
        self.active
            .iter()
            .filter_map(|c| match c.duration {
                ConditionDuration::UntilSave { ability, dc } => Some((c.kind, ability, dc)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rounds(kind: ConditionKind, n: u32) -> ConditionInstance {
        ConditionInstance::new(kind, ConditionDuration::Rounds(n))
    }

    #[test]
    fn reapplying_keeps_longer_duration() {
        let mut conditions = Conditions::new();
        assert_eq!(conditions.apply(rounds(ConditionKind::Poisoned, 2)), ConditionUpdate::Added);
        assert_eq!(
            conditions.apply(rounds(ConditionKind::Poisoned, 1)),
            ConditionUpdate::Unchanged
        );
        assert_eq!(
            conditions.apply(rounds(ConditionKind::Poisoned, 5)),
            ConditionUpdate::Refreshed
        );
        assert_eq!(conditions.len(), 1);
        assert_eq!(
            conditions.get(ConditionKind::Poisoned).map(|c| c.duration),
            Some(ConditionDuration::Rounds(5))
        );
    }

    #[test]
    fn permanent_and_save_ended_outlast_rounds() {
        let save = ConditionDuration::UntilSave {
            ability: Ability::Wisdom,
            dc: 13,
        };
        assert!(save.outlasts(&ConditionDuration::Rounds(100)));
        assert!(ConditionDuration::Permanent.outlasts(&save));
        assert!(!ConditionDuration::Rounds(3).outlasts(&ConditionDuration::Rounds(3)));
    }

    #[test]
    fn round_durations_tick_down_and_expire() {
        let mut conditions = Conditions::new();
        conditions.apply(rounds(ConditionKind::Blinded, 1));
        conditions.apply(rounds(ConditionKind::Frightened, 2));
        conditions.apply(ConditionInstance::new(ConditionKind::Prone, ConditionDuration::Permanent));

        assert_eq!(conditions.tick_rounds(), vec![ConditionKind::Blinded]);
        assert_eq!(
            conditions.get(ConditionKind::Frightened).map(|c| c.duration),
            Some(ConditionDuration::Rounds(1))
        );
        assert_eq!(conditions.tick_rounds(), vec![ConditionKind::Frightened]);
        assert_eq!(conditions.kinds(), vec![ConditionKind::Prone]);
    }

    #[test]
    fn capacity_is_bounded() {
        use strum::IntoEnumIterator;
        let mut conditions = Conditions::new();
        for kind in ConditionKind::iter() {
            assert_ne!(conditions.apply(rounds(kind, 1)), ConditionUpdate::Full);
        }
        assert!(conditions.remove(ConditionKind::Prone));
        assert!(!conditions.remove(ConditionKind::Prone));
    }
}
