use dice_resolution::RulesConfig;

/// Combat configuration: compile-time capacities plus the table rules in
/// force for one combat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    pub rules: RulesConfig,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of tokens placed in one combat.
    pub const MAX_TOKENS: usize = 64;
    /// Maximum number of simultaneous conditions on one creature.
    pub const MAX_CONDITIONS: usize = 16;
    /// Upper bound on cells a single forced movement may push or pull.
    pub const MAX_FORCED_MOVEMENT: u32 = 12;
    /// Largest attack bonus or saving throw DC a command may carry, either
    /// way.
    pub const MAX_MODIFIER: i32 = 100;
    /// Upper bound on extra movement a single effect may grant, in cells.
    pub const MAX_GRANTED_MOVEMENT: u32 = 1000;

    pub fn new(rules: RulesConfig) -> Self {
        Self { rules }
    }
}
