//! End-to-end command flows through the combat engine.

use combat_core::{
    AbilityDefinition, AbilityEffect, ActionResult, Actor, ApplyConditionAction, AttackAction,
    AttackProfile, CombatConfig, CombatEngine, CombatError, CombatState, Command, CommandKind,
    CompletionReason, ConditionDuration, ConditionInstance, ConditionUpdate, Controller, Creature,
    DamageDice, EndCombatAction, EndTurnAction, ExecutionOutcome, GeometryError, MoveAction,
    MoveTarget, Phase, PhaseKind, PlaceTokenAction, RemovalReason, RemoveConditionAction,
    RemoveTokenAction, Resolution, Resource, RollInitiativeAction, SavingThrowAction,
    SetTerrainAction, SideId, Size, StartAction, TargetSelection, TargetingError, Token,
    TokenFields, TokenId, TransitionError, UseAbilityAction, ValidationError, Vitality,
};
use dice_resolution::{
    Ability, AbilityScores, AdvantageState, AttackOutcome, AttackRange, ConditionKind, DamageType,
    DiceExpr,
};
use grid_math::{AreaShape, Cell, Coord, Grid};

const FIGHTER: TokenId = TokenId(1);
const GOBLIN: TokenId = TokenId(2);
const ARCHER: TokenId = TokenId(3);

fn token(id: TokenId, side: u32, position: Coord, max_hp: u32) -> Token {
    Token {
        id,
        creature_ref: format!("creature-{}", id.0),
        name: format!("Token {}", id.0),
        side: SideId(side),
        controller: Controller::GameMaster,
        position,
        size: Size::Medium,
        creature: Creature::new(AbilityScores::AVERAGE, max_hp, 15, 30),
    }
}

struct Table {
    state: CombatState,
    next_id: u64,
}

impl Table {
    /// Places every token, records its initiative roll and starts combat.
    fn start(seed: u64, roster: Vec<(Token, u32)>) -> Self {
        let mut table = Self {
            state: CombatState::new(seed, CombatConfig::default(), Grid::square(10, 10)),
            next_id: 0,
        };
        let rolls: Vec<_> = roster.iter().map(|(t, natural)| (t.id, *natural)).collect();
        for (token, _) in roster {
            table.gm(PlaceTokenAction {
                token: Box::new(token),
            });
        }
        for (token, natural) in rolls {
            table.gm(RollInitiativeAction { token, natural });
        }
        table.gm(StartAction);
        table
    }

    fn run(
        &mut self,
        actor: Actor,
        kind: impl Into<CommandKind>,
    ) -> Result<ExecutionOutcome, CombatError> {
        self.next_id += 1;
        let command = Command::new(self.next_id, actor, kind);
        CombatEngine::new(&mut self.state).execute(&command)
    }

    fn gm(&mut self, kind: impl Into<CommandKind>) -> ExecutionOutcome {
        self.run(Actor::GameMaster, kind)
            .expect("game master command accepted")
    }

    fn hit_points(&self, id: TokenId) -> u32 {
        self.state.token(id).unwrap().creature.hit_points.current
    }
}

/// Fighter (side 1) at (2,2) adjacent to a goblin (side 2) at (3,2), with an
/// archer (side 1) at (7,2). Initiative: fighter, archer, goblin.
fn skirmish() -> Table {
    Table::start(
        42,
        vec![
            (token(FIGHTER, 1, Coord::new(2, 2), 30), 20),
            (token(GOBLIN, 2, Coord::new(3, 2), 20), 2),
            (token(ARCHER, 1, Coord::new(7, 2), 20), 10),
        ],
    )
}

fn longsword() -> AttackProfile {
    AttackProfile::melee(
        "longsword",
        4,
        vec![DamageDice::new(DiceExpr::new(1, 8, 0), DamageType::Slashing)],
    )
}

fn longbow() -> AttackProfile {
    AttackProfile::ranged(
        "longbow",
        4,
        80,
        320,
        vec![DamageDice::new(DiceExpr::new(1, 8, 0), DamageType::Piercing)],
    )
}

#[test]
fn start_orders_initiative_and_opens_round_one() {
    let table = skirmish();
    let order: Vec<_> = table.state.initiative().iter().map(|e| e.token).collect();
    assert_eq!(order, vec![FIGHTER, ARCHER, GOBLIN]);
    assert_eq!(
        table.state.phase(),
        Phase::InProgress {
            round: 1,
            turn_index: 0
        }
    );
    assert_eq!(table.state.active_token(), Some(FIGHTER));
    assert_eq!(table.state.economy(FIGHTER).unwrap().movement, 6);
}

#[test]
fn end_turn_round_trip_returns_to_first_token() {
    let mut table = skirmish();
    for _ in 0..3 {
        table.gm(EndTurnAction);
    }
    assert_eq!(
        table.state.phase(),
        Phase::InProgress {
            round: 2,
            turn_index: 0
        }
    );
    assert_eq!(table.state.active_token(), Some(FIGHTER));
}

#[test]
fn only_the_active_token_may_end_its_turn() {
    let mut table = skirmish();
    let err = table.run(Actor::Token(GOBLIN), EndTurnAction).unwrap_err();
    assert_eq!(err, TransitionError::NotTurn { token: GOBLIN }.into());
}

#[test]
fn attack_hits_and_deals_damage() {
    let mut table = skirmish();
    let attack = AttackAction::new(FIGHTER, GOBLIN, longsword())
        .with_roll(14)
        .with_damage_rolls([8]);
    let outcome = table.run(Actor::Token(FIGHTER), attack).unwrap();

    let ActionResult::Attack(report) = &outcome.result else {
        panic!("expected an attack report, got {:?}", outcome.result);
    };
    assert_eq!(report.roll.total(), 18);
    assert_eq!(report.effective_ac, 15);
    assert_eq!(report.outcome, AttackOutcome::Hit);
    assert_eq!(table.hit_points(GOBLIN), 12);

    let goblin = outcome
        .delta
        .tokens
        .updated
        .iter()
        .find(|c| c.id == GOBLIN)
        .unwrap();
    assert_eq!(goblin.fields, TokenFields::HIT_POINTS);
    assert_eq!(goblin.hit_points.map(|hp| hp.current), Some(12));
    assert!(!table.state.economy(FIGHTER).unwrap().action);
}

#[test]
fn second_action_in_one_turn_is_rejected() {
    let mut table = skirmish();
    let attack = AttackAction::new(FIGHTER, GOBLIN, longsword()).with_roll(2);
    table.run(Actor::Token(FIGHTER), attack.clone()).unwrap();
    let err = table.run(Actor::Token(FIGHTER), attack).unwrap_err();
    assert_eq!(err, TransitionError::ResourceSpent(Resource::Action).into());
}

#[test]
fn tokens_cannot_act_for_each_other() {
    let mut table = skirmish();
    let attack = AttackAction::new(FIGHTER, GOBLIN, longsword());
    let err = table.run(Actor::Token(ARCHER), attack).unwrap_err();
    assert_eq!(err, ValidationError::NotController(FIGHTER).into());
}

#[test]
fn prone_target_grants_advantage_up_close_and_disadvantage_from_afar() {
    let mut table = skirmish();
    table.gm(ApplyConditionAction {
        target: GOBLIN,
        condition: ConditionInstance::new(ConditionKind::Prone, ConditionDuration::Permanent),
    });

    let melee = AttackAction::new(FIGHTER, GOBLIN, longsword()).with_roll(10);
    let outcome = table.run(Actor::Token(FIGHTER), melee).unwrap();
    let ActionResult::Attack(report) = outcome.result else {
        panic!("expected an attack report");
    };
    assert_eq!(report.advantage, AdvantageState::Advantage);

    // Off its turn the archer can still shoot with its reaction.
    let mut ranged = AttackAction::new(ARCHER, GOBLIN, longbow()).with_roll(10);
    ranged.resource = Resource::Reaction;
    let outcome = table.run(Actor::Token(ARCHER), ranged).unwrap();
    let ActionResult::Attack(report) = outcome.result else {
        panic!("expected an attack report");
    };
    assert_eq!(report.advantage, AdvantageState::Disadvantage);
}

#[test]
fn prone_applies_by_distance_not_by_weapon() {
    let mut table = Table::start(
        7,
        vec![
            (token(FIGHTER, 1, Coord::new(1, 2), 30), 20),
            (token(GOBLIN, 2, Coord::new(3, 2), 20), 2),
            (token(ARCHER, 1, Coord::new(4, 2), 20), 10),
        ],
    );
    table.gm(ApplyConditionAction {
        target: GOBLIN,
        condition: ConditionInstance::new(ConditionKind::Prone, ConditionDuration::Permanent),
    });

    let glaive = AttackProfile {
        normal_range: 10,
        long_range: 10,
        ..AttackProfile::melee(
            "glaive",
            4,
            vec![DamageDice::new(DiceExpr::new(1, 10, 0), DamageType::Slashing)],
        )
    };
    let reach = AttackAction::new(FIGHTER, GOBLIN, glaive).with_roll(10);
    let outcome = table.run(Actor::Token(FIGHTER), reach).unwrap();
    let ActionResult::Attack(report) = outcome.result else {
        panic!("expected an attack report");
    };
    assert_eq!(report.advantage, AdvantageState::Disadvantage);

    // Point blank, the prone advantage cancels the penalty for shooting next
    // to a hostile.
    let mut point_blank = AttackAction::new(ARCHER, GOBLIN, longbow()).with_roll(10);
    point_blank.resource = Resource::Reaction;
    let outcome = table.run(Actor::Token(ARCHER), point_blank).unwrap();
    let ActionResult::Attack(report) = outcome.result else {
        panic!("expected an attack report");
    };
    assert_eq!(report.advantage, AdvantageState::Normal);
}

#[test]
fn full_cover_rejects_the_attack_without_touching_state() {
    let mut table = skirmish();
    for y in 1..=3 {
        table.gm(SetTerrainAction {
            cell: Coord::new(5, y),
            terrain: Cell::WALL,
        });
    }
    let before = table.state.clone();

    let mut shot = AttackAction::new(ARCHER, GOBLIN, longbow());
    shot.resource = Resource::Reaction;
    let err = table.run(Actor::Token(ARCHER), shot).unwrap_err();
    assert_eq!(
        err,
        TargetingError::NoLineOfSight {
            from: ARCHER,
            to: GOBLIN
        }
        .into()
    );
    assert_eq!(table.state, before);
}

#[test]
fn movement_follows_paths_within_budget() {
    let mut table = skirmish();
    let outcome = table
        .run(
            Actor::Token(FIGHTER),
            MoveAction {
                token: FIGHTER,
                target: MoveTarget::Path(vec![Coord::new(2, 3), Coord::new(2, 4)]),
            },
        )
        .unwrap();
    assert_eq!(table.state.token(FIGHTER).unwrap().position, Coord::new(2, 4));
    assert_eq!(table.state.occupant(Coord::new(2, 4)), Some(FIGHTER));
    assert_eq!(table.state.occupant(Coord::new(2, 2)), None);
    assert_eq!(table.state.economy(FIGHTER).unwrap().movement, 4);
    let change = &outcome.delta.tokens.updated[0];
    assert!(change.fields.contains(TokenFields::POSITION | TokenFields::ECONOMY));

    let too_far = MoveAction {
        token: FIGHTER,
        target: MoveTarget::Path((5..=9).map(|y| Coord::new(2, y)).collect()),
    };
    let err = table.run(Actor::Token(FIGHTER), too_far).unwrap_err();
    assert_eq!(
        err,
        TransitionError::InsufficientMovement {
            required: 5,
            available: 4
        }
        .into()
    );

    let jump = MoveAction {
        token: FIGHTER,
        target: MoveTarget::Path(vec![Coord::new(2, 7)]),
    };
    let err = table.run(Actor::Token(FIGHTER), jump).unwrap_err();
    assert_eq!(err, GeometryError::InvalidPath.into());
}

#[test]
fn movement_cannot_pass_through_other_tokens() {
    let mut table = skirmish();
    let through_goblin = MoveAction {
        token: FIGHTER,
        target: MoveTarget::Path(vec![Coord::new(3, 2), Coord::new(4, 2)]),
    };
    let err = table.run(Actor::Token(FIGHTER), through_goblin).unwrap_err();
    assert_eq!(err, GeometryError::InvalidPath.into());

    let around = MoveAction {
        token: FIGHTER,
        target: MoveTarget::Destination(Coord::new(4, 2)),
    };
    table.run(Actor::Token(FIGHTER), around).unwrap();
    assert_eq!(table.state.token(FIGHTER).unwrap().position, Coord::new(4, 2));
}

#[test]
fn burst_catches_every_token_in_the_area() {
    let mut table = skirmish();
    let ability = AbilityDefinition {
        name: "thunderclap".into(),
        cost: Resource::Action,
        range: 30,
        area: Some(AreaShape::Burst { radius: 1 }),
        resolution: Resolution::Automatic,
        effects: vec![AbilityEffect::Damage {
            dice: DiceExpr::flat(3),
            damage_type: DamageType::Thunder,
            half_on_save: false,
        }],
        requires_sight: true,
    };
    let cast = UseAbilityAction::new(
        FIGHTER,
        ability,
        TargetSelection::Area {
            origin: Coord::new(3, 2),
            direction: None,
        },
    );
    let outcome = table.run(Actor::Token(FIGHTER), cast).unwrap();

    let ActionResult::Ability(report) = outcome.result else {
        panic!("expected an ability report");
    };
    let hit: Vec<_> = report.targets.iter().map(|t| t.target).collect();
    assert_eq!(hit, vec![FIGHTER, GOBLIN]);
    assert_eq!(table.hit_points(FIGHTER), 27);
    assert_eq!(table.hit_points(GOBLIN), 17);
    assert_eq!(table.hit_points(ARCHER), 20);
}

#[test]
fn killing_the_last_enemy_completes_the_combat() {
    let mut table = skirmish();
    let greataxe = AttackProfile::melee(
        "greataxe",
        4,
        vec![DamageDice::new(DiceExpr::flat(45), DamageType::Slashing)],
    );
    let attack = AttackAction::new(FIGHTER, GOBLIN, greataxe).with_roll(15);
    let outcome = table.run(Actor::Token(FIGHTER), attack).unwrap();

    let goblin = table.state.token(GOBLIN).unwrap();
    assert_eq!(goblin.creature.vitality, Vitality::Dead);
    assert_eq!(table.state.occupant(Coord::new(3, 2)), None);
    assert!(table.state.initiative().iter().all(|e| e.token != GOBLIN));
    assert_eq!(outcome.delta.initiative.removed, vec![GOBLIN]);

    let completed = Phase::Completed {
        reason: CompletionReason::SideDefeated {
            winner: Some(SideId(1)),
        },
    };
    assert_eq!(table.state.phase(), completed);
    assert_eq!(outcome.delta.phase, Some(completed));

    let err = table.run(Actor::GameMaster, EndTurnAction).unwrap_err();
    assert_eq!(err, TransitionError::CombatOver.into());
}

#[test]
fn knocked_out_token_is_skipped_in_initiative() {
    // A third side keeps the combat going once the goblin drops.
    let ogre = TokenId(4);
    let mut table = Table::start(
        7,
        vec![
            (token(FIGHTER, 1, Coord::new(2, 2), 30), 20),
            (token(GOBLIN, 2, Coord::new(3, 2), 20), 15),
            (token(ogre, 3, Coord::new(8, 8), 30), 10),
        ],
    );

    let club = AttackProfile::melee(
        "club",
        4,
        vec![DamageDice::new(DiceExpr::flat(25), DamageType::Bludgeoning)],
    );
    table
        .run(
            Actor::Token(FIGHTER),
            AttackAction::new(FIGHTER, GOBLIN, club).with_roll(15),
        )
        .unwrap();
    let goblin = table.state.token(GOBLIN).unwrap();
    assert_eq!(goblin.creature.vitality, Vitality::Unconscious);
    assert!(goblin.creature.conditions.has(ConditionKind::Prone));
    assert_eq!(table.state.occupant(Coord::new(3, 2)), Some(GOBLIN));

    table.gm(EndTurnAction);
    assert_eq!(table.state.active_token(), Some(ogre));
}

#[test]
fn rejected_commands_do_not_advance_the_nonce() {
    let mut table = skirmish();
    let nonce = table.state.nonce();
    let err = table
        .run(Actor::Token(GOBLIN), AttackAction::new(GOBLIN, FIGHTER, longsword()))
        .unwrap_err();
    assert_eq!(err, TransitionError::NotTurn { token: GOBLIN }.into());
    assert_eq!(table.state.nonce(), nonce);

    table.gm(EndTurnAction);
    assert_eq!(table.state.nonce(), nonce + 1);
}

#[test]
fn replaying_commands_reproduces_engine_rolls() {
    let play = || {
        let mut table = skirmish();
        table
            .run(
                Actor::Token(FIGHTER),
                AttackAction::new(FIGHTER, GOBLIN, longsword()),
            )
            .unwrap();
        table.gm(EndTurnAction);
        table.state
    };
    assert_eq!(play(), play());
}

#[cfg(feature = "serde")]
#[test]
fn replayed_states_share_a_state_root() {
    let mut a = skirmish();
    let mut b = skirmish();
    assert_eq!(a.state.state_root(), b.state.state_root());
    a.gm(EndTurnAction);
    assert_ne!(a.state.state_root(), b.state.state_root());
    b.gm(EndTurnAction);
    assert_eq!(a.state.state_root(), b.state.state_root());
}

fn flat_damage(amount: i32, damage_type: DamageType) -> AbilityEffect {
    AbilityEffect::Damage {
        dice: DiceExpr::flat(amount),
        damage_type,
        half_on_save: false,
    }
}

#[test]
fn saving_throw_applies_the_effects_of_each_outcome() {
    let mut table = skirmish();
    let outcome = table.gm(SavingThrowAction {
        targets: vec![GOBLIN, ARCHER],
        ability: Ability::Dexterity,
        dc: 12,
        source: None,
        on_fail: vec![flat_damage(6, DamageType::Fire)],
        on_success: vec![flat_damage(3, DamageType::Fire)],
        rolls: vec![15, 5],
    });

    let ActionResult::SavingThrow(reports) = outcome.result else {
        panic!("expected saving throw reports");
    };
    let saved: Vec<_> = reports
        .iter()
        .map(|r| r.save.as_ref().map(|s| s.outcome.is_success()))
        .collect();
    assert_eq!(saved, vec![Some(true), Some(false)]);
    assert_eq!(table.hit_points(GOBLIN), 17);
    assert_eq!(table.hit_points(ARCHER), 14);
}

#[test]
fn reapplying_a_condition_keeps_the_longer_duration() {
    let mut table = skirmish();
    let restrain = |rounds| ApplyConditionAction {
        target: GOBLIN,
        condition: ConditionInstance::new(
            ConditionKind::Restrained,
            ConditionDuration::Rounds(rounds),
        ),
    };
    let update = |outcome: ExecutionOutcome| match outcome.result {
        ActionResult::ConditionApplied { update, .. } => update,
        other => panic!("expected a condition report, got {other:?}"),
    };

    assert_eq!(update(table.gm(restrain(1))), ConditionUpdate::Added);
    assert_eq!(update(table.gm(restrain(3))), ConditionUpdate::Refreshed);
    assert_eq!(update(table.gm(restrain(2))), ConditionUpdate::Unchanged);
    let duration = table
        .state
        .token(GOBLIN)
        .and_then(|t| t.creature.conditions.get(ConditionKind::Restrained))
        .map(|c| c.duration);
    assert_eq!(duration, Some(ConditionDuration::Rounds(3)));

    let remove = RemoveConditionAction {
        target: GOBLIN,
        kind: ConditionKind::Restrained,
    };
    assert!(matches!(
        table.gm(remove).result,
        ActionResult::ConditionRemoved { removed: true, .. }
    ));
    assert!(matches!(
        table.gm(remove).result,
        ActionResult::ConditionRemoved { removed: false, .. }
    ));
}

#[test]
fn conditions_count_down_on_their_bearers_turn() {
    let mut table = skirmish();
    table.gm(ApplyConditionAction {
        target: FIGHTER,
        condition: ConditionInstance::new(ConditionKind::Blinded, ConditionDuration::Rounds(1)),
    });
    table.gm(ApplyConditionAction {
        target: FIGHTER,
        condition: ConditionInstance::new(
            ConditionKind::Paralyzed,
            ConditionDuration::UntilSave {
                ability: Ability::Constitution,
                dc: 1,
            },
        ),
    });

    let outcome = table.gm(EndTurnAction);
    let ActionResult::TurnEnded(report) = outcome.result else {
        panic!("expected a turn report");
    };
    assert_eq!(report.token, FIGHTER);
    assert_eq!(report.expired, vec![ConditionKind::Blinded]);
    assert_eq!(report.saves.len(), 1);
    assert!(report.saves[0].1.outcome.is_success());
    assert!(table.state.condition_kinds(FIGHTER).is_empty());
}

#[test]
fn spell_attacks_roll_against_each_target() {
    let mut table = skirmish();
    let ray = AbilityDefinition {
        name: "ray of frost".into(),
        cost: Resource::Action,
        range: 60,
        area: None,
        resolution: Resolution::SpellAttack {
            bonus: 5,
            range: AttackRange::Ranged,
        },
        effects: vec![flat_damage(4, DamageType::Cold)],
        requires_sight: true,
    };
    let mut cast = UseAbilityAction::new(FIGHTER, ray, TargetSelection::Tokens(vec![GOBLIN]));
    cast.rolls = vec![15, 15];
    let outcome = table.run(Actor::Token(FIGHTER), cast).unwrap();

    let ActionResult::Ability(report) = outcome.result else {
        panic!("expected an ability report");
    };
    let (roll, hit) = report.targets[0].attack.unwrap();
    assert_eq!(roll.total(), 20);
    assert_eq!(hit, AttackOutcome::Hit);
    assert_eq!(table.hit_points(GOBLIN), 16);
}

#[test]
fn fleeing_the_last_enemy_ends_the_combat() {
    let mut table = skirmish();
    let flee = RemoveTokenAction {
        token: GOBLIN,
        reason: RemovalReason::Fled,
    };
    let err = table.run(Actor::Token(ARCHER), flee).unwrap_err();
    assert_eq!(err, ValidationError::NotController(GOBLIN).into());

    table.run(Actor::Token(GOBLIN), flee).unwrap();
    assert!(table.state.token(GOBLIN).is_none());
    assert_eq!(table.state.occupant(Coord::new(3, 2)), None);
    assert_eq!(
        table.state.phase(),
        Phase::Completed {
            reason: CompletionReason::SideDefeated {
                winner: Some(SideId(1))
            }
        }
    );
}

#[test]
fn game_master_can_end_the_combat() {
    let mut table = skirmish();
    table.gm(EndCombatAction);
    assert_eq!(
        table.state.phase(),
        Phase::Completed {
            reason: CompletionReason::EndedByGameMaster
        }
    );
    let err = table.run(Actor::GameMaster, EndCombatAction).unwrap_err();
    assert_eq!(err, TransitionError::CombatOver.into());
}

#[test]
fn board_edits_respect_placement() {
    let mut table = skirmish();
    let late = PlaceTokenAction {
        token: Box::new(token(TokenId(9), 2, Coord::new(8, 8), 10)),
    };
    let err = table.run(Actor::GameMaster, late).unwrap_err();
    assert_eq!(
        err,
        TransitionError::WrongPhase {
            expected: PhaseKind::NotStarted,
            actual: PhaseKind::InProgress,
        }
        .into()
    );

    let wall_on_goblin = SetTerrainAction {
        cell: Coord::new(3, 2),
        terrain: Cell::WALL,
    };
    let err = table.run(Actor::GameMaster, wall_on_goblin).unwrap_err();
    assert_eq!(err, GeometryError::Blocked(Coord::new(3, 2)).into());
    assert!(matches!(err, CombatError::Geometry(_)));
}

#[test]
fn oversized_numbers_are_rejected_without_touching_state() {
    let mut table = skirmish();
    let before = table.state.clone();
    let max = CombatConfig::MAX_MODIFIER;

    let mut profile = longsword();
    profile.attack_bonus = i32::MAX;
    let attack = AttackAction::new(FIGHTER, GOBLIN, profile).with_roll(19);
    let err = table.run(Actor::Token(FIGHTER), attack).unwrap_err();
    assert_eq!(
        err,
        ValidationError::ModifierOutOfRange {
            value: i32::MAX,
            max
        }
        .into()
    );

    let avalanche = DiceExpr::new(u32::MAX, 6, 0);
    let mut profile = longsword();
    profile.damage = vec![DamageDice::new(avalanche, DamageType::Bludgeoning)];
    let attack = AttackAction::new(FIGHTER, GOBLIN, profile).with_roll(20);
    let err = table.run(Actor::Token(FIGHTER), attack).unwrap_err();
    assert_eq!(err, ValidationError::DiceOutOfRange(avalanche).into());

    let mending = AbilityDefinition {
        name: "mass mending".into(),
        cost: Resource::Action,
        range: 30,
        area: None,
        resolution: Resolution::Automatic,
        effects: vec![AbilityEffect::Heal { dice: avalanche }],
        requires_sight: true,
    };
    let cast = UseAbilityAction::new(FIGHTER, mending, TargetSelection::Tokens(vec![FIGHTER]));
    let err = table.run(Actor::Token(FIGHTER), cast).unwrap_err();
    assert_eq!(err, ValidationError::DiceOutOfRange(avalanche).into());

    let save = SavingThrowAction {
        targets: vec![GOBLIN],
        ability: Ability::Dexterity,
        dc: i32::MIN,
        source: None,
        on_fail: Vec::new(),
        on_success: Vec::new(),
        rolls: Vec::new(),
    };
    let err = table.run(Actor::GameMaster, save).unwrap_err();
    assert_eq!(
        err,
        ValidationError::ModifierOutOfRange {
            value: i32::MIN,
            max
        }
        .into()
    );

    assert_eq!(table.state, before);
}

#[test]
fn extreme_creature_statistics_saturate() {
    let mut fortress = token(GOBLIN, 2, Coord::new(3, 2), 20);
    fortress.creature.armor_class = i32::MAX;
    fortress.creature.initiative_bonus = i32::MAX;
    let mut table = Table::start(
        11,
        vec![
            (token(FIGHTER, 1, Coord::new(2, 2), 30), 20),
            (fortress, 20),
        ],
    );
    let totals: Vec<_> = table
        .state
        .initiative()
        .iter()
        .map(|e| (e.token, e.total))
        .collect();
    assert_eq!(totals, vec![(GOBLIN, i32::MAX), (FIGHTER, 20)]);

    table.gm(EndTurnAction);
    let attack = AttackAction::new(FIGHTER, GOBLIN, longsword()).with_roll(19);
    let outcome = table.run(Actor::Token(FIGHTER), attack).unwrap();
    let ActionResult::Attack(report) = outcome.result else {
        panic!("expected an attack report");
    };
    assert_eq!(report.effective_ac, i32::MAX);
    assert_eq!(report.outcome, AttackOutcome::Miss);
}

#[test]
fn oversized_areas_stop_at_the_board_edge() {
    let mut table = skirmish();
    let ability = AbilityDefinition {
        name: "cataclysm".into(),
        cost: Resource::Action,
        range: 30,
        area: Some(AreaShape::Burst { radius: 40_000 }),
        resolution: Resolution::Automatic,
        effects: vec![flat_damage(1, DamageType::Force)],
        requires_sight: true,
    };
    let cast = UseAbilityAction::new(
        FIGHTER,
        ability,
        TargetSelection::Area {
            origin: Coord::new(3, 2),
            direction: None,
        },
    );
    let outcome = table.run(Actor::Token(FIGHTER), cast).unwrap();

    let ActionResult::Ability(report) = outcome.result else {
        panic!("expected an ability report");
    };
    let hit: Vec<_> = report.targets.iter().map(|t| t.target).collect();
    assert_eq!(hit, vec![FIGHTER, GOBLIN, ARCHER]);
    assert_eq!(table.hit_points(ARCHER), 19);
}
