//! Session manager behaviour across workers, events and snapshots.

use std::sync::Arc;

use combat_core::{
    Actor, CombatConfig, CombatError, CombatSetup, Command, CommandKind, Controller, Creature,
    EndTurnAction, MoveAction, MoveTarget, Phase, RollInitiativeAction, SetTerrainAction, SideId,
    Size, StartAction, Token, TokenId, TransitionError, ValidationError,
};
use combat_session::{
    CombatId, Event, SessionConfig, SessionError, SessionManager, SnapshotRepository, Topic,
};
use dice_resolution::AbilityScores;
use grid_math::{Cell, Coord, Grid};
use tokio::sync::broadcast::error::TryRecvError;

const FIGHTER: TokenId = TokenId(1);
const GOBLIN: TokenId = TokenId(2);

fn token(id: TokenId, side: u32, position: Coord) -> Token {
    Token {
        id,
        creature_ref: format!("creature-{}", id.0),
        name: format!("Token {}", id.0),
        side: SideId(side),
        controller: Controller::GameMaster,
        position,
        size: Size::Medium,
        creature: Creature::new(AbilityScores::AVERAGE, 20, 15, 30),
    }
}

/// Fighter at (2,2) facing a goblin at (6,2) on an open 10x10 board.
fn duel(seed: u64) -> CombatSetup {
    CombatSetup::new(seed, CombatConfig::default(), Grid::square(10, 10))
        .with_token(token(FIGHTER, 1, Coord::new(2, 2)))
        .with_token(token(GOBLIN, 2, Coord::new(6, 2)))
}

fn gm(id: u64, kind: impl Into<CommandKind>) -> Command {
    Command::new(id, Actor::GameMaster, kind)
}

/// Opens `duel` under `combat_id` and starts it with the fighter first.
async fn open_started(manager: &SessionManager, combat_id: &CombatId, seed: u64) {
    manager.open(combat_id.clone(), duel(seed)).await.unwrap();
    let commands = [
        gm(1, RollInitiativeAction { token: FIGHTER, natural: 18 }),
        gm(2, RollInitiativeAction { token: GOBLIN, natural: 3 }),
        gm(3, StartAction),
    ];
    for command in commands {
        manager.submit(combat_id, command).await.unwrap();
    }
}

fn step_south(id: u64) -> Command {
    Command::new(
        id,
        Actor::Token(FIGHTER),
        MoveAction {
            token: FIGHTER,
            target: MoveTarget::Path(vec![Coord::new(2, 3), Coord::new(2, 4)]),
        },
    )
}

#[tokio::test]
async fn resubmitting_a_command_returns_the_recorded_delta() {
    let manager = SessionManager::new(SessionConfig::default()).unwrap();
    let id = CombatId::from("crypt");
    open_started(&manager, &id, 7).await;
    let mut deltas = manager.subscribe(Topic::Combat);

    let first = manager.submit(&id, step_south(10)).await.unwrap();
    let again = manager.submit(&id, step_south(10)).await.unwrap();

    assert_eq!(first, again);
    let state = manager.state(&id).await.unwrap();
    assert_eq!(state.nonce(), 4);
    assert_eq!(state.token(FIGHTER).unwrap().position, Coord::new(2, 4));

    match deltas.try_recv() {
        Ok(Event::Delta {
            combat_id,
            round,
            turn_index,
            delta,
        }) => {
            assert_eq!(combat_id, id);
            assert_eq!(round, Some(1));
            assert_eq!(turn_index, Some(0));
            assert_eq!(*delta, first);
        }
        other => panic!("expected one delta event, got {other:?}"),
    }
    assert!(matches!(deltas.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn rejected_commands_publish_nothing() {
    let manager = SessionManager::new(SessionConfig::default()).unwrap();
    let id = CombatId::from("crypt");
    open_started(&manager, &id, 7).await;
    let before = manager.state(&id).await.unwrap();
    let mut deltas = manager.subscribe(Topic::Combat);

    let err = manager
        .submit(&id, Command::new(20, Actor::Token(GOBLIN), EndTurnAction))
        .await
        .unwrap_err();

    assert_eq!(
        err.rejection(),
        Some(&CombatError::from(TransitionError::NotTurn { token: GOBLIN }))
    );
    assert_eq!(manager.state(&id).await.unwrap(), before);
    assert!(matches!(deltas.try_recv(), Err(TryRecvError::Empty)));

    // The id was never applied, so a corrected retry runs.
    let delta = manager
        .submit(&id, Command::new(20, Actor::Token(FIGHTER), EndTurnAction))
        .await
        .unwrap();
    assert_eq!(
        delta.phase,
        Some(Phase::InProgress {
            round: 1,
            turn_index: 1
        })
    );
}

#[tokio::test]
async fn unknown_and_duplicate_combats_are_reported() {
    let manager = SessionManager::new(SessionConfig::default()).unwrap();
    let id = CombatId::from("crypt");

    let err = manager.submit(&id, gm(1, StartAction)).await.unwrap_err();
    assert!(matches!(err, SessionError::UnknownCombat(ref missing) if *missing == id));

    manager.open(id.clone(), duel(1)).await.unwrap();
    let err = manager.open(id.clone(), duel(1)).await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyOpen(_)));

    let blocked = duel(1).with_token(token(TokenId(3), 2, Coord::new(2, 2)));
    let err = manager.open("other", blocked).await.unwrap_err();
    assert!(matches!(err, SessionError::Setup(_)));
}

#[tokio::test]
async fn combats_progress_independently_in_parallel() {
    let manager = Arc::new(SessionManager::new(SessionConfig::default()).unwrap());
    let ids: Vec<CombatId> = (0..4).map(|i| CombatId::new(format!("table-{i}"))).collect();
    for (seed, id) in ids.iter().enumerate() {
        open_started(&manager, id, seed as u64).await;
    }

    let mut tasks = Vec::new();
    for (turns, id) in ids.iter().cloned().enumerate() {
        let manager = Arc::clone(&manager);
        tasks.push(tokio::spawn(async move {
            for n in 0..turns as u64 {
                manager
                    .submit(&id, gm(100 + n, EndTurnAction))
                    .await
                    .unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    for (turns, id) in ids.iter().enumerate() {
        let state = manager.state(id).await.unwrap();
        assert_eq!(state.nonce(), 3 + turns as u64);
        let (round, turn_index) = state.phase().turn().unwrap();
        assert_eq!(round, 1 + turns as u32 / 2);
        assert_eq!(turn_index, turns as u32 % 2);
    }
}

#[tokio::test]
async fn path_preview_follows_terrain_changes() {
    let manager = SessionManager::new(SessionConfig::default()).unwrap();
    let id = CombatId::from("crypt");
    open_started(&manager, &id, 7).await;

    let path = manager
        .find_path(&id, FIGHTER, Coord::new(2, 5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(path.cost, 3);
    assert!(path.cells.contains(&Coord::new(2, 3)));

    manager
        .submit(
            &id,
            gm(
                30,
                SetTerrainAction {
                    cell: Coord::new(2, 3),
                    terrain: Cell::WALL,
                },
            ),
        )
        .await
        .unwrap();
    let detour = manager
        .find_path(&id, FIGHTER, Coord::new(2, 5))
        .await
        .unwrap()
        .unwrap();
    assert!(!detour.cells.contains(&Coord::new(2, 3)));
    assert_eq!(detour.destination(), Some(Coord::new(2, 5)));

    // Beyond the six cells of movement left this turn.
    let far = manager.find_path(&id, FIGHTER, Coord::new(9, 9)).await.unwrap();
    assert!(far.is_none());

    let err = manager
        .find_path(&id, TokenId(9), Coord::new(0, 0))
        .await
        .unwrap_err();
    assert_eq!(
        err.rejection(),
        Some(&CombatError::from(ValidationError::UnknownToken(TokenId(9))))
    );
}

#[tokio::test]
async fn lifecycle_events_bracket_a_combat() {
    let manager = SessionManager::new(SessionConfig::default()).unwrap();
    let mut lifecycle = manager.subscribe(Topic::Lifecycle);
    let id = CombatId::from("crypt");

    manager.open(id.clone(), duel(3)).await.unwrap();
    let state = manager.close(&id).await.unwrap();
    assert_eq!(state.nonce(), 0);

    assert!(matches!(
        lifecycle.recv().await,
        Ok(Event::Opened { nonce: 0, .. })
    ));
    assert!(matches!(lifecycle.recv().await, Ok(Event::Closed { .. })));
    assert!(manager.combat_ids().await.is_empty());
}

#[tokio::test]
async fn file_snapshots_restore_a_closed_combat() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig::default().with_snapshot_dir(dir.path());
    let id = CombatId::from("crypt");

    let manager = SessionManager::new(config.clone()).unwrap();
    open_started(&manager, &id, 11).await;
    manager.submit(&id, step_south(10)).await.unwrap();
    let closed = manager.close(&id).await.unwrap();
    manager.shutdown().await.unwrap();

    let manager = SessionManager::new(config).unwrap();
    assert_eq!(
        manager.repository().list_nonces(&id).unwrap(),
        vec![0, 1, 2, 3, 4]
    );
    let nonce = manager.restore(id.clone()).await.unwrap();
    assert_eq!(nonce, 4);
    assert_eq!(manager.state(&id).await.unwrap(), closed);
    assert_eq!(closed.state_root(), manager.state(&id).await.unwrap().state_root());

    let err = manager.restore(id.clone()).await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyOpen(_)));
    let err = manager.restore("missing").await.unwrap_err();
    assert!(matches!(err, SessionError::NoSnapshot(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_to_one_combat_apply_serially() {
    let manager = Arc::new(SessionManager::new(SessionConfig::default()).unwrap());
    let id = CombatId::from("crypt");
    open_started(&manager, &id, 5).await;
    let mut deltas = manager.subscribe(Topic::Combat);

    // Eight distinct ids plus two racing copies of id 200.
    let ids: Vec<u64> = (100..108).chain([200, 200]).collect();
    let mut tasks = Vec::new();
    for command_id in ids {
        let manager = Arc::clone(&manager);
        let id = id.clone();
        tasks.push(tokio::spawn(async move {
            let delta = manager.submit(&id, gm(command_id, EndTurnAction)).await.unwrap();
            (command_id, delta)
        }));
    }
    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    let duplicates: Vec<_> = results.iter().filter(|(c, _)| *c == 200).map(|(_, d)| d).collect();
    assert_eq!(duplicates.len(), 2);
    assert_eq!(duplicates[0], duplicates[1]);

    let mut nonces: Vec<u64> = results
        .iter()
        .filter(|(c, _)| *c != 200)
        .map(|(_, d)| d.nonce)
        .chain([duplicates[0].nonce])
        .collect();
    nonces.sort_unstable();
    assert_eq!(nonces, (4..=12).collect::<Vec<_>>());

    let state = manager.state(&id).await.unwrap();
    assert_eq!(state.nonce(), 12);
    assert_eq!(state.phase().turn(), Some((5, 1)));

    let mut published = 0;
    while let Ok(event) = deltas.try_recv() {
        assert!(matches!(event, Event::Delta { .. }));
        published += 1;
    }
    assert_eq!(published, 9);
}

#[tokio::test]
async fn idempotency_window_forgets_the_oldest_ids() {
    let config = SessionConfig {
        idempotency_window: 2,
        ..SessionConfig::default()
    };
    let manager = SessionManager::new(config).unwrap();
    let id = CombatId::from("crypt");
    open_started(&manager, &id, 9).await;

    for command_id in [10, 11, 12] {
        manager.submit(&id, gm(command_id, EndTurnAction)).await.unwrap();
    }
    assert_eq!(manager.state(&id).await.unwrap().nonce(), 6);

    let recent = manager.submit(&id, gm(12, EndTurnAction)).await.unwrap();
    assert_eq!(recent.nonce, 6);
    assert_eq!(manager.state(&id).await.unwrap().nonce(), 6);

    let forgotten = manager.submit(&id, gm(10, EndTurnAction)).await.unwrap();
    assert_eq!(forgotten.nonce, 7);
}
