mod common;

use tvo_coordinator::coordinator::{Coordinator, MatchOutcome, Pool};
use tvo_coordinator::error::CoordinatorError;
use tvo_coordinator::protocol::MoveRequest;

use common::{Client, connect, coordinator};

struct Game {
    id: String,
    white: Client,
    black: Client,
}

/// Pair two fresh clients in the chess pool and sort them by color.
fn start_game(coordinator: &Coordinator) -> Game {
    let mut first = connect(coordinator);
    let mut second = connect(coordinator);

    assert_eq!(
        coordinator.request_match(first.id, Pool::Chess),
        Ok(MatchOutcome::Waiting)
    );
    assert_eq!(
        coordinator.request_match(second.id, Pool::Chess),
        Ok(MatchOutcome::Paired(first.id))
    );

    let first_start = first.take("game-start");
    let second_start = second.take("game-start");
    assert_eq!(first_start.len(), 1);
    assert_eq!(second_start.len(), 1);

    let id = first_start[0]["payload"]["gameId"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    assert_eq!(second_start[0]["payload"]["gameId"], id.as_str());
    assert_ne!(
        first_start[0]["payload"]["color"],
        second_start[0]["payload"]["color"]
    );

    if first_start[0]["payload"]["color"] == "white" {
        Game {
            id,
            white: first,
            black: second,
        }
    } else {
        Game {
            id,
            white: second,
            black: first,
        }
    }
}

fn mv(game_id: &str, from: &str, to: &str) -> MoveRequest {
    MoveRequest {
        game_id: game_id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        promotion: None,
        claimed_state: None,
    }
}

#[tokio::test]
async fn chess_match_creates_game_with_opposite_colors() {
    let coordinator = coordinator();
    let game = start_game(&coordinator);

    assert!(tvo_coordinator::utils::is_valid_game_id(&game.id));
    assert_eq!(coordinator.game_of(game.white.id), Some(game.id.clone()));
    assert_eq!(coordinator.game_of(game.black.id), Some(game.id.clone()));

    let snapshot = coordinator.game_snapshot(&game.id);
    assert!(snapshot.is_some_and(|s| s.white == game.white.id && s.moves.is_empty()));
    assert_eq!(coordinator.stats().game_sessions, 1);
}

#[tokio::test]
async fn moves_alternate_and_are_relayed() {
    let coordinator = coordinator();
    let mut game = start_game(&coordinator);

    assert_eq!(
        coordinator.submit_move(game.white.id, &mv(&game.id, "e2", "e4")),
        Ok(())
    );
    let relayed = game.black.take("move-relayed");
    assert_eq!(relayed.len(), 1);
    assert_eq!(relayed[0]["payload"]["from"], "e2");
    assert_eq!(relayed[0]["payload"]["to"], "e4");
    assert_eq!(
        relayed[0]["payload"]["state"],
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
    );
    assert!(game.white.drain().is_empty());

    assert_eq!(
        coordinator.submit_move(game.white.id, &mv(&game.id, "d2", "d4")),
        Err(CoordinatorError::NotYourTurn)
    );

    assert_eq!(
        coordinator.submit_move(game.black.id, &mv(&game.id, "e7", "e5")),
        Ok(())
    );
    assert_eq!(game.white.take("move-relayed").len(), 1);
}

#[tokio::test]
async fn claimed_state_is_never_trusted() {
    let coordinator = coordinator();
    let game = start_game(&coordinator);

    // A client claiming it is black's move cannot move out of turn.
    let mut request = mv(&game.id, "e7", "e5");
    request.claimed_state =
        Some("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1".to_string());
    assert_eq!(
        coordinator.submit_move(game.black.id, &request),
        Err(CoordinatorError::NotYourTurn)
    );

    // A bogus claim alongside a legal move is ignored.
    let mut request = mv(&game.id, "e2", "e4");
    request.claimed_state = Some("8/8/8/8/8/8/8/8 w - - 0 1".to_string());
    assert_eq!(coordinator.submit_move(game.white.id, &request), Ok(()));

    let snapshot = coordinator.game_snapshot(&game.id);
    assert!(snapshot.is_some_and(|s| s.state.starts_with("rnbqkbnr/pppppppp/8/8/4P3")));
}

#[tokio::test]
async fn illegal_move_leaves_state_unchanged() {
    let coordinator = coordinator();
    let mut game = start_game(&coordinator);

    let result = coordinator.submit_move(game.white.id, &mv(&game.id, "e2", "e5"));
    assert!(matches!(result, Err(CoordinatorError::IllegalMove(_))));

    let result = coordinator.submit_move(game.white.id, &mv(&game.id, "z9", "e4"));
    assert!(matches!(result, Err(CoordinatorError::IllegalMove(_))));

    assert!(game.black.drain().is_empty());
    let snapshot = coordinator.game_snapshot(&game.id);
    assert!(snapshot.is_some_and(|s| s.moves.is_empty()));
}

#[tokio::test]
async fn unknown_game_or_outsider_is_not_found() {
    let coordinator = coordinator();
    let game = start_game(&coordinator);
    let outsider = connect(&coordinator);

    assert!(matches!(
        coordinator.submit_move(game.white.id, &mv("game_0_missing00", "e2", "e4")),
        Err(CoordinatorError::NotFound(_))
    ));
    assert!(matches!(
        coordinator.submit_move(outsider.id, &mv(&game.id, "e2", "e4")),
        Err(CoordinatorError::NotFound(_))
    ));
}

#[tokio::test]
async fn fools_mate_ends_game() {
    let coordinator = coordinator();
    let mut game = start_game(&coordinator);

    for (side, from, to) in [
        ("white", "f2", "f3"),
        ("black", "e7", "e5"),
        ("white", "g2", "g4"),
        ("black", "d8", "h4"),
    ] {
        let mover = if side == "white" { game.white.id } else { game.black.id };
        assert_eq!(coordinator.submit_move(mover, &mv(&game.id, from, to)), Ok(()));
    }

    let white_end = game.white.take("game-ended");
    let black_end = game.black.take("game-ended");
    assert_eq!(white_end.len(), 1);
    assert_eq!(black_end.len(), 1);
    assert_eq!(white_end[0]["payload"]["result"], "loss");
    assert_eq!(white_end[0]["payload"]["reason"], "checkmate");
    assert_eq!(black_end[0]["payload"]["result"], "win");

    assert_eq!(coordinator.game_of(game.white.id), None);
    assert!(matches!(
        coordinator.submit_move(game.white.id, &mv(&game.id, "e2", "e4")),
        Err(CoordinatorError::NotFound(_))
    ));
}

#[tokio::test]
async fn resign_awards_opponent() {
    let coordinator = coordinator();
    let mut game = start_game(&coordinator);

    assert_eq!(coordinator.resign(game.black.id, &game.id), Ok(()));

    assert_eq!(game.white.take("game-ended")[0]["payload"]["result"], "win");
    let black_end = game.black.take("game-ended");
    assert_eq!(black_end[0]["payload"]["result"], "loss");
    assert_eq!(black_end[0]["payload"]["reason"], "resignation");
    assert_eq!(coordinator.stats().game_sessions, 0);
}

#[tokio::test]
async fn draw_offer_can_be_declined_then_accepted() {
    let coordinator = coordinator();
    let mut game = start_game(&coordinator);

    assert!(matches!(
        coordinator.accept_draw(game.black.id, &game.id),
        Err(CoordinatorError::NotReady(_))
    ));

    assert_eq!(coordinator.offer_draw(game.white.id, &game.id), Ok(()));
    assert_eq!(game.black.take("draw-offered").len(), 1);

    // The offerer cannot answer their own offer.
    assert!(matches!(
        coordinator.accept_draw(game.white.id, &game.id),
        Err(CoordinatorError::NotReady(_))
    ));

    assert_eq!(coordinator.decline_draw(game.black.id, &game.id), Ok(()));
    assert_eq!(game.white.take("draw-declined").len(), 1);

    assert_eq!(coordinator.offer_draw(game.black.id, &game.id), Ok(()));
    assert_eq!(coordinator.accept_draw(game.white.id, &game.id), Ok(()));

    for client in [&mut game.white, &mut game.black] {
        let ended = client.take("game-ended");
        assert_eq!(ended.len(), 1);
        assert_eq!(ended[0]["payload"]["result"], "draw");
        assert_eq!(ended[0]["payload"]["reason"], "agreement");
    }
}

#[tokio::test]
async fn move_clears_pending_draw_offer() {
    let coordinator = coordinator();
    let game = start_game(&coordinator);

    assert_eq!(coordinator.offer_draw(game.black.id, &game.id), Ok(()));
    assert_eq!(
        coordinator.submit_move(game.white.id, &mv(&game.id, "e2", "e4")),
        Ok(())
    );
    assert!(matches!(
        coordinator.accept_draw(game.white.id, &game.id),
        Err(CoordinatorError::NotReady(_))
    ));
}

#[tokio::test]
async fn disconnect_forfeits_game() {
    let coordinator = coordinator();
    let mut game = start_game(&coordinator);

    assert!(coordinator.deregister(game.black.id));

    let ended = game.white.take("game-ended");
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0]["payload"]["result"], "win");
    assert_eq!(ended[0]["payload"]["reason"], "opponent disconnected");
    assert_eq!(coordinator.game_of(game.white.id), None);
    assert_eq!(coordinator.stats().game_sessions, 0);

    assert!(matches!(
        coordinator.submit_move(game.white.id, &mv(&game.id, "e2", "e4")),
        Err(CoordinatorError::NotFound(_))
    ));
}

#[tokio::test]
async fn stalemate_draws_for_both_sides() {
    let coordinator = coordinator();
    let mut game = start_game(&coordinator);
    let line = [
        ("e2", "e3"), ("a7", "a5"), ("d1", "h5"), ("a8", "a6"), ("h5", "a5"),
        ("h7", "h5"), ("h2", "h4"), ("a6", "h6"), ("a5", "c7"), ("f7", "f6"),
        ("c7", "d7"), ("e8", "f7"), ("d7", "b7"), ("d8", "d3"), ("b7", "b8"),
        ("d3", "h7"), ("b8", "c8"), ("f7", "g6"), ("c8", "e6"),
    ];

    for (ply, (from, to)) in line.iter().enumerate() {
        let mover = if ply % 2 == 0 { game.white.id } else { game.black.id };
        assert_eq!(coordinator.submit_move(mover, &mv(&game.id, from, to)), Ok(()));
    }

    for client in [&mut game.white, &mut game.black] {
        let ended = client.take("game-ended");
        assert_eq!(ended.len(), 1);
        assert_eq!(ended[0]["payload"]["result"], "draw");
        assert_eq!(ended[0]["payload"]["reason"], "stalemate");
    }
    assert!(coordinator.game_snapshot(&game.id).is_none());
    assert_eq!(coordinator.stats().game_sessions, 0);
}

#[tokio::test]
async fn malformed_game_id_is_not_found() {
    let coordinator = coordinator();
    let game = start_game(&coordinator);

    assert!(matches!(
        coordinator.resign(game.white.id, "not-a-game"),
        Err(CoordinatorError::NotFound(_))
    ));
    assert_eq!(coordinator.game_of(game.white.id), Some(game.id.clone()));
}

#[tokio::test]
async fn snapshot_records_start_time() {
    let coordinator = coordinator();
    let before = chrono::Utc::now();
    let game = start_game(&coordinator);

    let snapshot = coordinator.game_snapshot(&game.id);
    assert!(snapshot.is_some_and(|s| s.started_at >= before));
}

#[tokio::test]
async fn player_in_game_is_busy() {
    let coordinator = coordinator();
    let game = start_game(&coordinator);

    assert!(matches!(
        coordinator.request_match(game.white.id, Pool::Chess),
        Err(CoordinatorError::Busy(_))
    ));
}

#[tokio::test]
async fn sweep_ends_game_of_vanished_player() {
    let coordinator = coordinator();
    let Game { id, white, mut black } = start_game(&coordinator);

    drop(white);
    assert_eq!(coordinator.sweep(), 1);

    let ended = black.take("game-ended");
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0]["payload"]["gameId"], id.as_str());
    assert_eq!(ended[0]["payload"]["result"], "win");
}
