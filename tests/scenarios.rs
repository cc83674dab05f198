use emotional_chess::domain::emfen;
use emotional_chess::domain::{EmotionEvent, Position};
use emotional_chess::{EmotionalGame, Error, GameStatus, Weights};
use shakmaty::{Chess, Role, Square};

fn play_line(start: Option<&str>, moves: &[&str]) -> EmotionalGame {
    let mut game = match start {
        Some(text) => EmotionalGame::from_emfen(text, Weights::default()).unwrap(),
        None => EmotionalGame::new(),
    };
    for text in moves {
        game.play(text)
            .unwrap_or_else(|err| panic!("{text} failed: {err}"));
    }
    game
}

fn positions_along(game: &EmotionalGame) -> Vec<Position<Chess>> {
    let tree = game.tree();
    let mut positions = vec![tree.root().position.clone()];
    positions.extend(
        game.history()
            .iter()
            .filter_map(|display| tree.get(display.node_id))
            .map(|node| node.position.clone()),
    );
    positions
}

fn assert_pair_invariants(position: &Position<Chess>) {
    let board = position.board();
    let emotions = position.emotions();
    for pair in emotions.pairs() {
        let (a, b) = (pair.a(), pair.b());
        assert_eq!(emotions.partner(a), Some(b));
        assert_eq!(emotions.partner(b), Some(a));
        assert!(a.distance(b) <= 3, "{pair} too far apart");
        assert_ne!(board.color_at(a), board.color_at(b), "{pair} same colour");
        assert_ne!(board.role_at(a), Some(Role::Queen));
        assert_ne!(board.role_at(b), Some(Role::Queen));
        assert!(
            board.role_at(a) != Some(Role::King) || board.role_at(b) != Some(Role::King),
            "kings paired"
        );
    }
    assert_eq!(emotions.check_consistency(board, position.turn()), Ok(()));
}

const LINES: [&[&str]; 3] = [
    &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O", "Nf6", "d3", "d6"],
    &["d4", "d5", "c4", "e6", "Nc3", "Nf6", "Bg5", "Be7", "e3", "O-O"],
    &["Nf3", "d5", "g3", "Nf6", "Bg2", "e6", "O-O", "Be7", "d3", "O-O"],
];

#[test]
fn test_played_lines_keep_pair_invariants() {
    for line in LINES {
        let game = play_line(None, line);
        for position in positions_along(&game) {
            assert_pair_invariants(&position);
        }
    }
}

#[test]
fn test_quiet_opening_has_no_anger_or_sadness() {
    let game = play_line(None, &["e4", "e5", "Nf3", "Nc6"]);
    let summary = game.emotion_summary();
    assert_eq!(summary.angry, 0);
    assert_eq!(summary.sad, 0);
    for position in positions_along(&game) {
        assert_pair_invariants(&position);
    }
}

#[test]
fn test_emfen_round_trips_every_position() {
    for line in LINES {
        let game = play_line(None, line);
        for position in positions_along(&game) {
            let text = emfen::encode(&position);
            assert_eq!(emfen::decode(&text).unwrap(), position, "{text}");
        }
    }
}

#[test]
fn test_bishops_fall_in_love_and_spare_each_other() {
    let mut game = play_line(Some("k7/8/8/4b3/8/2B5/8/7K w - - 0 1"), &["h1g1"]);
    let position = game.current_position();
    assert_eq!(position.love_partner(Square::C3), Some(Square::E5));
    assert_eq!(position.love_partner(Square::E5), Some(Square::C3));
    assert!(
        !position
            .legal_moves(Some(Square::E5))
            .iter()
            .any(|m| m.to() == Square::C3)
    );
    assert!(!game.try_move(Square::E5, Square::C3));
    assert!(game.history()[0].events.iter().any(|e| e.contains("c3")));
}

#[test]
fn test_partner_pin_does_not_bind() {
    let start = "k7/8/8/8/8/6b1/5N2/4K3 w - - 0 1 | L: e1-g3";
    let position = emfen::decode(start).unwrap();
    assert!(!position.legal_moves(Some(Square::F2)).is_empty());
    assert!(!position.in_check());

    let game = play_line(Some(start), &["Nd3"]);
    let text = game.to_emfen();
    assert_eq!(text, "k7/8/8/8/8/3N2b1/8/4K3 b - - 1 1 | L: e1-g3");
    assert_pair_invariants(game.current_position());
    let reloaded = EmotionalGame::from_emfen(&text, Weights::default()).unwrap();
    assert_eq!(reloaded.status(), GameStatus::Ongoing);
}

#[test]
fn test_lost_lover_grieves_for_one_own_move() {
    let start = "k7/8/8/3nb3/8/2B5/8/7K b - - 0 1 | L: c3-e5";
    let mut game = play_line(Some(start), &["Nxc3"]);
    assert!(game.current_position().is_sad(Square::E5));
    assert_eq!(game.emotion_summary().love_pairs, 0);

    game.play("Kg1").unwrap();
    let position = game.current_position();
    assert!(position.is_sad(Square::E5));
    assert!(position.legal_moves(Some(Square::E5)).is_empty());
    assert!(matches!(
        game.play("Bd4"),
        Err(Error::InvalidMove(_))
    ));

    game.play("Kb7").unwrap();
    assert!(!game.current_position().is_sad(Square::E5));
}

#[test]
fn test_capture_angers_the_victims_neighbours() {
    let start = "k2r4/8/8/8/3N4/2P5/6PP/6K1 b - - 0 1";
    let mut game = play_line(Some(start), &["Rxd4"]);
    let position = game.current_position();
    for sq in [Square::C3, Square::G2, Square::G1] {
        assert!(position.is_angry(sq), "{sq} should be angry");
    }
    assert!(!position.is_angry(Square::H2));

    // the angry king strides two squares
    game.play("g1e1").unwrap();
    assert_eq!(
        game.current_position().board().king_of(shakmaty::Color::White),
        Some(Square::E1)
    );
}

#[test]
fn test_events_are_recorded_per_ply() {
    let game = play_line(Some("k7/8/8/4b3/8/2B5/8/7K w - - 0 1"), &["h1g1"]);
    let node = game.tree().current();
    let played = node.played.as_ref().unwrap();
    assert!(played.events.iter().any(|event| matches!(
        event,
        EmotionEvent::LoveFormed(pair) if pair.contains(Square::C3)
    )));
}

#[test]
fn test_malformed_emfen_is_rejected() {
    for text in [
        "",
        "not a fen",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 | L: e2",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 | Q: e2",
    ] {
        assert!(
            matches!(emfen::decode(text), Err(Error::MalformedInput(_))),
            "{text:?}"
        );
    }
    let queen_in_love = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 | L: d1-e2";
    assert!(matches!(
        emfen::decode(queen_in_love),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_fools_mate_ends_the_game() {
    let game = play_line(None, &["f3", "e5", "g4", "Qh4#"]);
    assert_eq!(
        game.status(),
        GameStatus::Checkmate {
            winner: shakmaty::Color::Black
        }
    );
    let last = game.history().pop().unwrap();
    assert!(last.is_checkmate);
    assert_eq!(last.san, "Qh4#");
}
