use rikiki_bot::BotStrategy;
use rikiki_core::game::GameState;
use rikiki_core::model::player::{PlayerId, PlayerRef};

fn bots(count: usize) -> Vec<PlayerRef> {
    (0..count)
        .map(|i| PlayerRef::new(PlayerId(i as u32), true))
        .collect()
}

/// Every bid and card a strategy proposes must pass the engine's own
/// validation, across player counts, deck variants, and whole games.
#[test]
fn bot_moves_are_always_accepted() {
    for &count in &[2usize, 3, 4, 5, 6, 7] {
        let mut state = GameState::new(bots(count), 0xC0FFEE + count as u64).unwrap();
        let mut strategy = BotStrategy::with_seed(0xFEED + count as u64);

        for _ in 0..2 {
            loop {
                state
                    .advance_bots(&mut strategy)
                    .unwrap_or_else(|err| panic!("{count} players: {err}"));
                if state.is_game_over() {
                    break;
                }
                state.start_set().unwrap();
            }
            state.start_game();
        }
    }
}

#[test]
fn bot_games_are_zero_sum() {
    let mut state = GameState::new(bots(5), 99).unwrap();
    let mut strategy = BotStrategy::with_seed(17);
    loop {
        state.advance_bots(&mut strategy).unwrap();
        if state.is_game_over() {
            break;
        }
        state.start_set().unwrap();
    }
    let total: f32 = state.players().map(|p| p.points()).sum();
    assert!(total.abs() < 1e-3, "points drifted off zero: {total}");
}

#[test]
fn seeded_bot_games_replay_identically() {
    let run = || {
        let mut state = GameState::new(bots(4), 4242).unwrap();
        let mut strategy = BotStrategy::with_seed(777);
        loop {
            state.advance_bots(&mut strategy).unwrap();
            if state.is_game_over() {
                break;
            }
            state.start_set().unwrap();
        }
        state
            .players()
            .map(|p| (p.id(), p.points(), p.tricks_won(), p.bid()))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
