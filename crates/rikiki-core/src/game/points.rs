pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 7;

/// Winner points by player count, indexed by `winner_count - 1`. Losers
/// split the winners' total between them, so every row nets to zero.
const TABLE: [&[f32]; 6] = [
    &[5.0],
    &[10.0, 5.0],
    &[12.0, 6.0, 4.0],
    &[12.0, 6.0, 4.0, 3.0],
    &[15.0, 8.0, 5.0, 4.0, 3.0],
    &[15.0, 7.5, 6.0, 4.5, 3.0, 2.5],
];

pub const fn supports(player_count: usize) -> bool {
    player_count >= MIN_PLAYERS && player_count <= MAX_PLAYERS
}

/// Points awarded to each player that hit their bid. A set where nobody
/// hit is worth nothing to anybody. Asking for an unsupported player
/// count, or more winners than a set can produce, is a caller bug.
pub fn winner_points(player_count: usize, winner_count: usize) -> f32 {
    assert!(
        supports(player_count),
        "unsupported player count: {player_count}"
    );
    if winner_count == 0 {
        return 0.0;
    }
    assert!(
        winner_count < player_count,
        "impossible winner count {winner_count} for {player_count} players"
    );
    TABLE[player_count - MIN_PLAYERS][winner_count - 1]
}
