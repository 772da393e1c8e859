pub mod enemies;

/// Messages the victory screen picks from at random.
pub const VICTORY_MESSAGES: [&str; 5] = [
    "GAME CLEAR!",
    "YOU WIN!",
    "CONGRATULATIONS!",
    "NYA-N!",
    "HAPPY END",
];
