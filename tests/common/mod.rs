#![allow(dead_code)]

use chess_core::game_data::GameRecord;
use chess_core::pgn::parse_game;
use game_stats::extractor::{extract, ExtractionContext};
use game_stats::statistics::GameStatistics;
use stats_worker::config::StatsConfig;

pub const FOOLS_MATE: &str = "1. f3 e5 2. g4 Qh4# 0-1";
pub const SCHOLARS_MATE: &str = "1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0";
pub const BOTH_CASTLE: &str =
    "1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O Nf6 5. d3 d6 6. Bg5 Be6 7. Nc3 Qd7 8. a3 O-O-O *";
pub const LOYD_STALEMATE: &str = "1. e3 a5 2. Qh5 Ra6 3. Qxa5 h5 4. h4 Rah6 5. Qxc7 f6 \
    6. Qxd7+ Kf7 7. Qxb7 Qd3 8. Qxb8 Qh7 9. Qxc8 Kg6 10. Qe6 1/2-1/2";
pub const PROMOTION: &str = "1. e4 d5 2. exd5 c6 3. dxc6 Nf6 4. cxb7 Nbd7 5. bxa8=Q 1-0";
pub const EN_PASSANT: &str = "1. e4 a6 2. e5 d5 3. exd6 cxd6 1/2-1/2";
pub const QUEENS_GAMBIT: &str = "1. d4 d5 2. c4 e6 3. Nc3 Nf6 4. Bg5 Be7 1/2-1/2";

pub const MOVETEXTS: [&str; 7] = [
    FOOLS_MATE,
    SCHOLARS_MATE,
    BOTH_CASTLE,
    LOYD_STALEMATE,
    PROMOTION,
    EN_PASSANT,
    QUEENS_GAMBIT,
];

const PLAYERS: [&str; 4] = ["Alice", "Bob", "Carol", "Dave"];

/// Result token at the end of a movetext.
fn result_of(movetext: &str) -> &str {
    movetext.rsplit(' ').next().unwrap_or("*")
}

/// A complete PGN game with the usual tag pairs.
pub fn pgn(white: &str, black: &str, movetext: &str) -> String {
    format!(
        "[Event \"Test\"]\n[White \"{white}\"]\n[Black \"{black}\"]\n[Result \"{}\"]\n\
         [WhiteElo \"1500\"]\n[BlackElo \"1600\"]\n[Date \"2021.06.01\"]\n\n{movetext}\n",
        result_of(movetext)
    )
}

/// `n` games cycling through the fixtures with varied players, ratings and years.
pub fn corpus(n: usize) -> String {
    let mut out = String::new();
    for i in 0..n {
        let movetext = MOVETEXTS[i % MOVETEXTS.len()];
        let white = PLAYERS[i % PLAYERS.len()];
        let black = PLAYERS[(i / 3 + 1) % PLAYERS.len()];
        out.push_str(&format!(
            "[Event \"Corpus {i}\"]\n[White \"{white}\"]\n[Black \"{black}\"]\n\
             [Result \"{}\"]\n[WhiteElo \"{}\"]\n[BlackElo \"{}\"]\n[Date \"{}.01.01\"]\n\n{movetext}\n\n",
            result_of(movetext),
            1500 + (i * 37) % 400,
            1500 + (i * 53) % 400,
            2000 + i % 20,
        ));
    }
    out
}

pub fn game(white: &str, black: &str, movetext: &str) -> GameRecord {
    parse_game(&pgn(white, black, movetext)).unwrap()
}

pub fn stats(movetext: &str) -> GameStatistics {
    extract(&game("White", "Black", movetext), &ExtractionContext::default()).unwrap()
}

/// A config suitable for in-memory runs.
pub fn config(workers: usize, player: Option<&str>) -> StatsConfig {
    let mut config = StatsConfig::new("in-memory.pgn");
    config.workers = workers;
    config.queue_capacity = 4;
    config.filter_player = player.map(str::to_string);
    config
}
