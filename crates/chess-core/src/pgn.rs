//! PGN utilities: line splitter and lightweight regex-based parser.

use std::io::{self, BufRead};
use std::sync::LazyLock;

use regex::Regex;
use shakmaty::san::SanPlus;

use crate::error::PgnError;
use crate::game_data::{GameRecord, Tags};
use crate::position::STANDARD_START_FEN;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).expect("valid tag regex"));
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid header regex"));
static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O[+#]?|O-O[+#]?")
        .expect("valid move regex")
});

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Splits a PGN stream into the raw text of individual games.
///
/// A game ends at the first line that ends with a result token. Tag lines end
/// with `"]` and therefore never terminate a game.
pub struct GameSplitter<R> {
    reader: R,
    line: String,
    done: bool,
}

impl<R: BufRead> GameSplitter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for GameSplitter<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut game = String::new();
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.done = true;
                    // Trailing text without a result token is handed on as-is;
                    // the parser decides whether it is a usable game.
                    return if game.trim().is_empty() {
                        None
                    } else {
                        Some(Ok(game))
                    };
                }
                Ok(_) => {
                    let trimmed = self.line.trim_end();
                    game.push_str(trimmed);
                    game.push('\n');

                    if RESULT_TOKENS.iter().any(|t| trimmed.ends_with(t)) {
                        return Some(Ok(game));
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Parse the text of one game into a replayed [`GameRecord`].
///
/// Games without a `Result` tag or starting from a custom position are
/// reported as exclusions (see [`PgnError::is_exclusion`]).
pub fn parse_game(pgn: &str) -> Result<GameRecord, PgnError> {
    let mut tags = Tags::new();
    for cap in TAG_RE.captures_iter(pgn) {
        tags.insert(cap[1].to_string(), cap[2].to_string());
    }

    if tags.is_empty() {
        return Err(PgnError::MissingTags);
    }

    // Filter non-standard positions
    if let Some(fen) = tags.get("FEN") {
        if fen != STANDARD_START_FEN {
            return Err(PgnError::NonStandardStart(fen.clone()));
        }
    } else if tags.get("SetUp").map(String::as_str) == Some("1") {
        return Err(PgnError::NonStandardStart("SetUp without FEN".to_string()));
    }

    if !tags.contains_key("Result") {
        return Err(PgnError::MissingResult);
    }

    let mut game = GameRecord::new(tags);

    for (i, token) in extract_moves(pgn).iter().enumerate() {
        let illegal = || PgnError::IllegalMove {
            san: token.clone(),
            ply: i + 1,
        };

        let san_plus: SanPlus = token.parse().map_err(|_| illegal())?;
        let mv = san_plus
            .san
            .to_move(&game.last().position)
            .map_err(|_| illegal())?;

        game.push(mv);
    }

    Ok(game)
}

/// Extract SAN moves from PGN text (after removing headers, comments, variations).
fn extract_moves(pgn: &str) -> Vec<String> {
    let no_headers = HEADER_RE.replace_all(pgn, "");
    let mainline = strip_annotations(&no_headers);

    MOVE_RE
        .find_iter(&mainline)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Drop `{...}` and `;` comments and `(...)` variations, which may nest.
/// Comment text is opaque, so parentheses inside a comment are ignored.
fn strip_annotations(movetext: &str) -> String {
    let mut out = String::with_capacity(movetext.len());
    let mut depth = 0usize;
    let mut chars = movetext.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                chars.by_ref().find(|&c| c == '}');
                out.push(' ');
            }
            ';' => {
                chars.by_ref().find(|&c| c == '\n');
                out.push(' ');
            }
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                out.push(' ');
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
