use std::collections::BTreeMap;

use shakmaty::{san::SanPlus, Chess, Color, Move};

/// PGN tag pairs, e.g. `White`, `BlackElo`, `Date`.
pub type Tags = BTreeMap<String, String>;

/// One position in a game's mainline, together with the move that produced it.
#[derive(Debug, Clone)]
pub struct PositionNode {
    pub ply: usize,
    pub mv: Option<Move>,
    pub san: Option<String>, // SAN with check/mate suffix
    pub position: Chess,
    pub parent: Option<usize>,
    pub next: Option<usize>,
}

impl PositionNode {
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// A fully replayed game: the tag dictionary and an arena of linked positions.
/// Node 0 is the initial position.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub tags: Tags,
    nodes: Vec<PositionNode>,
}

impl GameRecord {
    pub fn new(tags: Tags) -> Self {
        Self::from_position(tags, Chess::default())
    }

    fn from_position(tags: Tags, start: Chess) -> Self {
        Self {
            tags,
            nodes: vec![PositionNode {
                ply: 0,
                mv: None,
                san: None,
                position: start,
                parent: None,
                next: None,
            }],
        }
    }

    /// Append a move to the mainline. The move must be legal in the last position.
    pub fn push(&mut self, mv: Move) {
        let parent = self.nodes.len() - 1;
        let mut position = self.nodes[parent].position.clone();
        let san = SanPlus::from_move_and_play_unchecked(&mut position, mv).to_string();

        self.nodes[parent].next = Some(self.nodes.len());
        self.nodes.push(PositionNode {
            ply: parent + 1,
            mv: Some(mv),
            san: Some(san),
            position,
            parent: Some(parent),
            next: None,
        });
    }

    pub fn root(&self) -> &PositionNode {
        &self.nodes[0]
    }

    /// The final position reached so far.
    pub fn last(&self) -> &PositionNode {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn next(&self, node: &PositionNode) -> Option<&PositionNode> {
        node.next.and_then(|i| self.nodes.get(i))
    }

    pub fn parent(&self, node: &PositionNode) -> Option<&PositionNode> {
        node.parent.and_then(|i| self.nodes.get(i))
    }

    /// Number of half-moves played.
    pub fn plies(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Walk the mainline from the initial position to the final one.
    pub fn mainline(&self) -> Mainline<'_> {
        Mainline {
            game: self,
            current: Some(self.root()),
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Which color `player` held in this game, compared case-insensitively.
    /// White wins if the player is named on both sides.
    pub fn color_of(&self, player: &str) -> Option<Color> {
        let matches = |key: &str| {
            self.tag(key)
                .map(|name| name.eq_ignore_ascii_case(player))
                .unwrap_or(false)
        };

        if matches("White") {
            Some(Color::White)
        } else if matches("Black") {
            Some(Color::Black)
        } else {
            None
        }
    }
}

pub struct Mainline<'a> {
    game: &'a GameRecord,
    current: Option<&'a PositionNode>,
}

impl<'a> Iterator for Mainline<'a> {
    type Item = &'a PositionNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = self.game.next(node);
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{san::San, Position};

    fn play(sans: &[&str]) -> GameRecord {
        let mut game = GameRecord::new(Tags::new());
        for s in sans {
            let pos = game.last().position.clone();
            let mv = s.parse::<San>().unwrap().to_move(&pos).unwrap();
            game.push(mv);
        }
        game
    }

    #[test]
    fn test_links_follow_mainline() {
        let game = play(&["e4", "e5", "Qh5", "Nc6"]);
        assert_eq!(game.plies(), 4);

        let plies: Vec<usize> = game.mainline().map(|n| n.ply).collect();
        assert_eq!(plies, vec![0, 1, 2, 3, 4]);

        let last = game.mainline().last().unwrap();
        assert!(last.is_last());
        assert_eq!(game.parent(last).unwrap().ply, 3);
        assert_eq!(last.position.turn(), Color::White);
    }

    #[test]
    fn test_san_keeps_check_suffix() {
        let game = play(&["e4", "f5", "Qh5"]);
        let last = game.mainline().last().unwrap();
        assert_eq!(last.san.as_deref(), Some("Qh5+"));
    }

    #[test]
    fn test_color_of_is_case_insensitive() {
        let mut tags = Tags::new();
        tags.insert("White".into(), "Alice".into());
        tags.insert("Black".into(), "Bob".into());
        let game = GameRecord::new(tags);

        assert_eq!(game.color_of("alice"), Some(Color::White));
        assert_eq!(game.color_of("BOB"), Some(Color::Black));
        assert_eq!(game.color_of("carol"), None);
    }
}
