//! The reducer's accumulators: every game, plus per-color cohorts when a
//! player filter is set.

use std::sync::Arc;

use chess_core::opening_tree::OpeningTrie;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::info;

use game_stats::extractor::OpeningTries;
use game_stats::statistics::{GameStatistics, PlayerColor};

#[derive(Debug, Default)]
pub struct Cohorts {
    pub all: GameStatistics,
    pub white: Option<GameStatistics>,
    pub black: Option<GameStatistics>,
}

impl Cohorts {
    /// Accumulators sharing the opening tries the extractors write into.
    pub fn new(tries: &OpeningTries) -> Self {
        let cohort = |color: Option<PlayerColor>, trie: &Arc<OpeningTrie>| {
            GameStatistics::with_openings(color, Arc::clone(trie))
        };

        Self {
            all: tries
                .all
                .as_ref()
                .map_or_else(GameStatistics::new, |trie| cohort(None, trie)),
            white: tries
                .white
                .as_ref()
                .map(|trie| cohort(Some(PlayerColor::White), trie)),
            black: tries
                .black
                .as_ref()
                .map(|trie| cohort(Some(PlayerColor::Black), trie)),
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.white.is_some() || self.black.is_some()
    }

    /// Fold one game into `all` and, by its color tag, into `white` or `black`.
    pub fn absorb(&mut self, game: &GameStatistics) {
        self.all.merge(game);
        let cohort = match game.color {
            Some(PlayerColor::White) => self.white.as_mut(),
            Some(PlayerColor::Black) => self.black.as_mut(),
            None => None,
        };
        if let Some(cohort) = cohort {
            cohort.merge(game);
        }
    }

    /// Normalize every cohort and prune with a threshold derived from the
    /// size of `all`. Returns the threshold used.
    pub fn finalize(&mut self, prune_fraction: f64) -> u64 {
        let threshold = prune_threshold(self.all.total, prune_fraction);
        info!(
            threshold,
            games = self.all.total,
            prune_fraction,
            "Pruning rare positions and openings"
        );

        for cohort in self.iter_mut() {
            cohort.normalize();
            cohort.prune(threshold);
        }
        threshold
    }

    pub fn log_counts(&self) {
        info!(
            all = self.all.total,
            white = self.white.as_ref().map_or(0, |c| c.total),
            black = self.black.as_ref().map_or(0, |c| c.total),
            "Games per cohort"
        );
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut GameStatistics> {
        std::iter::once(&mut self.all)
            .chain(self.white.as_mut())
            .chain(self.black.as_mut())
    }
}

pub fn prune_threshold(games: u64, fraction: f64) -> u64 {
    (games as f64 * fraction).floor() as u64
}

/// An unfiltered run exports the `all` record alone; a filtered one exports
/// `{all, white, black}`.
impl Serialize for Cohorts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.is_filtered() {
            return self.all.serialize(serializer);
        }
        let empty = GameStatistics::new();
        let mut report = serializer.serialize_struct("Cohorts", 3)?;
        report.serialize_field("all", &self.all)?;
        report.serialize_field("white", self.white.as_ref().unwrap_or(&empty))?;
        report.serialize_field("black", self.black.as_ref().unwrap_or(&empty))?;
        report.end()
    }
}
