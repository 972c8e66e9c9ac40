//! Pipeline configuration from environment variables and command-line flags

use std::env;
use std::path::PathBuf;

use game_stats::extractor::DEFAULT_OPENING_DEPTH;
use tracing::info;

use crate::error::StatsError;

pub const DEFAULT_PRUNE_FRACTION: f64 = 0.005;
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_OUTPUT_PATH: &str = "./pgnstats";

#[derive(Clone, Debug)]
pub struct StatsConfig {
    /// PGN file to read
    pub pgn_path: PathBuf,

    /// Output path prefix; the report lands in `<prefix>-allgames.json`
    /// or `<prefix>-filtered.json`
    pub output_path: String,

    /// Number of extraction workers
    pub workers: usize,

    /// Only count moves made by this player
    pub filter_player: Option<String>,

    /// Positions and opening lines seen in fewer than this share of games are dropped
    pub prune_fraction: f64,

    /// Plies fed into the opening tree
    pub opening_depth: usize,

    /// Capacity of the raw-game and result queues
    pub queue_capacity: usize,

    /// Pretty-print the JSON report
    pub indent: bool,
}

impl StatsConfig {
    /// Defaults for everything except the input file.
    pub fn new(pgn_path: impl Into<PathBuf>) -> Self {
        Self {
            pgn_path: pgn_path.into(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            workers: num_cpus::get(),
            filter_player: None,
            prune_fraction: DEFAULT_PRUNE_FRACTION,
            opening_depth: DEFAULT_OPENING_DEPTH,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            indent: false,
        }
    }

    /// Load configuration from the environment, then let command-line flags
    /// override it.
    pub fn load() -> Result<Self, StatsError> {
        let config = Self::from_sources(|key| env::var(key).ok(), env::args().skip(1))?;
        info!(
            pgn_path = %config.pgn_path.display(),
            workers = config.workers,
            filter_player = config.filter_player.as_deref().unwrap_or("-"),
            "Stats config loaded"
        );
        Ok(config)
    }

    pub fn from_sources<I>(
        lookup: impl Fn(&str) -> Option<String>,
        args: I,
    ) -> Result<Self, StatsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut pgn_path = lookup("PGN_PATH");
        let mut output_path = lookup("OUTPUT_PATH");
        let mut workers = lookup("WORKERS");
        let mut filter_player = lookup("FILTER_PLAYER");
        let mut prune = lookup("PRUNE_FRACTION");
        let mut opening_depth = lookup("OPENING_DEPTH");
        let queue_capacity = lookup("QUEUE_CAPACITY");
        let mut indent = lookup("INDENT_JSON").map(|v| is_truthy(&v)).unwrap_or(false);

        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let slot = match flag.as_str() {
                "-f" | "--file" => &mut pgn_path,
                "-o" | "--output" => &mut output_path,
                "-c" | "--workers" => &mut workers,
                "--player" => &mut filter_player,
                "--prune" => &mut prune,
                "--opening-depth" => &mut opening_depth,
                "-i" | "--indent" => {
                    indent = true;
                    continue;
                }
                other => return Err(StatsError::Config(format!("unknown argument {other:?}"))),
            };
            let value = args
                .next()
                .ok_or_else(|| StatsError::Config(format!("{flag} needs a value")))?;
            *slot = Some(value);
        }

        let pgn_path = pgn_path
            .ok_or_else(|| StatsError::Config("no PGN file given (PGN_PATH or --file)".into()))?;

        let mut config = Self::new(pgn_path);
        if let Some(output_path) = output_path {
            config.output_path = output_path;
        }
        if let Some(workers) = workers {
            config.workers = parse_value("workers", &workers)?;
        }
        config.filter_player = filter_player.filter(|name| !name.trim().is_empty());
        if let Some(prune) = prune {
            config.prune_fraction = parse_value("prune fraction", &prune)?;
        }
        if let Some(depth) = opening_depth {
            config.opening_depth = parse_value("opening depth", &depth)?;
        }
        if let Some(capacity) = queue_capacity {
            config.queue_capacity = parse_value("queue capacity", &capacity)?;
        }
        config.indent = indent;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StatsError> {
        if self.workers == 0 {
            return Err(StatsError::Config("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(StatsError::Config("queue capacity must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.prune_fraction) {
            return Err(StatsError::Config(format!(
                "prune fraction {} is outside [0, 1]",
                self.prune_fraction
            )));
        }
        Ok(())
    }

    /// Report file name, which depends on whether a player filter is set.
    pub fn output_file(&self) -> PathBuf {
        let suffix = if self.filter_player.is_some() {
            "filtered"
        } else {
            "allgames"
        };
        PathBuf::from(format!("{}-{suffix}.json", self.output_path))
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, StatsError> {
    raw.trim()
        .parse()
        .map_err(|_| StatsError::Config(format!("invalid {name}: {raw:?}")))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
