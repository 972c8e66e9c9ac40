//! Ingestion -> extraction pool -> single reducer -> finalize.
//!
//! Raw game texts and per-game records travel over bounded queues, so a slow
//! stage backpressures the ones before it. Only the reducer touches the
//! cohort accumulators.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::AddAssign;
use std::sync::Arc;

use chess_core::pgn::{parse_game, GameSplitter};
use game_stats::extractor::{extract, ExtractionContext, OpeningTries};
use game_stats::statistics::GameStatistics;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cohorts::Cohorts;
use crate::config::StatsConfig;
use crate::error::StatsError;

const PROGRESS_EVERY: u64 = 10_000;

/// What the extraction workers did with the games they pulled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerTally {
    pub extracted: u64,
    pub filtered_out: u64,
    pub excluded: u64,
    pub malformed: u64,
}

impl AddAssign for WorkerTally {
    fn add_assign(&mut self, other: Self) {
        self.extracted += other.extracted;
        self.filtered_out += other.filtered_out;
        self.excluded += other.excluded;
        self.malformed += other.malformed;
    }
}

/// Result of a full run: finalized cohorts plus bookkeeping.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub cohorts: Cohorts,
    pub games_read: u64,
    pub tally: WorkerTally,
    pub prune_threshold: u64,
}

/// Run the pipeline over the PGN file named in the config.
pub async fn run_file(config: &StatsConfig) -> Result<PipelineOutcome, StatsError> {
    let file = File::open(&config.pgn_path).map_err(|e| {
        StatsError::Config(format!(
            "cannot open {}: {e}",
            config.pgn_path.display()
        ))
    })?;
    run(BufReader::new(file), config).await
}

/// Run the pipeline over any line-oriented PGN source.
pub async fn run<R>(input: R, config: &StatsConfig) -> Result<PipelineOutcome, StatsError>
where
    R: BufRead + Send + 'static,
{
    config.validate()?;

    let tries = OpeningTries::new(config.filter_player.is_some());
    let cohorts = Cohorts::new(&tries);
    let ctx = Arc::new(ExtractionContext {
        filter_player: config.filter_player.clone(),
        openings: tries,
        opening_depth: config.opening_depth,
    });

    let (raw_tx, raw_rx) = mpsc::channel::<String>(config.queue_capacity);
    let (results_tx, results_rx) = mpsc::channel::<GameStatistics>(config.queue_capacity);

    let ingestion = tokio::task::spawn_blocking(move || ingest(input, raw_tx));

    let raw_rx = Arc::new(Mutex::new(raw_rx));
    let mut workers = JoinSet::new();
    for worker_id in 0..config.workers {
        let raw_rx = Arc::clone(&raw_rx);
        let results_tx = results_tx.clone();
        let ctx = Arc::clone(&ctx);
        workers.spawn_blocking(move || extraction_worker(worker_id, raw_rx, results_tx, ctx));
    }
    // The results queue closes once every worker has dropped its sender
    drop(results_tx);
    info!(workers = config.workers, "Extraction workers started");

    let reducer = tokio::spawn(reduce(results_rx, cohorts));

    let games_read = ingestion.await??;
    info!(games = games_read, "Ingestion complete");

    let mut tally = WorkerTally::default();
    while let Some(joined) = workers.join_next().await {
        tally += joined?;
    }
    info!(
        extracted = tally.extracted,
        filtered_out = tally.filtered_out,
        excluded = tally.excluded,
        malformed = tally.malformed,
        "Extraction complete"
    );

    let mut cohorts = reducer.await?;
    cohorts.log_counts();
    let prune_threshold = cohorts.finalize(config.prune_fraction);

    Ok(PipelineOutcome {
        cohorts,
        games_read,
        tally,
        prune_threshold,
    })
}

/// Split the input into raw game texts. Returns the number of games sent.
fn ingest<R: BufRead>(input: R, raw_tx: mpsc::Sender<String>) -> Result<u64, StatsError> {
    let mut games = 0u64;
    for text in GameSplitter::new(input) {
        let text = text?;
        if raw_tx.blocking_send(text).is_err() {
            warn!(games, "All extraction workers gone, stopping ingestion");
            break;
        }
        games += 1;
        if games % PROGRESS_EVERY == 0 {
            debug!(games, "Ingestion progress");
        }
    }
    debug!(games, "Input exhausted");
    Ok(games)
}

fn extraction_worker(
    worker_id: usize,
    raw_rx: Arc<Mutex<mpsc::Receiver<String>>>,
    results_tx: mpsc::Sender<GameStatistics>,
    ctx: Arc<ExtractionContext>,
) -> WorkerTally {
    let mut tally = WorkerTally::default();

    loop {
        // Guard is released before the game is processed
        let next = raw_rx.blocking_lock().blocking_recv();
        let Some(text) = next else {
            break;
        };

        let game = match parse_game(&text) {
            Ok(game) => game,
            Err(e) if e.is_exclusion() => {
                debug!(worker_id, reason = %e, "Excluded game skipped");
                tally.excluded += 1;
                continue;
            }
            Err(e) => {
                warn!(worker_id, error = %e, "Malformed game skipped");
                tally.malformed += 1;
                continue;
            }
        };

        match extract(&game, &ctx) {
            Some(stats) => {
                tally.extracted += 1;
                if results_tx.blocking_send(stats).is_err() {
                    warn!(worker_id, "Reducer gone, stopping worker");
                    break;
                }
            }
            None => tally.filtered_out += 1,
        }
    }

    debug!(worker_id, extracted = tally.extracted, "Extraction worker done");
    tally
}

async fn reduce(mut results_rx: mpsc::Receiver<GameStatistics>, mut cohorts: Cohorts) -> Cohorts {
    while let Some(stats) = results_rx.recv().await {
        cohorts.absorb(&stats);
    }
    info!(games = cohorts.all.total, "Reduction complete");
    cohorts
}
