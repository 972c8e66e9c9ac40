/// Algebraic properties of merging, normalizing and pruning.
mod common;

use std::sync::Arc;

use chess_core::opening_tree::{OpeningNode, OpeningTrie};
use common::*;
use game_stats::extractor::{extract, ExtractionContext, OpeningTries};
use game_stats::statistics::GameStatistics;

fn fold(games: &[&GameStatistics]) -> GameStatistics {
    let mut acc = GameStatistics::new();
    for game in games {
        acc.merge(game);
    }
    acc
}

#[test]
fn test_merge_order_does_not_matter() {
    let a = stats(FOOLS_MATE);
    let b = stats(BOTH_CASTLE);
    let c = stats(LOYD_STALEMATE);

    let orders = [
        [&a, &b, &c],
        [&a, &c, &b],
        [&b, &a, &c],
        [&b, &c, &a],
        [&c, &a, &b],
        [&c, &b, &a],
    ];
    let reference = fold(&orders[0]);
    for order in &orders[1..] {
        assert_eq!(fold(order), reference);
    }

    // Normalized output is byte-identical too
    let mut first = fold(&orders[0]);
    let mut last = fold(&orders[5]);
    first.normalize();
    last.normalize();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&last).unwrap()
    );
}

#[test]
fn test_unique_position_totals() {
    let games: Vec<GameStatistics> = MOVETEXTS.iter().map(|m| stats(m)).collect();
    let acc = fold(&games.iter().collect::<Vec<_>>());

    assert_eq!(acc.total, MOVETEXTS.len() as u64);
    assert_eq!(acc.total_unique_positions, acc.unique_positions.len() as u64);
    assert_eq!(acc.total_positions, acc.positions.values().sum::<u64>());
    assert!(acc.total_unique_positions <= acc.total_positions);

    // 1. e4 is shared by several fixtures and collapses into one key
    assert!(acc.positions.values().any(|&n| n > 1));
}

#[test]
fn test_game_length_series_is_dense() {
    let games: Vec<GameStatistics> = MOVETEXTS.iter().map(|m| stats(m)).collect();
    let mut acc = fold(&games.iter().collect::<Vec<_>>());
    acc.normalize();

    let longest = games
        .iter()
        .filter_map(|g| g.game_lengths.max_ply())
        .max()
        .unwrap();
    let json = serde_json::to_value(&acc).unwrap();
    let lengths = json["gameLengths"].as_array().unwrap();
    assert_eq!(lengths.len(), longest + 1);
    assert_eq!(
        lengths.iter().map(|v| v.as_f64().unwrap()).sum::<f64>(),
        MOVETEXTS.len() as f64
    );
}

#[test]
fn test_end_of_game_material_is_averaged_per_length() {
    // Two games of different lengths never share an end-of-game bucket
    let mut acc = fold(&[&stats(FOOLS_MATE), &stats(FOOLS_MATE), &stats(SCHOLARS_MATE)]);
    acc.normalize();

    assert_eq!(acc.game_end_material_count.get(4), 78.0);
    // Scholar's mate: black lost a pawn
    assert_eq!(acc.game_end_material_count.get(7), 77.0);
    assert_eq!(acc.game_end_material_diff.get(7), 1.0);
    assert_eq!(acc.material_count.get(1), 78.0);
}

fn assert_pruned(node: &OpeningNode, threshold: u64) {
    for child in node.children() {
        assert!(child.count() >= threshold, "{} kept below threshold", child.label());
        assert_pruned(&child, threshold);
    }
}

fn child_counts(node: &OpeningNode) -> Vec<(String, u64)> {
    let mut out = Vec::new();
    for child in node.children() {
        out.push((child.label().to_string(), child.count()));
        for (label, count) in child_counts(&child) {
            out.push((format!("{}/{}", child.label(), label), count));
        }
    }
    out.sort();
    out
}

#[test]
fn test_trie_pruning_is_monotone() {
    let tries = OpeningTries::new(false);
    let ctx = ExtractionContext {
        openings: tries,
        ..ExtractionContext::default()
    };
    for i in 0..30 {
        let movetext = MOVETEXTS[i % MOVETEXTS.len()];
        extract(&game("W", "B", movetext), &ctx).unwrap();
    }

    let trie: &Arc<OpeningTrie> = ctx.openings.all.as_ref().unwrap();
    let before = child_counts(trie.root());
    trie.prune(5);
    let after = child_counts(trie.root());

    assert_eq!(trie.root().count(), 30);
    assert_pruned(trie.root(), 5);
    // Survivors keep their counts: nothing is re-credited
    for entry in &after {
        assert!(before.contains(entry));
    }
    assert!(after.len() < before.len());
}
