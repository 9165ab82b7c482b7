//! Sequences every stage of the generation, from the input tables to the printable assets.

use crate::distance::{DistanceBuckets, DistanceMatrix};
use crate::error::MapError;
use crate::graph::Graph;
use crate::neighbors::extract_neighbors;
use crate::place::MapDescription;
use crate::tickets::{draw_decks, TicketCounts, TicketDeck};
use crate::track::{color_board, track_segments, BoardColoring, ColorBudget, IneligiblePolicy};

use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const DEFAULT_BOARD_SEED: u64 = 10;
const DEFAULT_TICKET_SEED: u64 = 30;

/// Everything that can be tuned about a generation.
///
/// # JSON
/// Every field is optional, and falls back to the Europe distributions.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Seeds the colors, tunnels and locomotives.
    pub board_seed: u64,
    /// Seeds the short deck, and separately the long deck.
    pub ticket_seed: u64,
    pub color_budgets: ColorBudget,
    pub short_tickets: TicketCounts,
    pub long_tickets: TicketCounts,
    /// What to do with colors that have too few segments for their tunnel or locomotives.
    pub ineligible_colors: IneligiblePolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            board_seed: DEFAULT_BOARD_SEED,
            ticket_seed: DEFAULT_TICKET_SEED,
            color_budgets: ColorBudget::europe(),
            short_tickets: TicketCounts::short_europe(),
            long_tickets: TicketCounts::long_europe(),
            ineligible_colors: IneligiblePolicy::Fail,
        }
    }
}

/// All the generated assets, ready to be rendered.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneratedAssets {
    pub board: BoardColoring,
    pub short_deck: TicketDeck,
    pub long_deck: TicketDeck,
    pub buckets: DistanceBuckets,
    pub distances: DistanceMatrix,
}

/// Generates the board coloring and both decks of tickets for a custom map.
///
/// Given the same map and config, the output is always the same.
/// Nothing is returned unless every stage succeeds.
pub fn generate(
    map: &MapDescription,
    config: &GeneratorConfig,
) -> Result<GeneratedAssets, MapError> {
    let graph = Graph::from_description(map)?;

    let distances = DistanceMatrix::compute(&graph)?;
    let buckets = distances.buckets();

    let segments = track_segments(&extract_neighbors(&graph), graph.double_routes());
    let board = color_board(
        &segments,
        &config.color_budgets,
        config.ineligible_colors,
        &mut ChaCha8Rng::seed_from_u64(config.board_seed),
    )?;

    let (short_deck, long_deck) = draw_decks(
        &buckets,
        &config.short_tickets,
        &config.long_tickets,
        config.ticket_seed,
    )?;

    info!(
        "Generated {} track segments and {} tickets across {} places.",
        board.segments.len(),
        short_deck.len() + long_deck.len(),
        graph.num_places()
    );

    Ok(GeneratedAssets {
        board,
        short_deck,
        long_deck,
        buckets,
        distances,
    })
}
