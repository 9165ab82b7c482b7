use crate::distance::DistanceBuckets;
use crate::error::MapError;
use crate::place::PlaceToPlace;

use log::{debug, info};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Rough counts of the Europe game's short destination tickets, keyed by points.
const SHORT_EUROPE_COUNTS: [(u32, usize); 9] = [
    (5, 5),
    (6, 5),
    (7, 5),
    (8, 13),
    (9, 2),
    (10, 5),
    (11, 2),
    (12, 2),
    (13, 1),
];

// Long tickets start at 20 points; 22 and 23 do not exist in the Europe game.
const LONG_EUROPE_COUNTS: [(u32, usize); 4] = [(20, 3), (21, 3), (22, 2), (23, 2)];

/// Encapsulates information about a destination ticket.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TicketCard {
    /// The two places that must be connected to fulfill the ticket.
    pub destination: PlaceToPlace,
    /// How many points are granted once this ticket is fulfilled.
    /// This is the shortest distance between both places.
    pub points: u32,
}

/// How many tickets to draw for a given point value.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PointCount {
    pub points: u32,
    pub count: usize,
}

/// The target distribution of a deck of tickets.
///
/// Point values are drawn in the order they are listed.
///
/// # JSON
/// Serialized as a list of `{"points": ..., "count": ...}` objects.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TicketCounts(Vec<PointCount>);

impl TicketCounts {
    /// Short tickets, from 5 to 13 points, in the proportions of the Europe game.
    pub fn short_europe() -> Self {
        Self::from_iter(SHORT_EUROPE_COUNTS)
    }

    /// Long tickets, from 20 to 23 points.
    pub fn long_europe() -> Self {
        Self::from_iter(LONG_EUROPE_COUNTS)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointCount> {
        self.0.iter()
    }

    /// Number of tickets in the deck.
    pub fn total(&self) -> usize {
        self.0.iter().map(|point_count| point_count.count).sum()
    }
}

impl FromIterator<(u32, usize)> for TicketCounts {
    fn from_iter<I: IntoIterator<Item = (u32, usize)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(points, count)| PointCount { points, count })
                .collect(),
        )
    }
}

/// A deck of destination tickets, in the order they were drawn.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TicketDeck(Vec<TicketCard>);

impl TicketDeck {
    #[inline]
    pub fn cards(&self) -> &[TicketCard] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The pair of places of each ticket.
    pub fn routes(&self) -> Vec<PlaceToPlace> {
        self.0.iter().map(|card| card.destination.clone()).collect()
    }

    /// The points of each ticket, parallel to [`TicketDeck::routes`].
    pub fn points(&self) -> Vec<u32> {
        self.0.iter().map(|card| card.points).collect()
    }

    /// Splits the tickets into the list of their first places,
    /// and the list of their second places.
    pub fn origins_and_destinations(&self) -> (Vec<String>, Vec<String>) {
        self.0
            .iter()
            .map(|card| card.destination.clone())
            .unzip()
    }
}

/// Draws a deck of tickets with a generator seeded from `seed`.
///
/// The same buckets, counts and seed always produce the same deck.
/// See [`select_routes_with_rng`] for how tickets are drawn.
///
/// # Example
/// ```
/// use map_builder::distance::DistanceBuckets;
/// use map_builder::tickets::{select_routes, TicketCounts};
///
/// let pair = |start: &str, end: &str| (start.to_owned(), end.to_owned());
/// let buckets = DistanceBuckets::from_iter([
///     (10, vec![pair("A", "B"), pair("B", "C")]),
///     (20, vec![pair("A", "C")]),
/// ]);
///
/// let deck = select_routes(&buckets, &TicketCounts::from_iter([(20, 1)]), 30).unwrap();
/// assert_eq!(deck.routes(), vec![pair("A", "C")]);
/// assert_eq!(deck.points(), vec![20]);
///
/// assert!(select_routes(&buckets, &TicketCounts::from_iter([(10, 3)]), 30).is_err());
/// ```
pub fn select_routes(
    buckets: &DistanceBuckets,
    counts: &TicketCounts,
    seed: u64,
) -> Result<TicketDeck, MapError> {
    select_routes_with_rng(buckets, counts, &mut ChaCha8Rng::seed_from_u64(seed))
}

/// For each point value, in order, draws as many distinct pairs of places as requested
/// from the bucket at that distance.
///
/// Every call draws from the full buckets: nothing is excluded because of previous calls.
///
/// Fails if a bucket holds fewer pairs than requested, or if a point value is listed twice.
pub fn select_routes_with_rng<R: Rng + ?Sized>(
    buckets: &DistanceBuckets,
    counts: &TicketCounts,
    rng: &mut R,
) -> Result<TicketDeck, MapError> {
    let mut seen_points = HashSet::new();
    let mut cards = Vec::with_capacity(counts.total());

    for &PointCount { points, count } in counts.iter() {
        // Drawing twice from the same bucket could repeat a pair.
        if !seen_points.insert(points) {
            return Err(MapError::OverlappingTicketCounts(points));
        }

        let pool = buckets.get(points);
        if count > pool.len() {
            return Err(MapError::InsufficientRoutes {
                points,
                requested: count,
                available: pool.len(),
            });
        }

        if count == 0 {
            continue;
        }

        cards.extend(
            sample(rng, pool.len(), count)
                .into_iter()
                .map(|index| TicketCard {
                    destination: pool[index].clone(),
                    points,
                }),
        );

        debug!(
            "Drew {} of {} tickets worth {} points.",
            count,
            pool.len(),
            points
        );
    }

    Ok(TicketDeck(cards))
}

/// Draws the short and the long decks, each from a generator seeded from `seed`.
///
/// Fails if both decks request the same point value, since they could then share a ticket.
pub fn draw_decks(
    buckets: &DistanceBuckets,
    short_counts: &TicketCounts,
    long_counts: &TicketCounts,
    seed: u64,
) -> Result<(TicketDeck, TicketDeck), MapError> {
    let short_points: HashSet<u32> = short_counts
        .iter()
        .map(|point_count| point_count.points)
        .collect();
    if let Some(overlap) = long_counts
        .iter()
        .find(|point_count| short_points.contains(&point_count.points))
    {
        return Err(MapError::OverlappingTicketCounts(overlap.points));
    }

    let short_deck = select_routes(buckets, short_counts, seed)?;
    let long_deck = select_routes(buckets, long_counts, seed)?;

    info!(
        "Drew {} short and {} long tickets.",
        short_deck.len(),
        long_deck.len()
    );

    Ok((short_deck, long_deck))
}
