use crate::error::MapError;
use crate::graph::DoubleRoute;
use crate::neighbors::Adjacency;
use crate::place::PlaceToPlace;
use crate::track_color::TrackColor;

use log::{debug, info, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::Display;

// Budgets are based on the Europe board: 22 cars per color, and 100 grey ones.
const COLORED_TRACK_BUDGET: u32 = 22;
const NEUTRAL_TRACK_BUDGET: u32 = 100;

const TUNNELS_PER_COLOR: usize = 1;
const LOCOMOTIVES_PER_COLOR: usize = 2;

// Only segments of these lengths can become tunnels.
const TUNNEL_LENGTHS: RangeInclusive<u32> = 2..=3;

/// One physical strip of track to paint on the board.
///
/// Either a direct connection between two places, or the second leg of a double route.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TrackSegment {
    pub places: PlaceToPlace,
    /// Number of cars on the strip.
    pub length: u32,
    /// `None` until the colors are allocated.
    pub color: Option<TrackColor>,
    pub tunnel: bool,
    pub locomotive: bool,
}

impl TrackSegment {
    /// Returns an unpainted segment, without any marker.
    pub fn new(places: PlaceToPlace, length: u32) -> Self {
        Self {
            places,
            length,
            color: None,
            tunnel: false,
            locomotive: false,
        }
    }
}

/// Lists the segments to paint: one per pair of adjacent places, followed by one per double route.
pub fn track_segments(
    neighbors: &[Adjacency],
    double_routes: &[DoubleRoute],
) -> Vec<TrackSegment> {
    neighbors
        .iter()
        .map(|adjacency| TrackSegment::new(adjacency.places.clone(), adjacency.length))
        .chain(double_routes.iter().map(|double_route| {
            TrackSegment::new(
                double_route.places.clone(),
                double_route.length.round_ties_even() as u32,
            )
        }))
        .collect()
}

/// How many cars of each color are left to paint tracks with.
///
/// Only colors listed in the budget are ever drawn, in the declaration order of [`TrackColor`].
///
/// # JSON
/// Serialized as an object mapping colors to their number of cars.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColorBudget(BTreeMap<TrackColor, u32>);

impl ColorBudget {
    /// The color distribution of the Europe board.
    pub fn europe() -> Self {
        TrackColor::iter()
            .map(|color| {
                let budget = if color.is_neutral() {
                    NEUTRAL_TRACK_BUDGET
                } else {
                    COLORED_TRACK_BUDGET
                };
                (color, budget)
            })
            .collect()
    }

    /// Cars left for `color`. Zero for colors outside of the budget.
    #[inline]
    pub fn remaining(&self, color: TrackColor) -> u32 {
        self.0.get(&color).copied().unwrap_or(0)
    }

    /// Colors in the budget, including the exhausted ones.
    pub fn colors(&self) -> impl Iterator<Item = TrackColor> + '_ {
        self.0.keys().copied()
    }

    /// Sum of the cars left across all colors.
    pub fn total(&self) -> u64 {
        self.0.values().copied().map(u64::from).sum()
    }

    /// Takes `length` cars of `color`, and never goes below zero.
    /// Returns how many cars were missing, if any.
    fn spend(&mut self, color: TrackColor, length: u32) -> u32 {
        let remaining = self.0.entry(color).or_insert(0);
        let shortfall = length.saturating_sub(*remaining);
        *remaining = remaining.saturating_sub(length);
        shortfall
    }

    /// Chances of drawing each color, in the order of [`ColorBudget::colors`].
    /// Widened so that the sum of every color's cars cannot overflow.
    fn weights(&self) -> SmallVec<[u64; TrackColor::COUNT]> {
        self.0.values().copied().map(u64::from).collect()
    }
}

impl Default for ColorBudget {
    fn default() -> Self {
        Self::europe()
    }
}

impl FromIterator<(TrackColor, u32)> for ColorBudget {
    fn from_iter<I: IntoIterator<Item = (TrackColor, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of [`allocate_colors`].
#[derive(Clone, Debug, PartialEq)]
pub struct ColorAllocation {
    /// Every input segment, painted, in the same order.
    pub segments: Vec<TrackSegment>,
    /// What is left of the budget. Never negative.
    pub remaining: ColorBudget,
    /// For colors that were drawn for a segment longer than what they had left,
    /// the total number of cars that were missing.
    pub overdrawn: BTreeMap<TrackColor, u32>,
}

/// Paints every segment, in order, with a color drawn at random.
///
/// The chance of drawing a color is proportional to what is left of its budget, and drawing it
/// spends as many cars as the segment is long. A color can be drawn for a segment longer than
/// its budget: the budget then bottoms out at zero, and the color is never drawn again.
///
/// Fails if the whole budget is spent while segments are still unpainted.
///
/// # Example
/// ```
/// use map_builder::track::{allocate_colors, ColorBudget, TrackSegment};
/// use map_builder::track_color::TrackColor;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let segments = vec![
///     TrackSegment::new((String::from("A"), String::from("B")), 2),
///     TrackSegment::new((String::from("B"), String::from("C")), 2),
/// ];
/// let budget = ColorBudget::from_iter([(TrackColor::Red, 3)]);
///
/// let mut rng = ChaCha8Rng::seed_from_u64(0);
/// let allocation = allocate_colors(&segments, &budget, &mut rng).unwrap();
/// assert_eq!(allocation.remaining.remaining(TrackColor::Red), 0);
/// assert_eq!(allocation.overdrawn.get(&TrackColor::Red), Some(&1));
/// ```
pub fn allocate_colors<R: Rng + ?Sized>(
    segments: &[TrackSegment],
    budget: &ColorBudget,
    rng: &mut R,
) -> Result<ColorAllocation, MapError> {
    let colors: SmallVec<[TrackColor; TrackColor::COUNT]> = budget.colors().collect();
    let mut remaining = budget.clone();
    let mut overdrawn = BTreeMap::new();
    let mut painted_segments = Vec::with_capacity(segments.len());

    for segment in segments {
        // Also fails on an empty budget.
        let distribution = WeightedIndex::new(remaining.weights()).map_err(|_| {
            MapError::BudgetExhausted {
                segment: segment.places.clone(),
            }
        })?;

        let color = colors[distribution.sample(rng)];
        let shortfall = remaining.spend(color, segment.length);
        if shortfall > 0 {
            *overdrawn.entry(color).or_insert(0) += shortfall;
        }

        debug!(
            "Painted {}-{} ({}) in {}, {} left.",
            segment.places.0,
            segment.places.1,
            segment.length,
            color,
            remaining.remaining(color)
        );

        painted_segments.push(TrackSegment {
            color: Some(color),
            ..segment.clone()
        });
    }

    Ok(ColorAllocation {
        segments: painted_segments,
        remaining,
        overdrawn,
    })
}

/// The markers placed on top of painted track segments.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Marker {
    Tunnel,
    Locomotive,
}

impl Marker {
    /// How many segments of each color get this marker.
    #[inline]
    fn per_color(&self) -> usize {
        match self {
            Marker::Tunnel => TUNNELS_PER_COLOR,
            Marker::Locomotive => LOCOMOTIVES_PER_COLOR,
        }
    }

    fn is_eligible(&self, segment: &TrackSegment) -> bool {
        match self {
            Marker::Tunnel => !segment.tunnel && TUNNEL_LENGTHS.contains(&segment.length),
            Marker::Locomotive => !segment.tunnel && !segment.locomotive,
        }
    }

    fn mark(&self, segment: &mut TrackSegment) {
        match self {
            Marker::Tunnel => segment.tunnel = true,
            Marker::Locomotive => segment.locomotive = true,
        }
    }
}

/// What to do with a color that has too few segments eligible for a marker.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IneligiblePolicy {
    /// Abort with [`MapError::NoEligibleSegment`].
    #[default]
    Fail,
    /// Leave the color without that marker, and report it in [`MarkerPlacement::skipped`].
    Skip,
}

/// A color that was left without a marker under [`IneligiblePolicy::Skip`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SkippedMarker {
    pub color: TrackColor,
    pub marker: Marker,
}

/// Result of [`assign_tunnels`] and [`assign_locomotives`].
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerPlacement {
    /// Every input segment, in the same order, with the new markers.
    pub segments: Vec<TrackSegment>,
    pub skipped: Vec<SkippedMarker>,
}

fn place_markers<R: Rng + ?Sized>(
    segments: &[TrackSegment],
    colors: &[TrackColor],
    marker: Marker,
    policy: IneligiblePolicy,
    rng: &mut R,
) -> Result<MarkerPlacement, MapError> {
    let mut segments = segments.to_vec();
    let mut skipped = Vec::new();
    let required = marker.per_color();

    for &color in colors {
        let candidates: Vec<usize> = segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| segment.color == Some(color) && marker.is_eligible(segment))
            .map(|(index, _)| index)
            .collect();

        if candidates.len() < required {
            let error = MapError::NoEligibleSegment {
                color,
                marker,
                required,
                available: candidates.len(),
            };

            match policy {
                IneligiblePolicy::Fail => return Err(error),
                IneligiblePolicy::Skip => {
                    warn!("{} Skipping it.", error);
                    skipped.push(SkippedMarker { color, marker });
                    continue;
                }
            }
        }

        let chosen: SmallVec<[usize; LOCOMOTIVES_PER_COLOR]> =
            candidates.choose_multiple(rng, required).copied().collect();
        for index in chosen {
            marker.mark(&mut segments[index]);
        }
    }

    Ok(MarkerPlacement { segments, skipped })
}

/// For each color, turns one of its segments of length 2 or 3 into a tunnel, picked at random.
///
/// Colors are visited in the given order. A color without such a segment is handled according
/// to `policy`.
pub fn assign_tunnels<R: Rng + ?Sized>(
    segments: &[TrackSegment],
    colors: &[TrackColor],
    policy: IneligiblePolicy,
    rng: &mut R,
) -> Result<MarkerPlacement, MapError> {
    place_markers(segments, colors, Marker::Tunnel, policy, rng)
}

/// For each color, puts a locomotive on two distinct segments that are not tunnels,
/// picked at random.
///
/// Colors are visited in the given order. A color with fewer than two such segments is
/// handled according to `policy`.
pub fn assign_locomotives<R: Rng + ?Sized>(
    segments: &[TrackSegment],
    colors: &[TrackColor],
    policy: IneligiblePolicy,
    rng: &mut R,
) -> Result<MarkerPlacement, MapError> {
    place_markers(segments, colors, Marker::Locomotive, policy, rng)
}

/// The complete board-coloring table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardColoring {
    /// One row per segment, painted and marked.
    pub segments: Vec<TrackSegment>,
    /// Number of segments painted in each color.
    pub color_counts: BTreeMap<TrackColor, usize>,
    pub remaining: ColorBudget,
    pub overdrawn: BTreeMap<TrackColor, u32>,
    /// Tunnels and locomotives left out under [`IneligiblePolicy::Skip`].
    pub skipped: Vec<SkippedMarker>,
}

/// Paints every segment, then places tunnels, then locomotives, all from the same `rng`.
///
/// Markers are placed for every color of `budget`, the neutral one included.
pub fn color_board<R: Rng + ?Sized>(
    segments: &[TrackSegment],
    budget: &ColorBudget,
    policy: IneligiblePolicy,
    rng: &mut R,
) -> Result<BoardColoring, MapError> {
    let colors: SmallVec<[TrackColor; TrackColor::COUNT]> = budget.colors().collect();

    let allocation = allocate_colors(segments, budget, rng)?;
    let tunnels = assign_tunnels(&allocation.segments, &colors, policy, rng)?;
    let locomotives = assign_locomotives(&tunnels.segments, &colors, policy, rng)?;

    let mut color_counts = BTreeMap::new();
    for color in locomotives.segments.iter().filter_map(|segment| segment.color) {
        *color_counts.entry(color).or_insert(0) += 1;
    }

    info!(
        "Painted {} track segments, {} cars left unused.",
        locomotives.segments.len(),
        allocation.remaining.total()
    );

    Ok(BoardColoring {
        segments: locomotives.segments,
        color_counts,
        remaining: allocation.remaining,
        overdrawn: allocation.overdrawn,
        skipped: tunnels
            .skipped
            .into_iter()
            .chain(locomotives.skipped)
            .collect(),
    })
}
