use crate::place::PlaceToPlace;
use crate::track::Marker;
use crate::track_color::TrackColor;

use strum_macros::Display;
use thiserror::Error;

/// Why a connection was rejected while building the graph.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum InvalidConnectionReason {
    #[strum(serialize = "a place cannot be connected to itself")]
    SelfLoop,
    #[strum(serialize = "the length must be a positive number")]
    NonPositiveLength,
    #[strum(serialize = "the two places are already connected")]
    DuplicateEdge,
}

/// Every way generating a map can fail.
///
/// None of these are transient: they all point at a problem with the input tables or with
/// the requested configuration, so retrying with the same inputs fails the same way.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MapError {
    #[error("Place {0} is listed more than once.")]
    DuplicatePlace(String),

    #[error(
        "The connection between {} and {} references unknown place {place}.",
        .connection.0,
        .connection.1
    )]
    DanglingConnection {
        connection: PlaceToPlace,
        place: String,
    },

    #[error(
        "The connection between {} and {} is invalid: {reason}.",
        .connection.0,
        .connection.1
    )]
    InvalidConnection {
        connection: PlaceToPlace,
        reason: InvalidConnectionReason,
    },

    #[error("No route connects {from} and {to}.")]
    DisconnectedGraph { from: String, to: String },

    #[error(
        "Every track color is used up before the segment between {} and {} could be colored.",
        .segment.0,
        .segment.1
    )]
    BudgetExhausted { segment: PlaceToPlace },

    #[error("Color {color} needs {required} segment(s) eligible for a {marker}, but only {available} exist.")]
    NoEligibleSegment {
        color: TrackColor,
        marker: Marker,
        required: usize,
        available: usize,
    },

    #[error("{requested} ticket(s) worth {points} points were requested, but only {available} route(s) have that length.")]
    InsufficientRoutes {
        points: u32,
        requested: usize,
        available: usize,
    },

    #[error("Tickets worth {0} points are requested more than once.")]
    OverlappingTicketCounts(u32),
}
