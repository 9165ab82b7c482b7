//! Builds the printable assets of a custom _Ticket To Ride_ map: the colored board
//! and the destination tickets, from a table of places and a table of connections.

pub mod distance;
pub mod error;
pub mod generator;
pub mod graph;
pub mod neighbors;
pub mod place;
pub mod tickets;
pub mod track;
pub mod track_color;

pub use error::MapError;
pub use generator::{generate, GeneratedAssets, GeneratorConfig};
