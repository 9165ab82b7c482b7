use crate::error::{InvalidConnectionReason, MapError};
use crate::place::{ConnectionRecord, LocationRecord, MapDescription, Place, PlaceToPlace};

use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

/// Connection lengths are divided by this factor when they become edge weights,
/// and multiplied back by it when distances are read out of the graph.
pub const LENGTH_SCALE: f64 = 10.0;

/// Position of a place in [`Graph::places`].
pub type PlaceIndex = usize;

/// Converts a connection length to the weight stored on the graph edge.
#[inline]
pub fn length_to_weight(length: f64) -> f64 {
    length / LENGTH_SCALE
}

/// Converts an edge weight (or a sum of them) back to board units.
///
/// Halfway values are rounded to the nearest even integer, e.g. a weight of `0.25` becomes `2`.
///
/// # Example
/// ```
/// use map_builder::graph::weight_to_length;
///
/// assert_eq!(weight_to_length(0.3), 3);
/// assert_eq!(weight_to_length(0.25), 2);
/// assert_eq!(weight_to_length(0.75), 8);
/// ```
#[inline]
pub fn weight_to_length(weight: f64) -> u32 {
    (weight * LENGTH_SCALE).round_ties_even() as u32
}

/// A second, parallel track between two places that are already connected.
///
/// It is not an edge of the graph: it never shortens a path, it only adds a segment to color.
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleRoute {
    /// Endpoints, in the order they appear in the connections table.
    pub places: PlaceToPlace,
    pub length: f64,
}

/// Undirected, weighted graph of the places on the map.
///
/// Immutable once built. Not meant for large graphs: a custom board holds a few dozen places.
#[derive(Clone, Debug)]
pub struct Graph {
    /// Places, in the order of the locations table.
    places: Vec<Place>,
    /// Maps a place name to its position in `places`.
    place_indices: HashMap<String, PlaceIndex>,
    /// Maps two adjacent places to the weight of the edge between them.
    /// Every edge is held twice, once per direction, so that all the neighbors of a place
    /// form a contiguous range of keys.
    edges: BTreeMap<(PlaceIndex, PlaceIndex), f64>,
    /// Parallel tracks, in the order of the connections table.
    double_routes: Vec<DoubleRoute>,
}

impl Graph {
    fn get_range_of_edges_starting_at_place(
        place: PlaceIndex,
    ) -> RangeInclusive<(PlaceIndex, PlaceIndex)> {
        (place, PlaceIndex::MIN)..=(place, PlaceIndex::MAX)
    }

    /// Builds the graph from the locations and connections tables.
    ///
    /// Fails if a place is listed twice, if a connection references an unknown place,
    /// or if a connection is a self-loop, has a non-positive length, or repeats an existing edge.
    ///
    /// # Example
    /// ```
    /// use map_builder::graph::Graph;
    /// use map_builder::place::{ConnectionRecord, LocationRecord};
    ///
    /// let locations = vec![
    ///     LocationRecord::new("A", 0.0, 0.0),
    ///     LocationRecord::new("B", 1.0, 0.0),
    /// ];
    /// let connections = vec![ConnectionRecord::new("A", "B", 10.0, false)];
    ///
    /// let graph = Graph::build(&locations, &connections).unwrap();
    /// assert_eq!(graph.num_edges(), 1);
    ///
    /// let connections = vec![ConnectionRecord::new("A", "C", 10.0, false)];
    /// assert!(Graph::build(&locations, &connections).is_err());
    /// ```
    pub fn build(
        locations: &[LocationRecord],
        connections: &[ConnectionRecord],
    ) -> Result<Self, MapError> {
        let mut places = Vec::with_capacity(locations.len());
        let mut place_indices = HashMap::with_capacity(locations.len());

        for location in locations {
            if place_indices.contains_key(&location.place) {
                return Err(MapError::DuplicatePlace(location.place.clone()));
            }

            place_indices.insert(location.place.clone(), places.len());
            places.push(Place {
                name: location.place.clone(),
                position: (location.coord_x, location.coord_y),
            });
        }

        let mut graph = Self {
            places,
            place_indices,
            edges: BTreeMap::new(),
            double_routes: Vec::new(),
        };

        for connection in connections {
            graph.add_connection(connection)?;
        }

        debug!(
            "Built graph with {} places, {} edges and {} double routes.",
            graph.num_places(),
            graph.num_edges(),
            graph.double_routes.len()
        );

        Ok(graph)
    }

    /// Same as [`Graph::build`], from both tables bundled together.
    #[inline]
    pub fn from_description(map: &MapDescription) -> Result<Self, MapError> {
        Self::build(&map.locations, &map.connections)
    }

    fn add_connection(&mut self, connection: &ConnectionRecord) -> Result<(), MapError> {
        let start = self.require_place(connection, &connection.place_1)?;
        let end = self.require_place(connection, &connection.place_2)?;

        let invalid = |reason| MapError::InvalidConnection {
            connection: connection.places(),
            reason,
        };

        if start == end {
            return Err(invalid(InvalidConnectionReason::SelfLoop));
        }

        // Also rejects NaN.
        if !(connection.length.is_finite() && connection.length > 0.0) {
            return Err(invalid(InvalidConnectionReason::NonPositiveLength));
        }

        if self.edges.contains_key(&(start, end)) {
            return Err(invalid(InvalidConnectionReason::DuplicateEdge));
        }

        let weight = length_to_weight(connection.length);
        self.edges.insert((start, end), weight);
        self.edges.insert((end, start), weight);

        if connection.double_route {
            self.double_routes.push(DoubleRoute {
                places: connection.places(),
                length: connection.length,
            });
        }

        Ok(())
    }

    fn require_place(
        &self,
        connection: &ConnectionRecord,
        place: &str,
    ) -> Result<PlaceIndex, MapError> {
        self.index_of(place)
            .ok_or_else(|| MapError::DanglingConnection {
                connection: connection.places(),
                place: place.to_owned(),
            })
    }

    /// All places, in the order of the locations table.
    #[inline]
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    #[inline]
    pub fn place(&self, index: PlaceIndex) -> &Place {
        &self.places[index]
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<PlaceIndex> {
        self.place_indices.get(name).copied()
    }

    #[inline]
    pub fn num_places(&self) -> usize {
        self.places.len()
    }

    /// Number of undirected edges, double routes excluded.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len() / 2
    }

    /// The places adjacent to `place`, alongside the weight of the edge leading to them.
    pub fn neighbors(&self, place: PlaceIndex) -> impl Iterator<Item = (PlaceIndex, f64)> + '_ {
        self.edges
            .range(Self::get_range_of_edges_starting_at_place(place))
            .map(|((_, end), weight)| (*end, *weight))
    }

    /// Every undirected edge exactly once, as `(start, end, weight)` with `start < end`.
    pub fn edges(&self) -> impl Iterator<Item = (PlaceIndex, PlaceIndex, f64)> + '_ {
        self.edges
            .iter()
            .filter(|((start, end), _)| start < end)
            .map(|((start, end), weight)| (*start, *end, *weight))
    }

    /// Parallel tracks, in the order of the connections table.
    #[inline]
    pub fn double_routes(&self) -> &[DoubleRoute] {
        &self.double_routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn locations() -> Vec<LocationRecord> {
        vec![
            LocationRecord::new("Bedok", 80.0, 30.0),
            LocationRecord::new("Changi", 95.0, 25.0),
            LocationRecord::new("Tampines", 85.0, 20.0),
        ]
    }

    #[test]
    fn edge_range_construction() {
        assert_eq!(
            Graph::get_range_of_edges_starting_at_place(4),
            (4, PlaceIndex::MIN)..=(4, PlaceIndex::MAX)
        );
    }

    #[test]
    fn build_graph() {
        let connections = vec![
            ConnectionRecord::new("Bedok", "Tampines", 3.0, false),
            ConnectionRecord::new("Tampines", "Changi", 4.0, true),
        ];
        let graph = Graph::build(&locations(), &connections).unwrap();

        assert_eq!(graph.num_places(), 3);
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.place(1).name, "Changi");
        assert_eq!(graph.place(1).position, (95.0, 25.0));
        assert_eq!(graph.index_of("Tampines"), Some(2));
        assert_eq!(graph.index_of("Jurong"), None);
    }

    #[test]
    fn edges_are_scaled_and_bidirectional() {
        let connections = vec![ConnectionRecord::new("Bedok", "Tampines", 3.0, false)];
        let graph = Graph::build(&locations(), &connections).unwrap();

        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![(2, 0.3)]);
        assert_eq!(graph.neighbors(2).collect::<Vec<_>>(), vec![(0, 0.3)]);
        assert_eq!(graph.neighbors(1).count(), 0);
    }

    #[test]
    fn neighbors_of_place() {
        let connections = vec![
            ConnectionRecord::new("Bedok", "Tampines", 3.0, false),
            ConnectionRecord::new("Tampines", "Changi", 4.0, false),
        ];
        let graph = Graph::build(&locations(), &connections).unwrap();

        assert_eq!(graph.neighbors(2).collect::<Vec<_>>(), vec![(0, 0.3), (1, 0.4)]);
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![(2, 0.4)]);
    }

    #[test]
    fn edges_are_listed_once() {
        let connections = vec![
            ConnectionRecord::new("Tampines", "Bedok", 3.0, false),
            ConnectionRecord::new("Changi", "Tampines", 4.0, false),
        ];
        let graph = Graph::build(&locations(), &connections).unwrap();

        assert_eq!(
            graph.edges().collect::<Vec<_>>(),
            vec![(0, 2, 0.3), (1, 2, 0.4)]
        );
    }

    #[test]
    fn double_routes_keep_table_order() {
        let connections = vec![
            ConnectionRecord::new("Tampines", "Changi", 4.0, true),
            ConnectionRecord::new("Bedok", "Tampines", 3.0, false),
            ConnectionRecord::new("Bedok", "Changi", 6.0, true),
        ];
        let graph = Graph::build(&locations(), &connections).unwrap();

        assert_eq!(
            graph.double_routes(),
            &[
                DoubleRoute {
                    places: (String::from("Tampines"), String::from("Changi")),
                    length: 4.0,
                },
                DoubleRoute {
                    places: (String::from("Bedok"), String::from("Changi")),
                    length: 6.0,
                },
            ]
        );
        // Double routes are not extra edges.
        assert_eq!(graph.num_edges(), 3);
    }

    #[test]
    fn duplicate_place() {
        let mut locations = locations();
        locations.push(LocationRecord::new("Bedok", 0.0, 0.0));

        assert_eq!(
            Graph::build(&locations, &[]).unwrap_err(),
            MapError::DuplicatePlace(String::from("Bedok"))
        );
    }

    #[test]
    fn dangling_connection() {
        let connections = vec![ConnectionRecord::new("Bedok", "Jurong", 3.0, false)];

        assert_eq!(
            Graph::build(&locations(), &connections).unwrap_err(),
            MapError::DanglingConnection {
                connection: (String::from("Bedok"), String::from("Jurong")),
                place: String::from("Jurong"),
            }
        );
    }

    #[test]
    fn self_loop_connection() {
        let connections = vec![ConnectionRecord::new("Bedok", "Bedok", 3.0, false)];

        assert_eq!(
            Graph::build(&locations(), &connections).unwrap_err(),
            MapError::InvalidConnection {
                connection: (String::from("Bedok"), String::from("Bedok")),
                reason: InvalidConnectionReason::SelfLoop,
            }
        );
    }

    #[test]
    fn non_positive_length_connection() {
        for length in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let connections = vec![ConnectionRecord::new("Bedok", "Changi", length, false)];

            assert_eq!(
                Graph::build(&locations(), &connections).unwrap_err(),
                MapError::InvalidConnection {
                    connection: (String::from("Bedok"), String::from("Changi")),
                    reason: InvalidConnectionReason::NonPositiveLength,
                }
            );
        }
    }

    #[test]
    fn duplicate_edge_in_either_direction() {
        let connections = vec![
            ConnectionRecord::new("Bedok", "Changi", 3.0, false),
            ConnectionRecord::new("Changi", "Bedok", 5.0, false),
        ];

        assert_eq!(
            Graph::build(&locations(), &connections).unwrap_err(),
            MapError::InvalidConnection {
                connection: (String::from("Changi"), String::from("Bedok")),
                reason: InvalidConnectionReason::DuplicateEdge,
            }
        );
    }

    #[test]
    fn weight_round_trip() {
        for length in 1..=12 {
            assert_eq!(weight_to_length(length_to_weight(length as f64)), length);
        }
    }

    #[test]
    fn weight_rounds_half_to_even() {
        assert_eq!(weight_to_length(0.25), 2);
        assert_eq!(weight_to_length(0.75), 8);
        assert_eq!(weight_to_length(0.26), 3);
    }
}
