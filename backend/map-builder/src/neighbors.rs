use crate::graph::{weight_to_length, Graph};
use crate::place::{unordered_pair, PlaceToPlace};

use serde::Serialize;

/// Two directly connected places, and the length of the track between them.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Adjacency {
    /// Sorted, so the same pair is always reported the same way.
    pub places: PlaceToPlace,
    pub length: u32,
}

/// Lists every pair of adjacent places exactly once, sorted by place names.
///
/// Only direct edges are reported; double routes are left to the caller.
///
/// # Example
/// ```
/// use map_builder::graph::Graph;
/// use map_builder::neighbors::extract_neighbors;
/// use map_builder::place::{ConnectionRecord, LocationRecord};
///
/// let locations = vec![
///     LocationRecord::new("B", 0.0, 0.0),
///     LocationRecord::new("A", 1.0, 0.0),
/// ];
/// let connections = vec![ConnectionRecord::new("B", "A", 3.0, true)];
/// let graph = Graph::build(&locations, &connections).unwrap();
///
/// let neighbors = extract_neighbors(&graph);
/// assert_eq!(neighbors.len(), 1);
/// assert_eq!(neighbors[0].places, (String::from("A"), String::from("B")));
/// assert_eq!(neighbors[0].length, 3);
/// ```
pub fn extract_neighbors(graph: &Graph) -> Vec<Adjacency> {
    let mut neighbors: Vec<Adjacency> = graph
        .edges()
        .map(|(start, end, weight)| Adjacency {
            places: unordered_pair(&graph.place(start).name, &graph.place(end).name),
            length: weight_to_length(weight),
        })
        .collect();

    neighbors.sort_by(|left, right| left.places.cmp(&right.places));
    neighbors
}
