use crate::error::MapError;
use crate::graph::{weight_to_length, Graph, PlaceIndex};
use crate::place::PlaceToPlace;

use log::debug;
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;
use std::collections::BTreeMap;

/// Copies the graph into a petgraph network, where node `i` is place `i`.
fn to_network(graph: &Graph) -> UnGraph<(), f64> {
    let mut network = UnGraph::with_capacity(graph.num_places(), graph.num_edges());
    for _ in 0..graph.num_places() {
        network.add_node(());
    }

    for start in 0..graph.num_places() {
        for (end, weight) in graph.neighbors(start).filter(|(end, _)| start < *end) {
            network.add_edge(NodeIndex::new(start), NodeIndex::new(end), weight);
        }
    }

    network
}

/// Shortest distances between every pair of places, in board units.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistanceMatrix {
    /// Place names, sorted lexicographically.
    /// Row `i` and column `i` both refer to `place_keys[i]`.
    place_keys: Vec<String>,
    /// Full symmetric matrix; the diagonal is zero.
    distances: Vec<Vec<u32>>,
}

impl DistanceMatrix {
    /// Runs Dijkstra from every place, then scales each distance back to board units
    /// (see [`weight_to_length`] for the rounding).
    ///
    /// Fails if any two places cannot reach each other: the board must be a single network.
    ///
    /// # Example
    /// ```
    /// use map_builder::distance::DistanceMatrix;
    /// use map_builder::graph::Graph;
    /// use map_builder::place::{ConnectionRecord, LocationRecord};
    ///
    /// let locations = vec![
    ///     LocationRecord::new("A", 0.0, 0.0),
    ///     LocationRecord::new("B", 1.0, 0.0),
    ///     LocationRecord::new("C", 2.0, 0.0),
    /// ];
    /// let connections = vec![
    ///     ConnectionRecord::new("A", "B", 10.0, false),
    ///     ConnectionRecord::new("B", "C", 10.0, false),
    /// ];
    /// let graph = Graph::build(&locations, &connections).unwrap();
    ///
    /// let matrix = DistanceMatrix::compute(&graph).unwrap();
    /// assert_eq!(matrix.distance("A", "C"), Some(20));
    /// assert_eq!(matrix.distance("C", "A"), Some(20));
    /// ```
    pub fn compute(graph: &Graph) -> Result<Self, MapError> {
        let mut order: Vec<PlaceIndex> = (0..graph.num_places()).collect();
        order.sort_by(|start, end| graph.place(*start).name.cmp(&graph.place(*end).name));

        let place_keys: Vec<String> = order
            .iter()
            .map(|index| graph.place(*index).name.clone())
            .collect();

        let network = to_network(graph);
        let mut distances = vec![vec![0; order.len()]; order.len()];

        for (row, &source) in order.iter().enumerate() {
            let from_source =
                dijkstra(&network, NodeIndex::new(source), None, |edge| *edge.weight());

            // Each pair is measured once, from the place that sorts first, then mirrored.
            for column in (row + 1)..order.len() {
                let distance = from_source
                    .get(&NodeIndex::new(order[column]))
                    .copied()
                    .ok_or_else(|| MapError::DisconnectedGraph {
                        from: place_keys[row].clone(),
                        to: place_keys[column].clone(),
                    })?;

                let length = weight_to_length(distance);
                distances[row][column] = length;
                distances[column][row] = length;
            }
        }

        debug!("Computed distances between {} places.", place_keys.len());

        Ok(Self {
            place_keys,
            distances,
        })
    }

    /// Place names in row/column order.
    #[inline]
    pub fn place_keys(&self) -> &[String] {
        &self.place_keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.place_keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.place_keys.is_empty()
    }

    /// Distance between the places at rows `row` and `column`.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> u32 {
        self.distances[row][column]
    }

    /// Distance between two places by name, or `None` if either is unknown.
    pub fn distance(&self, start: &str, end: &str) -> Option<u32> {
        let row = self.row_of(start)?;
        let column = self.row_of(end)?;
        Some(self.get(row, column))
    }

    fn row_of(&self, place: &str) -> Option<usize> {
        self.place_keys
            .binary_search_by(|key| key.as_str().cmp(place))
            .ok()
    }

    /// The matrix with every entry below the diagonal zeroed out.
    /// Each unordered pair then shows up exactly once, at `(i, j)` with `i < j`.
    pub fn upper_triangular(&self) -> Vec<Vec<u32>> {
        self.distances
            .iter()
            .enumerate()
            .map(|(row, distances)| {
                distances
                    .iter()
                    .enumerate()
                    .map(|(column, distance)| if column < row { 0 } else { *distance })
                    .collect()
            })
            .collect()
    }

    /// Groups every pair of places by their distance. See [`DistanceBuckets::from_matrix`].
    #[inline]
    pub fn buckets(&self) -> DistanceBuckets {
        DistanceBuckets::from_matrix(self)
    }
}

/// Maps a distance to all the pairs of places that are exactly that far apart.
///
/// # JSON
/// Serialized as an object keyed by distance.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DistanceBuckets(BTreeMap<u32, Vec<PlaceToPlace>>);

impl DistanceBuckets {
    /// Walks the upper triangle of the matrix row by row, and files each pair under its distance.
    ///
    /// A place is never paired with itself, and pairs at distance zero are left out altogether.
    /// Within a pair, places are in row/column order, i.e. sorted.
    pub fn from_matrix(matrix: &DistanceMatrix) -> Self {
        let mut buckets: BTreeMap<u32, Vec<PlaceToPlace>> = BTreeMap::new();
        let place_keys = matrix.place_keys();

        for row in 0..matrix.len() {
            for column in (row + 1)..matrix.len() {
                let distance = matrix.get(row, column);
                if distance == 0 {
                    continue;
                }

                buckets
                    .entry(distance)
                    .or_default()
                    .push((place_keys[row].clone(), place_keys[column].clone()));
            }
        }

        debug!(
            "Sorted place pairs into {} distance buckets: {:?}",
            buckets.len(),
            buckets
                .iter()
                .map(|(distance, pairs)| (*distance, pairs.len()))
                .collect::<Vec<_>>()
        );

        Self(buckets)
    }

    /// All the pairs at exactly `distance`, empty if there are none.
    pub fn get(&self, distance: u32) -> &[PlaceToPlace] {
        self.0
            .get(&distance)
            .map(|pairs| pairs.as_slice())
            .unwrap_or_default()
    }

    /// Every bucket, by increasing distance.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[PlaceToPlace])> {
        self.0
            .iter()
            .map(|(distance, pairs)| (*distance, pairs.as_slice()))
    }

    /// Number of non-empty buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of pairs across all buckets.
    pub fn num_pairs(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl FromIterator<(u32, Vec<PlaceToPlace>)> for DistanceBuckets {
    fn from_iter<I: IntoIterator<Item = (u32, Vec<PlaceToPlace>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
