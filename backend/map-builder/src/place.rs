use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Top-level representation of a pair of places, e.g. a connection or a destination.
pub type PlaceToPlace = (String, String);

/// Builds a [`PlaceToPlace`] with the lexicographically smaller place first,
/// so that the same unordered pair always compares equal.
///
/// # Example
/// ```
/// use map_builder::place::unordered_pair;
///
/// assert_eq!(unordered_pair("Tampines", "Bedok"), unordered_pair("Bedok", "Tampines"));
/// ```
pub fn unordered_pair(start: &str, end: &str) -> PlaceToPlace {
    if start <= end {
        (start.to_owned(), end.to_owned())
    } else {
        (end.to_owned(), start.to_owned())
    }
}

/// A named location on the board.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Place {
    /// Unique across the whole map.
    pub name: String,
    /// Where the place is drawn on the board.
    pub position: (f64, f64),
}

/// One row of the locations table.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LocationRecord {
    pub place: String,
    pub coord_x: f64,
    pub coord_y: f64,
}

impl LocationRecord {
    pub fn new(place: &str, coord_x: f64, coord_y: f64) -> Self {
        Self {
            place: place.to_owned(),
            coord_x,
            coord_y,
        }
    }
}

/// One row of the connections table.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConnectionRecord {
    pub place_1: String,
    pub place_2: String,
    /// Length in board units, i.e. the number of train cars needed to claim it.
    pub length: f64,
    /// Whether a second, parallel track runs alongside this connection.
    ///
    /// # JSON
    /// Only `"Y"` marks a double route; any other value (or a missing field) does not.
    #[serde(
        default,
        deserialize_with = "deserialize_double_route_flag",
        serialize_with = "serialize_double_route_flag"
    )]
    pub double_route: bool,
}

impl ConnectionRecord {
    pub fn new(place_1: &str, place_2: &str, length: f64, double_route: bool) -> Self {
        Self {
            place_1: place_1.to_owned(),
            place_2: place_2.to_owned(),
            length,
            double_route,
        }
    }

    #[inline]
    pub fn places(&self) -> PlaceToPlace {
        (self.place_1.clone(), self.place_2.clone())
    }
}

fn deserialize_double_route_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    // Empty cells come out as null, and some exports write numbers.
    let flag = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(flag, Some(Value::String(flag)) if flag == "Y"))
}

fn serialize_double_route_flag<S>(double_route: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *double_route { "Y" } else { "N" })
}

/// Both input tables describing a custom map.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MapDescription {
    pub locations: Vec<LocationRecord>,
    pub connections: Vec<ConnectionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_pair_sorts_places() {
        assert_eq!(
            unordered_pair("Woodlands", "Changi"),
            (String::from("Changi"), String::from("Woodlands"))
        );
        assert_eq!(
            unordered_pair("Changi", "Woodlands"),
            (String::from("Changi"), String::from("Woodlands"))
        );
    }

    #[test]
    fn json_to_connection_with_double_route() -> serde_json::Result<()> {
        let connection: ConnectionRecord = serde_json::from_str(
            r#"{"place_1": "Bishan", "place_2": "Novena", "length": 3, "double_route": "Y"}"#,
        )?;

        assert_eq!(
            connection,
            ConnectionRecord::new("Bishan", "Novena", 3.0, true)
        );
        Ok(())
    }

    #[test]
    fn json_to_connection_without_double_route() -> serde_json::Result<()> {
        let connection: ConnectionRecord = serde_json::from_str(
            r#"{"place_1": "Bishan", "place_2": "Novena", "length": 3, "double_route": "N"}"#,
        )?;
        assert!(!connection.double_route);

        let connection: ConnectionRecord = serde_json::from_str(
            r#"{"place_1": "Bishan", "place_2": "Novena", "length": 3, "double_route": "y"}"#,
        )?;
        assert!(!connection.double_route);

        let connection: ConnectionRecord =
            serde_json::from_str(r#"{"place_1": "Bishan", "place_2": "Novena", "length": 3}"#)?;
        assert!(!connection.double_route);

        Ok(())
    }

    #[test]
    fn json_to_connection_with_empty_flag() -> serde_json::Result<()> {
        let connection: ConnectionRecord = serde_json::from_str(
            r#"{"place_1": "A", "place_2": "B", "length": 3, "double_route": null}"#,
        )?;
        assert_eq!(connection, ConnectionRecord::new("A", "B", 3.0, false));

        let connection: ConnectionRecord = serde_json::from_str(
            r#"{"place_1": "A", "place_2": "B", "length": 3, "double_route": 1}"#,
        )?;
        assert!(!connection.double_route);

        Ok(())
    }

    #[test]
    fn connection_to_json() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_string(&ConnectionRecord::new("Jurong", "Clementi", 4.0, true))?,
            r#"{"place_1":"Jurong","place_2":"Clementi","length":4.0,"double_route":"Y"}"#
        );
        Ok(())
    }

    #[test]
    fn json_to_map_description() -> serde_json::Result<()> {
        let map: MapDescription = serde_json::from_str(
            r#"{
                "locations": [
                    {"place": "Jurong", "coord_x": 10, "coord_y": 40},
                    {"place": "Clementi", "coord_x": 22.5, "coord_y": 41}
                ],
                "connections": [
                    {"place_1": "Jurong", "place_2": "Clementi", "length": 2, "double_route": "None"}
                ]
            }"#,
        )?;

        assert_eq!(map.locations[1], LocationRecord::new("Clementi", 22.5, 41.0));
        assert_eq!(
            map.connections,
            vec![ConnectionRecord::new("Jurong", "Clementi", 2.0, false)]
        );
        Ok(())
    }
}
