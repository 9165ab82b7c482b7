use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

/// All the colors a track segment can be painted with.
///
/// The declaration order matters: color budgets are iterated in this order when drawing
/// a color, so reordering variants changes which color a given seed produces.
///
/// # JSON
/// Colors are serialized in lowercase.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumCountMacro,
    EnumIter,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrackColor {
    Yellow,
    Blue,
    Green,
    Red,
    Purple,
    Black,
    White,
    Orange,
    /// Grey tracks can be claimed with cards of any single color.
    Grey,
}

impl TrackColor {
    /// Whether the current color is the neutral one, i.e. claimable with any color.
    ///
    /// # Examples:
    /// ```
    /// use map_builder::track_color::TrackColor;
    ///
    /// assert!(TrackColor::Grey.is_neutral());
    /// assert!(!TrackColor::Purple.is_neutral());
    /// ```
    #[inline]
    pub fn is_neutral(&self) -> bool {
        *self == TrackColor::Grey
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::EnumCount;

    #[test]
    fn track_color_count() {
        assert_eq!(TrackColor::COUNT, 9);
    }

    #[test]
    fn track_color_to_string() {
        assert_eq!(TrackColor::Orange.to_string(), "orange");
        assert_eq!(TrackColor::Grey.to_string(), "grey");
    }

    #[test]
    fn track_color_order_follows_declaration() {
        assert!(TrackColor::Yellow < TrackColor::Blue);
        assert!(TrackColor::Orange < TrackColor::Grey);
    }

    #[test]
    fn track_color_to_json() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&TrackColor::Blue)?, r#""blue""#);
        assert_eq!(serde_json::to_string(&TrackColor::Purple)?, r#""purple""#);
        Ok(())
    }

    #[test]
    fn json_to_track_color() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::from_str::<TrackColor>(r#""grey""#)?,
            TrackColor::Grey
        );
        assert_eq!(
            serde_json::from_str::<TrackColor>(r#""white""#)?,
            TrackColor::White
        );

        Ok(())
    }

    #[test]
    fn invalid_json_to_track_color() {
        assert!(serde_json::from_str::<TrackColor>(r#""pink""#).is_err());
        assert!(serde_json::from_str::<TrackColor>(r#""wild""#).is_err());
    }
}
