/// A detected corner.
///
/// With the `serde` feature the point is (de)serialized as the array
/// `[x, y, score]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "(usize, usize, f64)", into = "(usize, usize, f64)")
)]
pub struct InterestPoint {
    /// Column of the pixel.
    pub x: usize,
    /// Row of the pixel.
    pub y: usize,
    /// Harris response at the pixel.
    pub score: f64,
}

impl From<(usize, usize, f64)> for InterestPoint {
    fn from((x, y, score): (usize, usize, f64)) -> Self {
        Self { x, y, score }
    }
}

impl From<InterestPoint> for (usize, usize, f64) {
    fn from(p: InterestPoint) -> Self {
        (p.x, p.y, p.score)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn serialize_as_array() -> Result<(), serde_json::Error> {
        let points = vec![
            InterestPoint {
                x: 3,
                y: 4,
                score: 1.5e6,
            },
            InterestPoint {
                x: 5,
                y: 4,
                score: 2.25,
            },
        ];

        let json = serde_json::to_string(&points)?;
        assert_eq!(json, "[[3,4,1500000.0],[5,4,2.25]]");

        let back: Vec<InterestPoint> = serde_json::from_str(&json)?;
        assert_eq!(back, points);
        Ok(())
    }
}
