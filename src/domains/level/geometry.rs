use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in level coordinates. The Y axis points down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// How far `other` lies above `self`; negative when it lies below.
    pub fn rise_to(&self, other: &Point) -> f64 {
        self.y - other.y
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Axis-aligned rectangle described by its center, as the game reports
/// obstacles and platforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Up-left, up-right, down-left, down-right.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.left(), self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Shrinks every side by `margin`; `None` when nothing is left.
    pub fn eroded(&self, margin: f64) -> Option<Rect> {
        let width = self.width - 2.0 * margin;
        let height = self.height - 2.0 * margin;
        if width < 0.0 || height < 0.0 {
            return None;
        }
        Some(Rect::new(self.x, self.y, width, height))
    }
}

/// Playable area, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ArenaBounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// The three families of static geometry a level is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Obstacle,
    CirclePlatform,
    RectanglePlatform,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_follow_inverted_y_axis() {
        let rect = Rect::new(100.0, 100.0, 40.0, 20.0);
        let [up_left, up_right, down_left, down_right] = rect.corners();
        assert_eq!(up_left, Point::new(80.0, 90.0));
        assert_eq!(up_right, Point::new(120.0, 90.0));
        assert_eq!(down_left, Point::new(80.0, 110.0));
        assert_eq!(down_right, Point::new(120.0, 110.0));
    }

    #[test]
    fn erosion_can_consume_thin_shapes() {
        let rect = Rect::new(0.0, 0.0, 10.0, 40.0);
        assert!(rect.eroded(6.0).is_none());
        assert_eq!(rect.eroded(4.0), Some(Rect::new(0.0, 0.0, 2.0, 32.0)));
    }

    #[test]
    fn rise_is_positive_upwards() {
        let ground = Point::new(0.0, 500.0);
        let ledge = Point::new(0.0, 300.0);
        assert_eq!(ground.rise_to(&ledge), 200.0);
        assert_eq!(ledge.rise_to(&ground), -200.0);
    }
}
