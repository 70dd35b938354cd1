// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! World-space point type shared by every stage of the pipeline

use serde::{Deserialize, Serialize};

/// A 2D point in world units (simplified for serialization)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> nalgebra::Point2<f64> {
        nalgebra::Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &nalgebra::Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Both coordinates are finite (no NaN or infinity)
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_midpoint() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);

        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert_eq!(a.midpoint(&b), Point2::new(1.5, 2.0));
    }

    #[test]
    fn test_nalgebra_round_trip() {
        let p = Point2::new(-2.5, 7.0);
        assert_eq!(Point2::from_nalgebra(&p.to_nalgebra()), p);
    }
}
