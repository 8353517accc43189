/*
 * Copyright (c) 2003-2023. Trevor Campbell and others.
 *
 * This file is part of Kelpie FMC.
 *
 * Kelpie FMC is free software; you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation; either version 2 of the License, or
 * (at your option) any later version.
 *
 * Kelpie FMC is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Kelpie FMC; if not, write to the Free Software
 * Foundation, Inc., 59 Temple Place, Suite 330, Boston, MA  02111-1307  USA
 *
 * Contributors:
 *      Trevor Campbell
 *
 */

use std::f64::consts::PI;
use std::fmt;

use crate::util::lat_long_format::LatLongFormat;

/// Below this angular separation (radians) two points are treated as coincident.
const COINCIDENT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub const EARTH_RADIUS: f64 = 3441.85;

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Initial true course to `l` in radians, 0..2PI.
    /// Coincident points give 0 and departures from a pole point due south or due north.
    pub fn bearing_to(&self, l: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = l.latitude.to_radians();
        let lon1 = self.longitude.to_radians();
        let lon2 = l.longitude.to_radians();

        let d = Self::central_angle(lat1, lon1, lat2, lon2);
        if d < COINCIDENT_EPSILON {
            return 0.0;
        }
        if lat1.cos() < COINCIDENT_EPSILON {
            return if lat1 > 0.0 { PI } else { 0.0 };
        }

        let x = ((lat2.sin() - lat1.sin() * d.cos()) / (d.sin() * lat1.cos())).clamp(-1.0, 1.0);
        let mut heading = x.acos();

        if (lon2 - lon1).sin() < 0.0 {
            heading = 2.0 * PI - heading;
        }

        heading
    }

    pub fn bearing_to_deg(&self, l: &Coordinate) -> f64 {
        normalize_degrees(self.bearing_to(l).to_degrees())
    }

    /// The point `distance` NM away on initial true course `heading` (degrees).
    pub fn coordinate_at(&self, distance: f64, heading: f64) -> Coordinate {
        let d = distance / Self::EARTH_RADIUS;
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();
        let tc = heading.to_radians();
        let lat = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * tc.cos())
            .clamp(-1.0, 1.0)
            .asin();
        let d_lon = (tc.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat.sin());

        let lon = (lon1 + d_lon + PI).rem_euclid(2.0 * PI) - PI;

        Coordinate::new(lat.to_degrees(), lon.to_degrees())
    }

    /// Great circle distance in nautical miles. Never negative or NaN.
    pub fn distance_to(&self, l: &Coordinate) -> f64 {
        let d = Self::central_angle(
            self.latitude.to_radians(),
            self.longitude.to_radians(),
            l.latitude.to_radians(),
            l.longitude.to_radians(),
        );
        Self::EARTH_RADIUS * d.abs()
    }

    /// Intersection of the great circle leaving `p1` on `course1` with the one leaving `p2` on
    /// `course2` (degrees true). None when the courses are parallel or the intersection is
    /// ambiguous (infinite or behind both points).
    pub fn intersection(p1: &Coordinate, course1: f64, p2: &Coordinate, course2: f64) -> Option<Coordinate> {
        let lat1 = p1.latitude.to_radians();
        let lon1 = p1.longitude.to_radians();
        let lat2 = p2.latitude.to_radians();
        let lon2 = p2.longitude.to_radians();
        let crs13 = course1.to_radians();
        let crs23 = course2.to_radians();

        let dst12 = Self::central_angle(lat1, lon1, lat2, lon2);
        if dst12 < COINCIDENT_EPSILON {
            return Some(*p1);
        }

        let crs12 = p1.bearing_to(p2);
        let crs21 = p2.bearing_to(p1);

        let ang1 = (crs13 - crs12 + PI).rem_euclid(2.0 * PI) - PI;
        let ang2 = (crs21 - crs23 + PI).rem_euclid(2.0 * PI) - PI;

        if (ang1.sin() == 0.0 && ang2.sin() == 0.0) || ang1.sin() * ang2.sin() < 0.0 {
            return None;
        }

        let ang1 = ang1.abs();
        let ang2 = ang2.abs();
        let ang3 = (-ang1.cos() * ang2.cos() + ang1.sin() * ang2.sin() * dst12.cos())
            .clamp(-1.0, 1.0)
            .acos();
        let dst13 = (dst12.sin() * ang1.sin() * ang2.sin()).atan2(ang2.cos() + ang1.cos() * ang3.cos());
        if !dst13.is_finite() {
            return None;
        }

        Some(p1.coordinate_at(dst13 * Self::EARTH_RADIUS, course1))
    }

    fn central_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let d_lon = lon1 - lon2;
        let d_lat = lat1 - lat2;

        let a = ((d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2))
            .clamp(0.0, 1.0);
        2.0 * a.sqrt().atan2((1.0 - a).sqrt())
    }

    pub fn get_latitude(&self) -> f64 {
        self.latitude
    }

    pub fn get_latitude_as_string(&self) -> String {
        let formatter = LatLongFormat::lat_format();
        formatter.format(self.latitude)
    }

    pub fn get_longitude(&self) -> f64 {
        self.longitude
    }

    pub fn get_longitude_as_string(&self) -> String {
        let formatter = LatLongFormat::long_format();
        formatter.format(self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.get_latitude_as_string(),
            self.get_longitude_as_string()
        )
    }
}

/// Wrap an angle in degrees into 0..360.
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 { 0.0 } else { a }
}

/// Smallest absolute difference between two courses, 0..=180.
pub fn course_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_degrees(a - b);
    if diff > 180.0 { 360.0 - diff } else { diff }
}

#[cfg(test)]
mod tests {
    use super::{Coordinate, course_difference, normalize_degrees};

    #[test]
    fn test_construct() {
        let result = Coordinate::new(-34.0, 151.0);
        assert_eq!(result.get_latitude(), -34.0);
        assert_eq!(result.get_longitude(), 151.0);
    }

    #[test]
    fn test_distance_to() {
        let c1 = Coordinate::new(-34.0, 151.0);
        let c2 = Coordinate::new(-34.0, 151.0);
        assert_eq!(c1.distance_to(&c2), 0.0);
        let c1 = Coordinate::new(-34.0, 151.0);
        let c2 = Coordinate::new(-34.0, 150.0);
        assert_eq!(c1.distance_to(&c2).round(), 50.0);
        let c1 = Coordinate::new(-34.0, 151.0);
        let c2 = Coordinate::new(-35.0, 151.0);
        assert_eq!(c1.distance_to(&c2).round(), 60.0);
        let c1 = Coordinate::new(-34.0, 151.0);
        let c2 = Coordinate::new(0.0, 0.0);
        assert!(is_between(c1.distance_to(&c2), 8190.0, 8210.0));
    }

    #[test]
    fn test_distance_antipodal() {
        let c1 = Coordinate::new(0.0, 0.0);
        let c2 = Coordinate::new(0.0, 180.0);
        let d = c1.distance_to(&c2);
        assert!(d.is_finite());
        assert!(is_between(d, 10812.0, 10814.0));
    }

    #[test]
    fn test_bearing_to_deg() {
        let c1 = Coordinate::new(-34.0, 151.0);
        let c2 = Coordinate::new(-35.0, 151.0);
        assert_eq!(c1.bearing_to_deg(&c2).round(), 180.0);
        let c1 = Coordinate::new(34.0, 151.0);
        let c2 = Coordinate::new(35.0, 151.0);
        assert_eq!(c1.bearing_to_deg(&c2).round(), 0.0);
        let c1 = Coordinate::new(34.0, 151.0);
        let c2 = Coordinate::new(34.0, 152.0);
        assert!(is_between(c1.bearing_to_deg(&c2), 89.0, 90.0));
    }

    #[test]
    fn test_bearing_degenerate() {
        let c1 = Coordinate::new(47.0, 15.0);
        assert_eq!(c1.bearing_to_deg(&c1), 0.0);

        let pole = Coordinate::new(90.0, 0.0);
        let c2 = Coordinate::new(80.0, 45.0);
        assert_eq!(pole.bearing_to_deg(&c2), 180.0);
        assert!(!pole.bearing_to(&c2).is_nan());
    }

    #[test]
    fn test_coordinate_at() {
        let c1 = Coordinate::new(0.0, 151.0);
        let c2 = c1.coordinate_at(120.0, 60.0);
        assert!(is_between(c2.latitude, 0.99, 1.01));
        assert!(is_between(c2.longitude, 152.72, 152.74));

        let c1 = Coordinate::new(-34.0, 151.0);
        let c2 = c1.coordinate_at(120.0, 120.0);
        assert!(is_between(c2.latitude, -34.99, -34.97));
        assert!(is_between(c2.longitude, 153.10, 153.12));
    }

    #[test]
    fn test_intersection() {
        // Radial 090 from a point on the equator crossing radial 000 from a point further east
        let p1 = Coordinate::new(0.0, 10.0);
        let p2 = Coordinate::new(-5.0, 12.0);
        let x = Coordinate::intersection(&p1, 90.0, &p2, 0.0).unwrap();
        assert!(is_between(x.latitude, -0.01, 0.01));
        assert!(is_between(x.longitude, 11.99, 12.01));

        // Diverging courses never meet in front of both points
        let x = Coordinate::intersection(&p1, 270.0, &p2, 90.0);
        assert!(x.is_none());
    }

    #[test]
    fn test_course_difference() {
        assert_eq!(course_difference(10.0, 350.0), 20.0);
        assert_eq!(course_difference(350.0, 10.0), 20.0);
        assert_eq!(course_difference(90.0, 270.0), 180.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
    }

    fn is_between(variable: f64, bottom: f64, top: f64) -> bool {
        let result = variable >= bottom && variable <= top;
        if !result {
            println!("Variable {} not between {} and {}", variable, bottom, top);
        }
        result
    }
}
