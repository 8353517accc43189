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

use crate::earth::coordinate::Coordinate;

/// Converts geographic positions into the flat x/y space used by route displays.
pub trait Projection {
    fn convert_lat_lon_to_xy(&self, coordinate: &Coordinate) -> (f64, f64);
}

/// Orthographic projection of the earth sphere onto the plane tangent at `centre`.
/// x grows east and y grows north, both in nautical miles times `scale`.
pub struct SphericalProjector {
    r: f64,
    centre: Coordinate,
}

impl SphericalProjector {
    pub fn new(centre: Coordinate, scale: f64) -> Self {
        Self {
            r: Coordinate::EARTH_RADIUS * scale,
            centre,
        }
    }

    pub fn project(&self, lat: f64, lon: f64) -> [f64; 2] {
        let lat1 = lat.to_radians();
        let d_lon = (lon - self.centre.get_longitude()).to_radians();
        let lat0 = self.centre.get_latitude().to_radians();

        let x = self.r * lat1.cos() * d_lon.sin();
        let y = self.r * (lat0.cos() * lat1.sin() - lat0.sin() * lat1.cos() * d_lon.cos());
        [x, y]
    }

    pub fn un_project(&self, x: f64, y: f64) -> Result<[f64; 2], String> {
        let rho = (x * x + y * y).sqrt();
        if rho > self.r {
            return Err("Not in map".to_string());
        }
        let lat0 = self.centre.get_latitude().to_radians();
        let lon0 = self.centre.get_longitude().to_radians();
        if rho == 0.0 {
            return Ok([self.centre.get_latitude(), self.centre.get_longitude()]);
        }
        let c = (rho / self.r).asin();
        let lat = (c.cos() * lat0.sin() + y * c.sin() * lat0.cos() / rho).asin();
        let lon = lon0 + (x * c.sin()).atan2(rho * c.cos() * lat0.cos() - y * c.sin() * lat0.sin());
        if lat.is_nan() || lon.is_nan() {
            Err("Not in map".to_string())
        } else {
            Ok([lat.to_degrees(), lon.to_degrees()])
        }
    }
}

impl Projection for SphericalProjector {
    fn convert_lat_lon_to_xy(&self, coordinate: &Coordinate) -> (f64, f64) {
        let p = self.project(coordinate.get_latitude(), coordinate.get_longitude());
        (p[0], p[1])
    }
}
