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

// Filters used by the navdata queries: range and region

use crate::earth::coordinate::Coordinate;
use crate::model::location::Location;

pub trait Filter {
    fn filter(&self, location: &dyn Location) -> bool;
}

pub struct RangeFilter {
    this: Coordinate,
    range: f64,
    rough_lat_sep: f64,
    rough_long_sep: f64,
}

impl RangeFilter {
    pub fn new(lat: f64, lon: f64, range: f64) -> Option<Self> {
        if !range.is_finite() || range < 0.0 {
            return None;
        }
        // Cheap box test first, exact distance only for the survivors
        let rough_lat_sep = range / 60.0;
        let x = lat.to_radians().cos();
        let rough_long_sep = if x < 0.01 { 181.0 } else { range / (60.0 * x) };

        Some(Self {
            this: Coordinate::new(lat, lon),
            range,
            rough_lat_sep,
            rough_long_sep,
        })
    }

    pub fn get_centre(&self) -> &Coordinate {
        &self.this
    }

    pub fn get_range(&self) -> f64 {
        self.range
    }
}

impl Filter for RangeFilter {
    // returns true if the coordinate passes the filter
    fn filter(&self, location: &dyn Location) -> bool {
        let other = location.get_loc();
        let long_sep = (self.this.get_longitude() - other.get_longitude()).abs();
        let long_sep = long_sep.min(360.0 - long_sep);
        if ((self.this.get_latitude() - other.get_latitude()).abs() < self.rough_lat_sep)
            & (long_sep < self.rough_long_sep)
        {
            self.this.distance_to(other) < self.range
        } else {
            false
        }
    }
}

/// Matches the ICAO region (country code) of the location. An empty term matches everything.
pub struct RegionFilter {
    region: String,
}

impl RegionFilter {
    pub fn new(region: &str) -> Self {
        Self {
            region: region.trim().to_uppercase(),
        }
    }

    pub fn matches(&self, region: &str) -> bool {
        self.region.is_empty() || self.region.eq_ignore_ascii_case(region)
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, RangeFilter, RegionFilter};
    use crate::model::fix::Fix;

    #[test]
    fn test_range_filter() {
        let filter = RangeFilter::new(47.0, 15.0, 30.0).unwrap();
        let near = Fix::new("NEAR".to_string(), 47.2, 15.2);
        let far = Fix::new("FAR".to_string(), 48.0, 15.0);
        assert!(filter.filter(&near));
        assert!(!filter.filter(&far));
        assert!(RangeFilter::new(47.0, 15.0, -1.0).is_none());
    }

    #[test]
    fn test_range_filter_dateline() {
        let filter = RangeFilter::new(0.0, 179.9, 30.0).unwrap();
        let across = Fix::new("XDL".to_string(), 0.0, -179.9);
        assert!(filter.filter(&across));
    }

    #[test]
    fn test_region() {
        assert!(RegionFilter::new("").matches("LO"));
        assert!(RegionFilter::new("lo").matches("LO"));
        assert!(!RegionFilter::new("ED").matches("LO"));
    }
}
