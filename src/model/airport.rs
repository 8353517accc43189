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

use std::collections::BTreeMap;

use crate::earth::coordinate::Coordinate;
use crate::error::{Result, RouteError};

use super::location::Location;
use super::runway::{Runway, normalize_runway_id};

#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    id: String,
    name: String,
    reference: Coordinate,
    coordinate: Coordinate,
    elevation: i32,
    region: String,
    runways: BTreeMap<String, Runway>,
    active_runway: Option<String>,
}

impl Airport {
    pub fn new(id: String, latitude: f64, longitude: f64, elevation: i32, name: String) -> Self {
        let coordinate = Coordinate::new(latitude, longitude);
        Self {
            id,
            name,
            reference: coordinate,
            coordinate,
            elevation,
            region: String::new(),
            runways: BTreeMap::new(),
            active_runway: None,
        }
    }

    pub fn add_runway(&mut self, runway: Runway) {
        self.runways.insert(runway.get_number().to_string(), runway);
    }

    pub fn get_runway(&self, id: &str) -> Option<&Runway> {
        self.runways.get(&normalize_runway_id(id))
    }

    pub fn get_runway_mut(&mut self, id: &str) -> Option<&mut Runway> {
        self.runways.get_mut(&normalize_runway_id(id))
    }

    pub fn get_runways(&self) -> impl Iterator<Item = &Runway> {
        self.runways.values()
    }

    pub fn get_runway_count(&self) -> usize {
        self.runways.len()
    }

    pub fn get_longest_runway(&self) -> Option<&Runway> {
        self.runways.values().max_by_key(|runway| runway.get_length())
    }

    /// Select the active runway. The airport position moves to the runway threshold.
    pub fn set_active_runway(&mut self, runway: Option<&str>) -> Result<()> {
        let id = match runway.map(normalize_runway_id) {
            Some(id) if !id.is_empty() => id,
            _ => {
                self.active_runway = None;
                self.coordinate = self.reference;
                return Ok(());
            }
        };

        match self.runways.get(&id) {
            Some(rwy) => {
                self.coordinate = *rwy.get_threshold();
                self.active_runway = Some(id);
                Ok(())
            }
            None => Err(RouteError::UnknownRunway {
                airport: self.id.clone(),
                runway: id,
            }),
        }
    }

    /// Runway id read back from a route file. An airport without runway data only records
    /// the id until a navdata scan replaces it; otherwise the runway must exist.
    pub fn restore_active_runway(&mut self, runway: &str) -> Result<()> {
        if !self.runways.is_empty() {
            return self.set_active_runway(Some(runway));
        }
        let id = normalize_runway_id(runway);
        self.active_runway = if id.is_empty() { None } else { Some(id) };
        Ok(())
    }

    pub fn get_active_runway_id(&self) -> Option<&str> {
        self.active_runway.as_deref()
    }

    pub fn get_active_runway(&self) -> Option<&Runway> {
        self.active_runway
            .as_ref()
            .and_then(|id| self.runways.get(id))
    }

    pub fn has_runway(&self, id: &str) -> bool {
        self.get_runway(id).is_some()
    }

    pub fn get_reference_point(&self) -> &Coordinate {
        &self.reference
    }

    pub fn get_region(&self) -> &str {
        &self.region
    }

    pub fn set_region(&mut self, region: &str) {
        self.region = region.to_string();
    }

    pub fn set_coordinate(&mut self, latitude: f64, longitude: f64) {
        self.reference = Coordinate::new(latitude, longitude);
        self.coordinate = self.reference;
    }
}

impl Location for Airport {
    fn get_id(&self) -> &str {
        self.id.as_str()
    }

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_loc(&self) -> &Coordinate {
        &self.coordinate
    }

    fn get_elevation(&self) -> i32 {
        self.elevation
    }
}

#[cfg(test)]
mod tests {
    use super::Airport;
    use crate::error::RouteError;
    use crate::model::location::Location;
    use crate::model::test_utils::make_airport;

    #[test]
    fn test_active_runway_moves_position() {
        let mut airport = make_airport("LOWG");
        let reference = *airport.get_loc();

        airport.set_active_runway(Some("RWY35C")).unwrap();
        assert_eq!(airport.get_active_runway_id(), Some("35C"));
        assert_eq!(
            airport.get_loc(),
            airport.get_runway("35C").unwrap().get_threshold()
        );

        airport.set_active_runway(None).unwrap();
        assert_eq!(airport.get_active_runway_id(), None);
        assert_eq!(*airport.get_loc(), reference);
    }

    #[test]
    fn test_unknown_runway() {
        let mut airport = make_airport("LOWG");
        airport.set_active_runway(Some("17C")).unwrap();
        let result = airport.set_active_runway(Some("09"));
        assert!(matches!(result, Err(RouteError::UnknownRunway { .. })));
        assert_eq!(airport.get_active_runway_id(), Some("17C"));
    }

    #[test]
    fn test_runway_less_airport() {
        let mut airport = Airport::new("LOWG".to_string(), 46.9911, 15.4396, 1360, "Graz".to_string());
        assert!(!airport.has_runway("35C"));
        let result = airport.set_active_runway(Some("35C"));
        assert!(matches!(result, Err(RouteError::UnknownRunway { .. })));
        assert_eq!(airport.get_active_runway_id(), None);

        airport.restore_active_runway("RWY35C").unwrap();
        assert_eq!(airport.get_active_runway_id(), Some("35C"));
        assert!(make_airport("LOWG").restore_active_runway("09").is_err());
    }

    #[test]
    fn test_longest_runway() {
        let airport = make_airport("LOWG");
        assert_eq!(airport.get_runway_count(), 2);
        assert_eq!(airport.get_longest_runway().unwrap().get_length(), 9842);
    }
}
