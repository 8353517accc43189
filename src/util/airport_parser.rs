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

use std::io::BufRead;

use log::{info, warn};

use crate::earth::coordinate::Coordinate;
use crate::earth::FEET_PER_NM;
use crate::model::airport::Airport;
use crate::model::location::Location;
use crate::model::runway::Runway;

use super::{next_line, read_header, token_number};

const METRES_TO_FEET: f64 = 3.28084;

/// Reader for the X-Plane/FlightGear `apt.dat` formats 850 and 1000.
/// Only airport (1), land runway (100) and region (1302) rows are used.
pub struct AirportParserFG {
    version: u32,
}

struct RunwayEnd {
    number: String,
    latitude: f64,
    longitude: f64,
}

struct PendingAirport {
    airport: Airport,
    longest: f64,
}

impl AirportParserFG {
    pub fn new() -> Self {
        Self { version: 0 }
    }

    pub fn get_version(&self) -> u32 {
        self.version
    }

    pub fn load_airports(
        &mut self,
        airports: &mut Vec<Airport>,
        reader: &mut dyn BufRead,
    ) -> Result<(), String> {
        self.version = read_header(reader)?;
        info!("Reading airports, apt.dat version {}", self.version);

        let mut buf = Vec::new();
        let mut current: Option<PendingAirport> = None;
        let mut line_number = 2;
        while let Some(line) = next_line(reader, &mut buf)? {
            line_number += 1;
            let mut tokenizer = line.split_whitespace();
            let r_type = tokenizer.next().unwrap_or("");
            match r_type {
                "1" | "16" | "17" => {
                    if let Some(pending) = current.take() {
                        airports.push(pending.airport);
                    }
                    // Sea and heliports are skipped, their runways can not be flown by the FMC
                    if r_type == "1" {
                        current = Self::parse_airport(&mut tokenizer)
                            .map_err(|e| warn!("apt.dat line {}: {}", line_number, e))
                            .ok();
                    }
                }
                "100" => {
                    if let Some(pending) = current.as_mut() {
                        if let Err(e) = Self::parse_runway(pending, &mut tokenizer) {
                            warn!("apt.dat line {}: {}", line_number, e);
                        }
                    }
                }
                "1302" => {
                    if let Some(pending) = current.as_mut() {
                        if tokenizer.next() == Some("region_code") {
                            if let Some(region) = tokenizer.next() {
                                pending.airport.set_region(region);
                            }
                        }
                    }
                }
                "99" => break,
                _ => (),
            }
        }
        if let Some(pending) = current.take() {
            airports.push(pending.airport);
        }
        Ok(())
    }

    fn parse_airport<'a>(tokenizer: &mut impl Iterator<Item = &'a str>) -> Result<PendingAirport, String> {
        let elevation = token_number::<f64>(tokenizer.next(), "elevation")?;
        tokenizer.next(); // tower
        tokenizer.next(); // default buildings
        let id = tokenizer.next().ok_or("missing airport id")?;
        let name = tokenizer.collect::<Vec<&str>>().join(" ");
        Ok(PendingAirport {
            airport: Airport::new(id.to_string(), 0.0, 0.0, elevation.round() as i32, name),
            longest: 0.0,
        })
    }

    fn parse_runway<'a>(
        pending: &mut PendingAirport,
        tokenizer: &mut impl Iterator<Item = &'a str>,
    ) -> Result<(), String> {
        let width = token_number::<f64>(tokenizer.next(), "runway width")?;
        // surface, shoulder, smoothness, centre lights, edge lights, distance signs
        let mut tokenizer = tokenizer.skip(6);
        let end1 = Self::parse_runway_end(&mut tokenizer)?;
        let end2 = Self::parse_runway_end(&mut tokenizer)?;

        let c1 = Coordinate::new(end1.latitude, end1.longitude);
        let c2 = Coordinate::new(end2.latitude, end2.longitude);
        let length_nm = c1.distance_to(&c2);
        let length = (length_nm * FEET_PER_NM).round() as i32;
        let width = (width * METRES_TO_FEET).round() as i32;
        let elevation = pending.airport.get_elevation();

        pending.airport.add_runway(Runway::new(
            &end1.number,
            end1.latitude,
            end1.longitude,
            c1.bearing_to_deg(&c2),
            length,
            width,
            elevation,
        ));
        pending.airport.add_runway(Runway::new(
            &end2.number,
            end2.latitude,
            end2.longitude,
            c2.bearing_to_deg(&c1),
            length,
            width,
            elevation,
        ));

        // The reference point is the middle of the longest runway
        if length_nm > pending.longest {
            pending.longest = length_nm;
            pending.airport.set_coordinate(
                (end1.latitude + end2.latitude) / 2.0,
                (end1.longitude + end2.longitude) / 2.0,
            );
        }
        Ok(())
    }

    fn parse_runway_end<'a>(tokenizer: &mut impl Iterator<Item = &'a str>) -> Result<RunwayEnd, String> {
        let number = tokenizer.next().ok_or("missing runway number")?.to_string();
        let latitude = token_number::<f64>(tokenizer.next(), "runway latitude")?;
        let longitude = token_number::<f64>(tokenizer.next(), "runway longitude")?;
        // displaced threshold, overrun, markings, approach lights, TDZ, REIL
        for _ in 0..6 {
            tokenizer.next();
        }
        Ok(RunwayEnd {
            number,
            latitude,
            longitude,
        })
    }
}

impl Default for AirportParserFG {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::BufReader, path::PathBuf};

    use crate::model::airport::Airport;
    use crate::model::location::Location;

    use super::AirportParserFG;

    #[test]
    fn test_parse() {
        let mut airports: Vec<Airport> = Vec::new();

        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("resources/test/airports.dat");
        let file = fs::File::open(path);

        match file {
            Ok(f) => {
                let mut parser = AirportParserFG::new();
                let mut reader = BufReader::new(f);
                match parser.load_airports(&mut airports, &mut reader) {
                    Ok(()) => (),
                    Err(msg) => panic! {"{}", msg},
                }
                assert_eq!(parser.get_version(), 1000);
            }
            Err(e) => panic!("Unable to open test airport data {}", e),
        }

        assert_eq!(airports.len(), 3);
        let graz = &airports[0];
        assert_eq!(graz.get_id(), "LOWG");
        assert_eq!(graz.get_name(), "Graz");
        assert_eq!(graz.get_region(), "LO");
        assert_eq!(graz.get_elevation(), 1115);
        assert_eq!(graz.get_runway_count(), 2);

        let rwy = graz.get_runway("35C").unwrap();
        assert!((rwy.get_heading() - 353.0).abs() < 2.0);
        let opposite = graz.get_runway("17C").unwrap();
        assert!((opposite.get_heading() - 173.0).abs() < 2.0);
        assert!(rwy.get_length() > 9000 && rwy.get_length() < 10000);

        // Reference point is the middle of the runway
        assert!((graz.get_lat() - 46.9913).abs() < 0.001);

        // The seaplane base is skipped
        assert!(airports.iter().all(|a| a.get_id() != "LOSB"));
    }
}
