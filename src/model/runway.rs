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

use super::navaid::Navaid;

/// One landing direction of a runway, located at its threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Runway {
    number: String,
    threshold: Coordinate,
    heading: f64,
    length: i32,
    width: i32,
    elevation: i32,
    ils: Option<Navaid>,
}

impl Runway {
    pub fn new(
        number: &str,
        lat: f64,
        long: f64,
        heading: f64,
        length: i32,
        width: i32,
        elevation: i32,
    ) -> Self {
        Runway {
            number: normalize_runway_id(number),
            threshold: Coordinate::new(lat, long),
            heading,
            length,
            width,
            elevation,
            ils: None,
        }
    }

    pub fn get_number(&self) -> &str {
        &self.number
    }

    pub fn get_threshold(&self) -> &Coordinate {
        &self.threshold
    }

    /// True heading from this threshold towards the opposite one.
    pub fn get_heading(&self) -> f64 {
        self.heading
    }

    pub fn get_length(&self) -> i32 {
        self.length
    }

    pub fn get_width(&self) -> i32 {
        self.width
    }

    pub fn get_elevation(&self) -> i32 {
        self.elevation
    }

    pub fn get_ils(&self) -> Option<&Navaid> {
        self.ils.as_ref()
    }

    pub fn set_ils(&mut self, ils: Navaid) {
        self.ils = Some(ils);
    }

    pub fn get_opposite_number(&self) -> String {
        Self::get_opp_num(&self.number)
    }

    fn get_opp_num(number: &str) -> String {
        match number {
            "N" => "S".to_string(),
            "S" => "N".to_string(),
            "E" => "W".to_string(),
            "W" => "E".to_string(),
            _ => {
                let heading_part = match number.find(|c: char| !c.is_ascii_digit()) {
                    Some(idx) => &number[..idx],
                    None => number,
                };

                let extra_part = if number.ends_with('R') {
                    "L"
                } else if number.ends_with('L') {
                    "R"
                } else if number.ends_with('C') {
                    "C"
                } else {
                    ""
                };

                let x = heading_part.parse::<i32>().unwrap_or(0);
                let opposite_heading = if x <= 18 { x + 18 } else { x - 18 };
                format!("{:02}{}", opposite_heading, extra_part)
            }
        }
    }
}

/// Canonical runway designator: upper case, no `RW`/`RWY` prefix, two digit number.
pub fn normalize_runway_id(id: &str) -> String {
    let id = id.trim().to_uppercase();
    let id = id
        .strip_prefix("RWY")
        .or_else(|| id.strip_prefix("RW"))
        .unwrap_or(&id);
    let digits = id.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 1 {
        format!("0{}", id)
    } else {
        id.to_string()
    }
}
