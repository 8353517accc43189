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

use super::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavaidType {
    Vor,
    Ndb,
    Dme,
    Ils,
}

impl NavaidType {
    /// Row code of the nav.dat formats.
    pub fn type_for(navaid_type: &str) -> Option<NavaidType> {
        match navaid_type {
            "2" => Some(NavaidType::Ndb),
            "3" => Some(NavaidType::Vor),
            "4" | "5" => Some(NavaidType::Ils),
            "12" | "13" => Some(NavaidType::Dme),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Navaid {
    id: String,
    type_: NavaidType,
    coordinate: Coordinate,
    name: String,
    elevation: i32,
    freq: f64,
    range: i32,
    region: String,
    course: Option<f64>,
}

impl Navaid {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        type_: NavaidType,
        latitude: f64,
        longitude: f64,
        elevation: i32,
        freq: f64,
        range: i32,
        name: String,
    ) -> Self {
        Self {
            id,
            type_,
            coordinate: Coordinate::new(latitude, longitude),
            name,
            elevation,
            freq,
            range,
            region: String::new(),
            course: None,
        }
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    /// Localizer course in degrees true.
    pub fn with_course(mut self, course: f64) -> Self {
        self.course = Some(course);
        self
    }

    pub fn get_type(&self) -> NavaidType {
        self.type_
    }

    pub fn get_freq(&self) -> f64 {
        self.freq
    }

    pub fn get_range(&self) -> i32 {
        self.range
    }

    pub fn get_region(&self) -> &str {
        &self.region
    }

    pub fn get_course(&self) -> Option<f64> {
        self.course
    }
}

impl Location for Navaid {
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
