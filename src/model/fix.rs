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

#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    id: String,
    coordinate: Coordinate,
    region: String,
    terminal: Option<String>,
}

impl Fix {
    pub fn new(id: String, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            coordinate: Coordinate::new(latitude, longitude),
            region: String::new(),
            terminal: None,
        }
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    /// Terminal fixes belong to one airport, `ENRT` marks an en-route fix.
    pub fn with_terminal(mut self, terminal: &str) -> Self {
        if terminal != "ENRT" && !terminal.is_empty() {
            self.terminal = Some(terminal.to_string());
        }
        self
    }

    pub fn get_region(&self) -> &str {
        &self.region
    }

    pub fn get_terminal(&self) -> Option<&str> {
        self.terminal.as_deref()
    }
}

impl Location for Fix {
    fn get_id(&self) -> &str {
        self.id.as_str()
    }

    fn get_name(&self) -> &str {
        ""
    }

    fn get_loc(&self) -> &Coordinate {
        &self.coordinate
    }
}
