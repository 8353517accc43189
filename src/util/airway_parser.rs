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

use std::collections::HashMap;
use std::io::BufRead;

use log::{info, warn};

use crate::earth::coordinate::Coordinate;
use crate::navdata::airway::{Airway, AirwayDirection, AirwayNode, AirwayNodeType, AirwaySegment};

use super::{next_line, read_header, token_number};

/// Reader for `awy.dat` 640 (segments with coordinates) and 11xx (segments naming
/// points by id, region and type, with a direction).
pub struct AirwayParserFG {
    version: u32,
}

impl AirwayParserFG {
    pub fn new() -> Self {
        Self { version: 0 }
    }

    pub fn load_airways(
        &mut self,
        airways: &mut HashMap<String, Airway>,
        reader: &mut dyn BufRead,
    ) -> Result<(), String> {
        self.version = read_header(reader)?;
        info!("Reading airways, awy.dat version {}", self.version);

        let mut buf = Vec::new();
        let mut line_number = 2;
        while let Some(line) = next_line(reader, &mut buf)? {
            line_number += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "99" {
                break;
            }
            let parsed = if self.version >= 1100 {
                Self::parse_segment_11xx(line)
            } else {
                Self::parse_segment_640(line)
            };
            match parsed {
                Ok((names, segment)) => {
                    // One segment may belong to several airways, `UL607-UM126`
                    for name in names.split('-').filter(|n| !n.is_empty()) {
                        airways
                            .entry(name.to_string())
                            .or_insert_with(|| Airway::new(name))
                            .add_segment(segment.clone());
                    }
                }
                Err(e) => warn!("awy.dat line {}: {}", line_number, e),
            }
        }
        Ok(())
    }

    fn parse_segment_640(line: &str) -> Result<(String, AirwaySegment), String> {
        let mut tokenizer = line.split_whitespace();
        let from = Self::parse_node_640(&mut tokenizer)?;
        let to = Self::parse_node_640(&mut tokenizer)?;
        let high = token_number::<i32>(tokenizer.next(), "high/low")? == 2;
        let base = token_number::<i32>(tokenizer.next(), "base")?;
        let top = token_number::<i32>(tokenizer.next(), "top")?;
        let names = tokenizer.next().ok_or("missing airway name")?;
        Ok((
            names.to_string(),
            AirwaySegment::new(from, to, AirwayDirection::Both, high, base, top),
        ))
    }

    fn parse_node_640<'a>(tokenizer: &mut impl Iterator<Item = &'a str>) -> Result<AirwayNode, String> {
        let id = tokenizer.next().ok_or("missing point id")?;
        let latitude = token_number::<f64>(tokenizer.next(), "latitude")?;
        let longitude = token_number::<f64>(tokenizer.next(), "longitude")?;
        Ok(AirwayNode::new(id, "", None, Some(Coordinate::new(latitude, longitude))))
    }

    fn parse_segment_11xx(line: &str) -> Result<(String, AirwaySegment), String> {
        let mut tokenizer = line.split_whitespace();
        let from = Self::parse_node_11xx(&mut tokenizer)?;
        let to = Self::parse_node_11xx(&mut tokenizer)?;
        let direction_code = tokenizer.next().ok_or("missing direction")?;
        let direction = AirwayDirection::from_code(direction_code)
            .ok_or(format!("invalid direction '{}'", direction_code))?;
        let high = token_number::<i32>(tokenizer.next(), "high/low")? == 2;
        let base = token_number::<i32>(tokenizer.next(), "base")?;
        let top = token_number::<i32>(tokenizer.next(), "top")?;
        let names = tokenizer.next().ok_or("missing airway name")?;
        Ok((
            names.to_string(),
            AirwaySegment::new(from, to, direction, high, base, top),
        ))
    }

    fn parse_node_11xx<'a>(tokenizer: &mut impl Iterator<Item = &'a str>) -> Result<AirwayNode, String> {
        let id = tokenizer.next().ok_or("missing point id")?;
        let region = tokenizer.next().ok_or("missing region")?;
        let type_code = tokenizer.next().ok_or("missing point type")?;
        let node_type =
            AirwayNodeType::from_code(type_code).ok_or(format!("invalid point type '{}'", type_code))?;
        Ok(AirwayNode::new(id, region, Some(node_type), None))
    }
}

impl Default for AirwayParserFG {
    fn default() -> Self {
        Self::new()
    }
}
