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

use crate::model::navaid::{Navaid, NavaidType};

use super::{next_line, read_header, token_number};

/// A localizer row, to be attached to the runway it serves.
#[derive(Debug, Clone)]
pub struct IlsEntry {
    pub airport: String,
    pub runway: String,
    pub localizer: Navaid,
}

/// Reader for `nav.dat` 810 and 11xx. NDB, VOR and localizer rows are kept; DME rows are skipped.
pub struct NavaidParserFG {
    version: u32,
}

impl NavaidParserFG {
    pub fn new() -> Self {
        Self { version: 0 }
    }

    pub fn load_navaids(
        &mut self,
        navaids: &mut Vec<Navaid>,
        ils: &mut Vec<IlsEntry>,
        reader: &mut dyn BufRead,
    ) -> Result<(), String> {
        self.version = read_header(reader)?;
        info!("Reading navaids, nav.dat version {}", self.version);

        let mut buf = Vec::new();
        let mut line_number = 2;
        while let Some(line) = next_line(reader, &mut buf)? {
            line_number += 1;
            let mut tokenizer = line.split_whitespace();
            let r_type = tokenizer.next().unwrap_or("");
            let result = match r_type {
                "2" | "3" => self.parse_navaid(r_type, &mut tokenizer).map(|n| navaids.push(n)),
                "4" | "5" => self.parse_localizer(&mut tokenizer).map(|l| ils.push(l)),
                "99" => break,
                _ => Ok(()),
            };
            if let Err(e) = result {
                warn!("nav.dat line {}: {}", line_number, e);
            }
        }
        Ok(())
    }

    fn is_11xx(&self) -> bool {
        self.version >= 1100
    }

    fn parse_navaid<'a>(
        &self,
        r_type: &str,
        tokenizer: &mut impl Iterator<Item = &'a str>,
    ) -> Result<Navaid, String> {
        let navaid_type = NavaidType::type_for(r_type).ok_or("unknown navaid type")?;
        let latitude = token_number::<f64>(tokenizer.next(), "latitude")?;
        let longitude = token_number::<f64>(tokenizer.next(), "longitude")?;
        let elevation = token_number::<i32>(tokenizer.next(), "elevation")?;
        let mut frequency = token_number::<f64>(tokenizer.next(), "frequency")?;
        if navaid_type == NavaidType::Vor {
            frequency /= 100.;
        }
        let range = token_number::<i32>(tokenizer.next(), "range")?;
        tokenizer.next(); // slaved variation
        let id = tokenizer.next().ok_or("missing id")?;
        let mut region = "";
        if self.is_11xx() {
            tokenizer.next(); // terminal region, ENRT for en-route navaids
            region = tokenizer.next().unwrap_or("");
        }
        let name = tokenizer.collect::<Vec<&str>>().join(" ");

        Ok(Navaid::new(
            id.to_string(),
            navaid_type,
            latitude,
            longitude,
            elevation,
            frequency,
            range,
            name,
        )
        .with_region(region))
    }

    fn parse_localizer<'a>(&self, tokenizer: &mut impl Iterator<Item = &'a str>) -> Result<IlsEntry, String> {
        let latitude = token_number::<f64>(tokenizer.next(), "latitude")?;
        let longitude = token_number::<f64>(tokenizer.next(), "longitude")?;
        let elevation = token_number::<i32>(tokenizer.next(), "elevation")?;
        let frequency = token_number::<f64>(tokenizer.next(), "frequency")? / 100.0;
        let range = token_number::<i32>(tokenizer.next(), "range")?;
        // 11xx prefixes the true course with the magnetic one times 360
        let course = token_number::<f64>(tokenizer.next(), "course")?.rem_euclid(360.0);
        let id = tokenizer.next().ok_or("missing id")?;
        let airport = tokenizer.next().ok_or("missing airport")?;
        let mut region = "";
        if self.is_11xx() {
            region = tokenizer.next().unwrap_or("");
        }
        let runway = tokenizer.next().ok_or("missing runway")?;
        let name = tokenizer.collect::<Vec<&str>>().join(" ");

        let localizer = Navaid::new(
            id.to_string(),
            NavaidType::Ils,
            latitude,
            longitude,
            elevation,
            frequency,
            range,
            name,
        )
        .with_region(region)
        .with_course(course);

        Ok(IlsEntry {
            airport: airport.to_string(),
            runway: runway.to_string(),
            localizer,
        })
    }
}

impl Default for NavaidParserFG {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::BufReader, path::PathBuf};

    use flate2::read;

    use crate::model::location::Location;
    use crate::model::navaid::{Navaid, NavaidType};

    use super::{IlsEntry, NavaidParserFG};

    #[test]
    fn test_parse() {
        let mut navaids: Vec<Navaid> = Vec::new();
        let mut ils: Vec<IlsEntry> = Vec::new();

        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("resources/test/navaids.dat");
        let file = fs::File::open(path);

        match file {
            Ok(input) => {
                let mut parser = NavaidParserFG::new();
                let mut reader = BufReader::new(input);
                match parser.load_navaids(&mut navaids, &mut ils, &mut reader) {
                    Ok(()) => (),
                    Err(msg) => panic! {"{}", msg},
                }
            }
            Err(e) => panic!("Unable to open test navaid data {}", e),
        }

        assert_eq!(navaids.len(), 5);
        assert_eq!(navaids[0].get_id(), "GRZ");
        assert_eq!(navaids[0].get_type(), NavaidType::Vor);
        assert!((navaids[0].get_freq() - 116.6).abs() < 0.001);
        assert_eq!(navaids[0].get_name(), "GRAZ VOR-DME");
        match navaids[1].get_type() {
            NavaidType::Ndb => (),
            _ => panic!("navaid type is not NDB"),
        }

        assert_eq!(ils.len(), 1);
        assert_eq!(ils[0].airport, "LOWI");
        assert_eq!(ils[0].runway, "26");
        assert_eq!(ils[0].localizer.get_course(), Some(263.0));
    }

    #[test]
    fn test_parse_11xx_gz() {
        let mut navaids: Vec<Navaid> = Vec::new();
        let mut ils: Vec<IlsEntry> = Vec::new();

        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("resources/test/navaids_1150.dat.gz");
        let input = fs::File::open(path).unwrap();
        let mut reader = BufReader::new(read::GzDecoder::new(input));
        let mut parser = NavaidParserFG::new();
        parser.load_navaids(&mut navaids, &mut ils, &mut reader).unwrap();

        assert_eq!(navaids.len(), 2);
        assert_eq!(navaids[0].get_id(), "GRZ");
        assert_eq!(navaids[0].get_region(), "LO");
        assert_eq!(navaids[0].get_name(), "GRAZ VOR-DME");
        assert_eq!(ils.len(), 1);
        assert_eq!(ils[0].runway, "26");
        assert_eq!(ils[0].localizer.get_region(), "LO");
        assert!((ils[0].localizer.get_course().unwrap() - 263.0).abs() < 0.001);
    }
}
