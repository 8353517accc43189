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

use log::debug;

use crate::model::procedure::{Procedure, ProcedureType};
use crate::model::restrictions::Restrictions;

use super::waypoint_codec::decode_waypoint;

/// Reader for the line based procedure file covering all airports:
///
/// ```text
/// A|LOWG
/// S|ETVI1C|17C,35C
/// W|ETVIS|47.4|15.3|/5000A|INT
/// T|NIBAG
/// W|NIBAG|47.5|14.8||INT
/// ```
///
/// `S` SID, `R` STAR, `P` approach, `T` transition of the last S/R/P, `W` waypoint.
pub struct ProcedureParser {
    current: Option<Procedure>,
    transition: Option<Procedure>,
}

impl ProcedureParser {
    pub fn new() -> Self {
        Self {
            current: None,
            transition: None,
        }
    }

    /// Byte offset of every `A|` line, keyed by airport id.
    pub fn index_airports(&mut self, reader: &mut dyn BufRead) -> Result<HashMap<String, u64>, String> {
        let mut offsets = HashMap::new();
        let mut offset: u64 = 0;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let bytes = reader.read_until(b'\n', &mut buf).map_err(|e| e.to_string())?;
            if bytes == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if let Some(id) = line.trim().strip_prefix("A|") {
                offsets.insert(id.trim().to_string(), offset);
            }
            offset += bytes as u64;
        }
        debug!("Indexed procedures of {} airports", offsets.len());
        Ok(offsets)
    }

    /// Read the procedures of `airport`. The reader must be positioned at its `A|` line.
    pub fn load_procedures(&mut self, airport: &str, reader: &mut dyn BufRead) -> Result<Vec<Procedure>, String> {
        self.current = None;
        self.transition = None;
        let mut procedures = Vec::new();
        let mut started = false;

        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| e.to_string())?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('|').collect();
            let err = |e: String| format!("procedures of {} line {}: {}", airport, i + 1, e);
            match fields[0] {
                "A" if !started => {
                    let id = fields.get(1).map(|f| f.trim()).unwrap_or("");
                    if id != airport {
                        return Err(err(format!("expected airport {}, found {}", airport, id)));
                    }
                    started = true;
                }
                "A" => break,
                _ if !started => return Err(err("procedures must start with an airport line".to_string())),
                "S" => self.start(ProcedureType::Sid, &fields, airport, &mut procedures),
                "R" => self.start(ProcedureType::Star, &fields, airport, &mut procedures),
                "P" => self.start(ProcedureType::Approach, &fields, airport, &mut procedures),
                "T" => self.start_transition(&fields, airport).map_err(err)?,
                "W" => self.add_waypoint(&fields).map_err(err)?,
                other => return Err(err(format!("unknown record '{}'", other))),
            }
        }
        self.finish(&mut procedures);
        Ok(procedures)
    }

    fn start(&mut self, procedure_type: ProcedureType, fields: &[&str], airport: &str, procedures: &mut Vec<Procedure>) {
        self.finish(procedures);
        let name = fields.get(1).map(|f| f.trim()).unwrap_or("");
        let mut procedure = Procedure::new(procedure_type, name, airport);
        let runways = fields.get(2).map(|f| f.trim()).unwrap_or("");
        if !runways.eq_ignore_ascii_case("ALL") {
            for runway in runways.split(',').map(|r| r.trim()).filter(|r| !r.is_empty()) {
                procedure.add_runway(runway);
            }
        }
        self.current = Some(procedure);
    }

    fn start_transition(&mut self, fields: &[&str], airport: &str) -> Result<(), String> {
        self.finish_transition()?;
        if self.current.is_none() {
            return Err("transition outside of a procedure".to_string());
        }
        let name = fields.get(1).map(|f| f.trim()).unwrap_or("");
        self.transition = Some(Procedure::new(ProcedureType::Transition, name, airport));
        Ok(())
    }

    /// `W|ID|LAT|LON|RESTRICTION|TYPE[|type fields]`
    fn add_waypoint(&mut self, fields: &[&str]) -> Result<(), String> {
        if fields.len() < 4 {
            return Err(format!("expected at least 4 fields, found {}", fields.len()));
        }
        let field = |i: usize| fields.get(i).map(|f| f.trim()).unwrap_or("");
        let latitude = field(2)
            .parse::<f64>()
            .map_err(|_| format!("invalid latitude '{}'", field(2)))?;
        let longitude = field(3)
            .parse::<f64>()
            .map_err(|_| format!("invalid longitude '{}'", field(3)))?;
        let restrictions = Restrictions::parse(field(4))?;
        let extra = if fields.len() > 6 { &fields[6..] } else { &[] };
        let wpt = decode_waypoint(field(1), latitude, longitude, restrictions, field(5), extra)?;

        match (self.transition.as_mut(), self.current.as_mut()) {
            (Some(transition), _) => transition.append(wpt),
            (None, Some(procedure)) => procedure.append(wpt),
            (None, None) => return Err("waypoint outside of a procedure".to_string()),
        }
        Ok(())
    }

    fn finish_transition(&mut self) -> Result<(), String> {
        if let Some(transition) = self.transition.take() {
            if let Some(procedure) = self.current.as_mut() {
                procedure.add_transition(transition).map_err(|e| e.to_string())?;
            }
        }
        Ok(())
    }

    fn finish(&mut self, procedures: &mut Vec<Procedure>) {
        if let Err(e) = self.finish_transition() {
            debug!("{}", e);
        }
        if let Some(procedure) = self.current.take() {
            procedures.push(procedure);
        }
    }
}

impl Default for ProcedureParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor, Seek, SeekFrom};
    use std::{fs, path::PathBuf};

    use crate::model::procedure::ProcedureType;
    use crate::model::waypoint::WaypointKind;

    use super::ProcedureParser;

    fn fixture() -> BufReader<fs::File> {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("resources/test/procedures.txt");
        BufReader::new(fs::File::open(path).unwrap())
    }

    #[test]
    fn test_index_and_load() {
        let mut parser = ProcedureParser::new();
        let offsets = parser.index_airports(&mut fixture()).unwrap();
        assert_eq!(offsets.len(), 2);
        assert_eq!(offsets["LOWG"], 0);

        let mut reader = fixture();
        reader.seek(SeekFrom::Start(offsets["LOWI"])).unwrap();
        let procedures = parser.load_procedures("LOWI", &mut reader).unwrap();
        assert_eq!(procedures.len(), 2);

        let star = &procedures[0];
        assert_eq!(star.get_name(), "RTT1A");
        assert_eq!(star.get_type(), ProcedureType::Star);
        assert!(star.get_runways().is_empty());
        assert_eq!(star.len(), 2);
        assert_eq!(star.get_transitions().len(), 1);
        assert_eq!(star.get_transitions()[0].get_name(), "SBG");
        let rtt = star.get_waypoint(1).unwrap();
        assert!(matches!(rtt.get_kind(), WaypointKind::Vor(_)));
        assert_eq!(rtt.get_restrictions().get_speed_kts(), Some(250));

        let approach = &procedures[1];
        assert_eq!(approach.get_type(), ProcedureType::Approach);
        assert_eq!(approach.get_runway(), Some("08"));
        assert_eq!(approach.len(), 4);
        assert!(approach.get_waypoint(2).unwrap().as_runway().is_some());
        assert_eq!(approach.get_transition("RTT").unwrap().len(), 2);
    }

    #[test]
    fn test_stops_at_next_airport() {
        let mut parser = ProcedureParser::new();
        let procedures = parser.load_procedures("LOWG", &mut fixture()).unwrap();
        assert_eq!(procedures.len(), 2);
        let sid = &procedures[0];
        assert_eq!(sid.get_name(), "ETVI1C");
        assert!(sid.serves_runway("35C"));
        assert!(!sid.serves_runway("17C"));
        assert!(matches!(sid.get_waypoint(0).unwrap().get_kind(), WaypointKind::HdgToAlt { .. }));
        assert_eq!(sid.get_transition("NIBAG").unwrap().len(), 2);
    }

    #[test]
    fn test_errors() {
        let mut parser = ProcedureParser::new();
        let text = "A|LOWG\nW|ETVIS|47.4|15.3||INT\n";
        assert!(parser.load_procedures("LOWG", &mut Cursor::new(text)).is_err());
        let text = "A|LOWW\nS|X|ALL\n";
        assert!(parser.load_procedures("LOWG", &mut Cursor::new(text)).is_err());
        let text = "A|LOWG\nS|X|ALL\nW|ETVIS|north|15.3||INT\n";
        assert!(parser.load_procedures("LOWG", &mut Cursor::new(text)).is_err());
        let text = "A|LOWG\nS|X|ALL\nQ|what\n";
        assert!(parser.load_procedures("LOWG", &mut Cursor::new(text)).is_err());
    }
}
