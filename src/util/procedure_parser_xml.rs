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

use std::io::Read;
use std::sync::LazyLock;

use log::debug;
use regex_lite::Regex;
use xmltree::Element;

use crate::earth::coordinate::Coordinate;
use crate::model::holding::Holding;
use crate::model::procedure::{Procedure, ProcedureType};
use crate::model::restrictions::{AltitudeRestriction, AltitudeRestrictionKind, Restrictions, TurnDirection};
use crate::model::runway::Runway;
use crate::model::waypoint::{Waypoint, WaypointFlag};

/// Runway designator embedded in Level-D approach names, `ILS35C`, `RNV08-Y`.
static APPROACH_RUNWAY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Z]*?(\d{2}[LRC]?)").ok());

/// Element names of one procedure kind in the Level-D layout.
struct Layout {
    procedure_type: ProcedureType,
    waypoint: &'static str,
    transition: &'static str,
    transition_waypoint: &'static str,
}

const LAYOUTS: [(&str, Layout); 3] = [
    (
        "Sid",
        Layout {
            procedure_type: ProcedureType::Sid,
            waypoint: "Sid_Waypoint",
            transition: "Sid_Transition",
            transition_waypoint: "SidTr_Waypoint",
        },
    ),
    (
        "Star",
        Layout {
            procedure_type: ProcedureType::Star,
            waypoint: "Star_Waypoint",
            transition: "Star_Transition",
            transition_waypoint: "StarTr_Waypoint",
        },
    ),
    (
        "Approach",
        Layout {
            procedure_type: ProcedureType::Approach,
            waypoint: "App_Waypoint",
            transition: "App_Transition",
            transition_waypoint: "AppTr_Waypoint",
        },
    ),
];

/// Reader for Level-D style `<ICAO>.xml` procedure files.
pub struct ProcedureParserXml {}

impl ProcedureParserXml {
    pub fn new() -> Self {
        Self {}
    }

    pub fn load_procedures(&mut self, airport: &str, reader: impl Read) -> Result<Vec<Procedure>, String> {
        let doc = Element::parse(reader).map_err(|e| e.to_string())?;
        let airport_element = if doc.name == "Airport" {
            &doc
        } else {
            doc.get_child("Airport").ok_or("no Airport element")?
        };
        if let Some(id) = airport_element.attributes.get("ID") {
            if id != airport {
                return Err(format!("file describes {}, expected {}", id, airport));
            }
        }

        let mut procedures = Vec::new();
        for element in airport_element.children.iter().filter_map(|n| n.as_element()) {
            let Some((_, layout)) = LAYOUTS.iter().find(|(name, _)| *name == element.name) else {
                continue;
            };
            procedures.push(self.parse_procedure(airport, element, layout)?);
        }
        debug!("Read {} Level-D procedures for {}", procedures.len(), airport);
        Ok(procedures)
    }

    fn parse_procedure(&self, airport: &str, element: &Element, layout: &Layout) -> Result<Procedure, String> {
        let name = element
            .attributes
            .get("Name")
            .ok_or(format!("{} without a name", element.name))?;
        let mut procedure = Procedure::new(layout.procedure_type, name, airport);

        if layout.procedure_type == ProcedureType::Approach {
            if let Some(runway) = approach_runway(name) {
                procedure.add_runway(&runway);
            }
        } else if let Some(runways) = element.attributes.get("Runways") {
            if !runways.trim().eq_ignore_ascii_case("All") {
                for runway in runways.split(',').map(|r| r.trim()).filter(|r| !r.is_empty()) {
                    procedure.add_runway(runway);
                }
            }
        }

        let is_approach = layout.procedure_type == ProcedureType::Approach;
        let mut missed = false;
        for child in element.children.iter().filter_map(|n| n.as_element()) {
            if child.name == layout.waypoint {
                let Some(mut wpt) = parse_waypoint(child)? else {
                    continue;
                };
                if is_approach && missed {
                    wpt.set_flag(WaypointFlag::MissedApproach);
                }
                if is_approach && wpt.as_runway().is_some() {
                    missed = true;
                }
                add_waypoint(&mut procedure, wpt);
            } else if child.name == layout.transition {
                let t_name = child
                    .attributes
                    .get("Name")
                    .ok_or(format!("transition of {} without a name", name))?;
                let mut transition = Procedure::new(ProcedureType::Transition, t_name, airport);
                for t_child in child.children.iter().filter_map(|n| n.as_element()) {
                    if t_child.name == layout.transition_waypoint {
                        if let Some(wpt) = parse_waypoint(t_child)? {
                            add_waypoint(&mut transition, wpt);
                        }
                    }
                }
                procedure.add_transition(transition).map_err(|e| e.to_string())?;
            }
        }
        Ok(procedure)
    }
}

impl Default for ProcedureParserXml {
    fn default() -> Self {
        Self::new()
    }
}

fn approach_runway(name: &str) -> Option<String> {
    let regex = APPROACH_RUNWAY.as_ref()?;
    regex
        .captures(name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// A holding at the fix just added is attached to it rather than added again.
fn add_waypoint(procedure: &mut Procedure, wpt: Waypoint) {
    if let Some(holding) = wpt.get_holding() {
        let index = procedure.len().checked_sub(1);
        if let Some(index) = index {
            if procedure.get_waypoint(index).is_some_and(|last| *last == wpt) {
                let holding = holding.clone();
                procedure.modify_waypoint(index, |last| last.set_holding(holding));
                return;
            }
        }
    }
    procedure.append(wpt);
}

fn text(element: &Element, name: &str) -> String {
    element
        .get_child(name)
        .and_then(|c| c.get_text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

fn number(element: &Element, name: &str) -> Result<f64, String> {
    let value = text(element, name);
    if value.is_empty() {
        return Ok(0.0);
    }
    value
        .parse::<f64>()
        .map_err(|_| format!("invalid {} '{}'", name, value))
}

fn parse_waypoint(element: &Element) -> Result<Option<Waypoint>, String> {
    let name = text(element, "Name");
    let wpt_type = text(element, "Type");
    let latitude = number(element, "Latitude")?;
    let longitude = number(element, "Longitude")?;
    let has_position = latitude != 0.0 || longitude != 0.0;

    let mut wpt = match wpt_type.as_str() {
        "Normal" => Waypoint::new(&name, latitude, longitude),
        "Runway" => {
            let number = name.trim_start_matches("RW");
            let mut wpt = Waypoint::from_runway(Runway::new(number, latitude, longitude, 0.0, 0, 0, 0));
            wpt.set_id(&name);
            wpt
        }
        "ConstHdgtoAlt" => {
            let heading = number(element, "Hdg_Crs_value")?;
            let altitude = number(element, "Altitude")?.round() as i32;
            let mut wpt = Waypoint::hdg_to_alt(heading, altitude);
            if !name.is_empty() {
                wpt.set_id(&name);
            }
            wpt
        }
        "Intc" => {
            let heading = number(element, "Hdg_Crs_value")?;
            let radial = number(element, "RadialtoIntercept")?;
            let turn = turn_direction(&text(element, "Sp_Turn"));
            let mut wpt =
                Waypoint::hdg_to_intercept(heading, Coordinate::new(latitude, longitude), radial, turn);
            if !name.is_empty() {
                wpt.set_id(&name);
            }
            wpt
        }
        "Hold" => {
            let mut wpt = Waypoint::new(&name, latitude, longitude);
            wpt.set_holding(parse_holding(element)?);
            wpt
        }
        other if has_position && !name.is_empty() => {
            debug!("Level-D waypoint type {} of {} read as a plain waypoint", other, name);
            Waypoint::new(&name, latitude, longitude)
        }
        other => {
            debug!("Skipping Level-D waypoint {} of type {}", name, other);
            return Ok(None);
        }
    };
    wpt.set_restrictions(parse_restrictions(element)?);
    Ok(Some(wpt))
}

fn turn_direction(text: &str) -> TurnDirection {
    match text {
        "Left" => TurnDirection::Left,
        "Right" => TurnDirection::Right,
        _ => TurnDirection::Auto,
    }
}

fn parse_restrictions(element: &Element) -> Result<Restrictions, String> {
    let mut restrictions = Restrictions::new();
    let speed = number(element, "Speed")?;
    if speed > 0.0 {
        restrictions.set_speed_kts(Some(speed.round() as u32));
    }
    let altitude = number(element, "Altitude")?.round() as i32;
    if altitude > 0 {
        let kind = match text(element, "AltitudeRestriction").as_str() {
            "above" => AltitudeRestrictionKind::AtOrAbove,
            "below" => AltitudeRestrictionKind::AtOrBelow,
            _ => AltitudeRestrictionKind::At,
        };
        restrictions.set_altitude(Some(AltitudeRestriction::new(altitude, kind)));
    }
    restrictions.set_overfly(text(element, "Flytype") == "Fly-over");
    restrictions.set_turn(turn_direction(&text(element, "Sp_Turn")));
    Ok(restrictions)
}

fn parse_holding(element: &Element) -> Result<Holding, String> {
    let mut holding = Holding::new();
    let value = number(element, "Hld_Rad_value")?;
    // A holding may be given by the radial it lies on instead of its inbound track
    if text(element, "Hld_Rad_or_Inbd") == "Radial" {
        holding.set_inbound_track((value + 180.0).rem_euclid(360.0));
    } else {
        holding.set_inbound_track(value);
    }
    match text(element, "Hld_Turn").as_str() {
        "Left" => holding.set_left_turn(true),
        "Right" => holding.set_left_turn(false),
        _ => (),
    }
    let length = number(element, "Hld_td_value")?;
    if length > 0.0 {
        if text(element, "Hld_Time_or_Dist") == "Dist" {
            holding.set_leg_distance_nm(length);
        } else {
            holding.set_leg_time_min(length);
        }
    }
    Ok(holding)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use crate::model::procedure::ProcedureType;
    use crate::model::restrictions::AltitudeRestrictionKind;
    use crate::model::waypoint::{WaypointFlag, WaypointKind};

    use super::{ProcedureParserXml, approach_runway};

    fn load() -> Vec<crate::model::procedure::Procedure> {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("resources/test/procedures/LOWG.xml");
        let file = fs::File::open(path).unwrap();
        let mut parser = ProcedureParserXml::new();
        match parser.load_procedures("LOWG", file) {
            Ok(p) => p,
            Err(msg) => panic!("{}", msg),
        }
    }

    #[test]
    fn test_parse_sid() {
        let procedures = load();
        assert_eq!(procedures.len(), 3);
        let sid = &procedures[0];
        assert_eq!(sid.get_type(), ProcedureType::Sid);
        assert_eq!(sid.get_name(), "ETVI1C");
        assert!(sid.serves_runway("35C"));
        assert_eq!(sid.len(), 3);
        match sid.get_waypoint(0).unwrap().get_kind() {
            WaypointKind::HdgToAlt { heading, altitude_ft } => {
                assert_eq!(*heading, 353.0);
                assert_eq!(*altitude_ft, 2360);
            }
            _ => panic!("expected a heading to altitude leg"),
        }
        let etvis = sid.get_waypoint(2).unwrap();
        assert!(etvis.is_overfly());
        let alt = etvis.get_restrictions().get_altitude().unwrap();
        assert_eq!(alt.altitude_ft, 5000);
        assert_eq!(alt.kind, AltitudeRestrictionKind::AtOrAbove);
        assert_eq!(sid.get_transition("NIBAG").unwrap().len(), 2);
    }

    #[test]
    fn test_parse_star_with_holding() {
        let procedures = load();
        let star = &procedures[1];
        assert_eq!(star.get_type(), ProcedureType::Star);
        assert!(star.get_runways().is_empty());
        // The hold at GRZ1 is attached to the fix, not added twice
        assert_eq!(star.len(), 2);
        let holding = star.get_waypoint(1).unwrap().get_holding().unwrap();
        assert_eq!(holding.get_inbound_track(), 353.0);
        assert!(!holding.is_left_turn());
        assert_eq!(holding.get_leg_time_min(), Some(1.0));
        assert_eq!(star.get_waypoint(0).unwrap().get_restrictions().get_speed_kts(), Some(220));
    }

    #[test]
    fn test_parse_approach() {
        let procedures = load();
        let approach = &procedures[2];
        assert_eq!(approach.get_type(), ProcedureType::Approach);
        assert_eq!(approach.get_runway(), Some("35C"));
        assert_eq!(approach.len(), 4);
        assert!(approach.get_waypoint(2).unwrap().as_runway().is_some());
        assert_eq!(approach.get_waypoint(1).unwrap().get_flag(), WaypointFlag::None);
        assert_eq!(approach.get_waypoint(3).unwrap().get_flag(), WaypointFlag::MissedApproach);
        assert!(matches!(
            approach.get_waypoint(3).unwrap().get_kind(),
            WaypointKind::HdgToIntercept { .. }
        ));
        assert_eq!(approach.get_transitions().len(), 1);
    }

    #[test]
    fn test_approach_runway() {
        assert_eq!(approach_runway("ILS35C"), Some("35C".to_string()));
        assert_eq!(approach_runway("RNV08-Y"), Some("08".to_string()));
        assert_eq!(approach_runway("VOR17"), Some("17".to_string()));
        assert_eq!(approach_runway("VECTORS"), None);
    }

    #[test]
    fn test_wrong_airport() {
        let mut parser = ProcedureParserXml::new();
        let xml = r#"<ProceduresDB><Airport ID="LOWW"></Airport></ProceduresDB>"#;
        assert!(parser.load_procedures("LOWG", xml.as_bytes()).is_err());
        assert!(parser.load_procedures("LOWG", "<broken".as_bytes()).is_err());
    }
}
