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

//! Pipe separated waypoint fields shared by the route file and the simple procedure file.

use crate::earth::coordinate::Coordinate;
use crate::model::airport::Airport;
use crate::model::fix::Fix;
use crate::model::navaid::{Navaid, NavaidType};
use crate::model::restrictions::{Restrictions, TurnDirection};
use crate::model::runway::Runway;
use crate::model::waypoint::{Waypoint, WaypointKind};

const OVERFLY_MARK: char = '*';

/// Strip the overfly marker, `*ID` or `ID*`.
pub(crate) fn decode_id(token: &str) -> (String, bool) {
    let token = token.trim();
    let stripped = token.trim_start_matches(OVERFLY_MARK).trim_end_matches(OVERFLY_MARK);
    (stripped.to_string(), stripped.len() != token.len())
}

pub(crate) fn encode_id(wpt: &Waypoint) -> String {
    if wpt.is_overfly() {
        format!("{}{}", wpt.get_id(), OVERFLY_MARK)
    } else {
        wpt.get_id().to_string()
    }
}

/// `TYPE[|type fields]` of a waypoint.
pub(crate) fn encode_kind(wpt: &Waypoint) -> String {
    let kind = wpt.get_kind();
    match kind {
        WaypointKind::HdgToAlt { heading, .. } => format!("{}|{:.1}", kind.type_code(), heading),
        WaypointKind::HdgToIntercept {
            heading,
            fix,
            radial,
            turn,
        } => format!(
            "{}|{:.6}|{:.6}|{:.1}|{:.1}|{}",
            kind.type_code(),
            fix.get_latitude(),
            fix.get_longitude(),
            radial,
            heading,
            turn.code()
        ),
        _ => kind.type_code().to_string(),
    }
}

/// Build a waypoint from its persisted fields. Navdata backed kinds are created as stubs
/// carrying id and position only; a navdata scan fills in the rest.
pub(crate) fn decode_waypoint(
    id_token: &str,
    latitude: f64,
    longitude: f64,
    restrictions: Restrictions,
    type_code: &str,
    fields: &[&str],
) -> Result<Waypoint, String> {
    let (id, overfly) = decode_id(id_token);
    if id.is_empty() {
        return Err("empty waypoint id".to_string());
    }
    let mut wpt = match type_code.trim() {
        "" => Waypoint::new(&id, latitude, longitude),
        "APT" => Waypoint::from_airport(Airport::new(
            id.clone(),
            latitude,
            longitude,
            0,
            String::new(),
        )),
        "RWY" => {
            let number = id.strip_prefix("RW").unwrap_or(&id);
            let mut wpt = Waypoint::from_runway(Runway::new(number, latitude, longitude, 0.0, 0, 0, 0));
            wpt.set_id(&id);
            wpt
        }
        "INT" => Waypoint::from_fix(Fix::new(id.clone(), latitude, longitude)),
        "VOR" => navaid_stub(&id, NavaidType::Vor, latitude, longitude),
        "NDB" => navaid_stub(&id, NavaidType::Ndb, latitude, longitude),
        "ILS" => navaid_stub(&id, NavaidType::Ils, latitude, longitude),
        "HDG_ALT" => {
            let heading = field_number(fields, 0, "heading")?;
            let altitude = id
                .trim_start_matches('(')
                .trim_end_matches(')')
                .parse::<i32>()
                .ok()
                .or(restrictions.get_altitude().map(|a| a.altitude_ft))
                .ok_or(format!("no altitude for heading leg {}", id))?;
            let mut wpt = Waypoint::hdg_to_alt(heading, altitude);
            wpt.set_id(&id);
            wpt
        }
        "HDG_INTC" => {
            let fix_lat = field_number(fields, 0, "intercept latitude")?;
            let fix_lon = field_number(fields, 1, "intercept longitude")?;
            let radial = field_number(fields, 2, "radial")?;
            let heading = field_number(fields, 3, "heading")?;
            let turn_code = fields.get(4).copied().unwrap_or("");
            let turn = TurnDirection::from_code(turn_code)
                .ok_or(format!("invalid turn direction '{}'", turn_code))?;
            let mut wpt =
                Waypoint::hdg_to_intercept(heading, Coordinate::new(fix_lat, fix_lon), radial, turn);
            wpt.set_id(&id);
            wpt
        }
        other => return Err(format!("unknown waypoint type '{}'", other)),
    };
    // A stored position of a dependent leg is kept until its predecessor changes
    if wpt.is_dependent() && (latitude != 0.0 || longitude != 0.0) {
        wpt.set_loc(Coordinate::new(latitude, longitude));
    }
    let mut restrictions = restrictions;
    restrictions.set_overfly(overfly);
    wpt.set_restrictions(restrictions);
    Ok(wpt)
}

fn navaid_stub(id: &str, navaid_type: NavaidType, latitude: f64, longitude: f64) -> Waypoint {
    Waypoint::from_navaid(Navaid::new(
        id.to_string(),
        navaid_type,
        latitude,
        longitude,
        0,
        0.0,
        0,
        String::new(),
    ))
}

fn field_number(fields: &[&str], index: usize, name: &str) -> Result<f64, String> {
    fields
        .get(index)
        .ok_or(format!("missing {}", name))?
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid {}", name))
}
