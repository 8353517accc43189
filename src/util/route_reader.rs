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

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::{Result, RouteError};
use crate::model::flight_route::{AppliedProcedures, FlightPlanData, FlightRoute};
use crate::model::restrictions::Restrictions;
use crate::model::route::{Route, RouteType};
use crate::model::waypoint::{Waypoint, WaypointFlag};

use super::waypoint_codec::decode_waypoint;

/// Settings stored in the tag block of the first line.
#[derive(Debug, Default)]
struct Tags {
    plan: FlightPlanData,
    active: usize,
    adep: Option<String>,
    ades: Option<String>,
}

pub fn read_route_file(path: &Path) -> Result<FlightRoute> {
    let text = fs::read_to_string(path)?;
    let route = parse_route(&text)?;
    info!("Read {} waypoints from {}", route.len(), path.display());
    Ok(route)
}

/// Parse the persisted route text. Any malformed line aborts with a parse error;
/// nothing read before it is returned.
pub fn parse_route(text: &str) -> Result<FlightRoute> {
    let mut route = Route::new("", RouteType::Route);
    let mut tags = Tags::default();
    let mut first = true;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields: Vec<&str> = line.split('|').collect();
        if first {
            if fields.len() > 3 && fields.last().is_some_and(|f| f.contains('=')) {
                if let Some(block) = fields.pop() {
                    tags = parse_tags(block).map_err(|e| RouteError::parse(line_number, e))?;
                }
            }
            first = false;
        }
        let wpt = parse_waypoint(&fields).map_err(|e| RouteError::parse(line_number, e))?;
        route.append(wpt);
    }

    apply_tag_airports(&mut route, &tags);
    let procedures = restore_procedures(&route);

    let mut flight_route = FlightRoute::new();
    flight_route.set_route(route);
    flight_route.set_plan_data(tags.plan);
    flight_route.set_procedures(procedures);
    flight_route.set_active_index_unchecked(tags.active);
    Ok(flight_route)
}

/// `ID|LAT|LON|RESTRICTION|PARENT|FLAG|ACTIVE_RUNWAY|TYPE[|type fields]`
fn parse_waypoint(fields: &[&str]) -> std::result::Result<Waypoint, String> {
    if fields.len() < 3 {
        return Err(format!("expected at least 3 fields, found {}", fields.len()));
    }
    let field = |i: usize| fields.get(i).map(|f| f.trim()).unwrap_or("");
    let latitude = field(1)
        .parse::<f64>()
        .map_err(|_| format!("invalid latitude '{}'", field(1)))?;
    let longitude = field(2)
        .parse::<f64>()
        .map_err(|_| format!("invalid longitude '{}'", field(2)))?;
    if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
        return Err(format!("position {} {} out of range", latitude, longitude));
    }
    let restrictions = Restrictions::parse(field(3))?;
    let flag = WaypointFlag::parse(field(5)).ok_or(format!("invalid flag '{}'", field(5)))?;
    let runway = field(6);

    let mut type_code = field(7);
    // Older files only mark airports by their flag or runway
    if type_code.is_empty() && (matches!(flag, WaypointFlag::Adep | WaypointFlag::Ades) || !runway.is_empty()) {
        type_code = "APT";
    }
    let extra = if fields.len() > 8 { &fields[8..] } else { &[] };

    let mut wpt = decode_waypoint(field(0), latitude, longitude, restrictions, type_code, extra)?;
    wpt.set_flag(flag);
    wpt.set_parent(field(4));
    if wpt.is_airport() && !runway.is_empty() {
        wpt.restore_active_runway(runway).map_err(|e| e.to_string())?;
    }
    Ok(wpt)
}

fn parse_tags(block: &str) -> std::result::Result<Tags, String> {
    let mut tags = Tags::default();
    for tag in block.split(';').filter(|t| !t.trim().is_empty()) {
        let (key, value) = tag
            .split_once('=')
            .ok_or(format!("invalid tag '{}'", tag))?;
        let key = key.trim();
        let value = value.trim();
        let number = || {
            value
                .parse::<i32>()
                .map_err(|_| format!("invalid value '{}' for {}", value, key))
        };
        match key {
            "cfl" => tags.plan.cruise_level = number()?,
            "ctemp" => tags.plan.cruise_temp = number()?,
            "croute" => tags.plan.company_route = value.to_string(),
            "fnr" => tags.plan.flight_number = value.to_string(),
            "cindex" => tags.plan.cost_index = number()?,
            "tropo" => tags.plan.tropopause_ft = number()?,
            "accel_alt" => tags.plan.acceleration_alt_ft = number()?,
            "thrust_red_alt" => tags.plan.thrust_reduction_alt_ft = number()?,
            "actwpt" => {
                tags.active = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid active waypoint '{}'", value))?
            }
            "adep" if !value.is_empty() => tags.adep = Some(value.to_string()),
            "ades" if !value.is_empty() => tags.ades = Some(value.to_string()),
            _ => debug!("Ignoring route tag {}", key),
        }
    }
    Ok(tags)
}

/// Flag the airports named in the tags when no line carries the flag itself.
fn apply_tag_airports(route: &mut Route, tags: &Tags) {
    for (id, flag) in [(&tags.adep, WaypointFlag::Adep), (&tags.ades, WaypointFlag::Ades)] {
        let Some(id) = id else { continue };
        if route.contains_flag(flag) {
            continue;
        }
        let found = route
            .get_waypoints()
            .iter()
            .enumerate()
            .filter(|(_, w)| w.is_airport() && w.get_id() == id.as_str())
            .map(|(i, _)| i);
        let index = match flag {
            WaypointFlag::Adep => found.min(),
            _ => found.max(),
        };
        if let Some(index) = index {
            route.modify_waypoint(index, |w| w.set_flag(flag));
        }
    }
}

/// Procedure names come from the parent of the spliced waypoints. STAR transition
/// waypoints precede the STAR's own, so its name is taken from the last one.
fn restore_procedures(route: &Route) -> AppliedProcedures {
    let waypoints = route.get_waypoints();
    let first_parent = |flag: WaypointFlag| {
        waypoints
            .iter()
            .find(|w| w.get_flag() == flag && !w.get_parent().is_empty())
            .map(|w| w.get_parent().to_string())
    };
    let star = waypoints
        .iter()
        .rev()
        .find(|w| w.get_flag() == WaypointFlag::Star && !w.get_parent().is_empty())
        .map(|w| w.get_parent().to_string());
    AppliedProcedures {
        sid: first_parent(WaypointFlag::Sid),
        sid_transition: first_parent(WaypointFlag::SidTransition),
        star,
        approach_transition: first_parent(WaypointFlag::ApproachTransition),
        approach: first_parent(WaypointFlag::Approach),
    }
}
