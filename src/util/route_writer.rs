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

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::model::flight_route::FlightRoute;
use crate::model::waypoint::Waypoint;

use super::waypoint_codec::{encode_id, encode_kind};

pub fn write_route_file(route: &FlightRoute, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(format_route(route).as_bytes())?;
    file.flush()?;
    info!("Wrote {} waypoints to {}", route.len(), path.display());
    Ok(())
}

/// One line per waypoint, the first line ends with the tag block.
pub fn format_route(route: &FlightRoute) -> String {
    let mut text = String::new();
    for (i, wpt) in route.get_waypoints().iter().enumerate() {
        text.push_str(&format_waypoint(wpt));
        if i == 0 {
            text.push('|');
            text.push_str(&format_tags(route));
        }
        text.push('\n');
    }
    text
}

fn format_waypoint(wpt: &Waypoint) -> String {
    // Placeholder positions are written as 0/0 and recomputed on load
    let (latitude, longitude) = if wpt.is_position_valid() {
        (wpt.get_lat(), wpt.get_long())
    } else {
        (0.0, 0.0)
    };
    format!(
        "{}|{:.6}|{:.6}|{}|{}|{}|{}|{}",
        encode_id(wpt),
        latitude,
        longitude,
        wpt.get_restrictions().to_restriction_text(),
        clean(wpt.get_parent()),
        wpt.get_flag().code(),
        wpt.get_active_runway_id().unwrap_or(""),
        encode_kind(wpt),
    )
}

fn format_tags(route: &FlightRoute) -> String {
    let plan = route.get_plan_data();
    let airport_id = |w: Option<&Waypoint>| w.map(|w| w.get_id().to_string()).unwrap_or_default();
    format!(
        "cfl={};ctemp={};croute={};fnr={};cindex={};tropo={};actwpt={};adep={};ades={};accel_alt={};thrust_red_alt={}",
        plan.cruise_level,
        plan.cruise_temp,
        clean(&plan.company_route),
        clean(&plan.flight_number),
        plan.cost_index,
        plan.tropopause_ft,
        route.get_active_index(),
        airport_id(route.get_departure_airport()),
        airport_id(route.get_destination_airport()),
        plan.acceleration_alt_ft,
        plan.thrust_reduction_alt_ft,
    )
}

/// Free text must not break the field and tag separators.
fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '|' | ';' | '\n' | '\r'))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::model::flight_route::FlightRoute;
    use crate::model::test_utils::{ids, make_flight_route, make_sid};
    use crate::model::waypoint::WaypointFlag;
    use crate::util::route_reader::read_route_file;

    use super::{format_route, write_route_file};

    #[test]
    fn test_format() {
        let mut route = make_flight_route();
        route.set_flight_number("KLP|7;");
        let text = format_route(&route);
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("LOWG|46.978200|15.440700|||1|35C|APT|cfl=-1;"));
        assert!(first.contains("fnr=KLP7;"));
        assert!(first.ends_with("adep=LOWG;ades=LOWI;accel_alt=3000;thrust_red_alt=1500"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_round_trip() {
        let mut route = make_flight_route();
        route.set_sid(&make_sid(), "35C").unwrap();
        route.set_cruise_level(370);
        route.set_cruise_temp(-56);
        route.set_company_route("GRZINN1");
        route.set_cost_index(25);
        route.modify_waypoint(4, |w| w.get_restrictions_mut().set_overfly(true)).unwrap();
        route.set_active_index(3).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.txt");
        write_route_file(&route, &path).unwrap();

        let loaded = read_route_file(&path).unwrap();
        assert_eq!(ids(&loaded), ids(&route));
        for (a, b) in loaded.get_waypoints().iter().zip(route.get_waypoints()) {
            assert_eq!(a, b);
            assert_eq!(a.get_flag(), b.get_flag());
            assert_eq!(a.get_kind().type_code(), b.get_kind().type_code());
            assert_eq!(a.is_overfly(), b.is_overfly());
        }
        assert_eq!(loaded.get_active_index(), 3);
        assert_eq!(loaded.get_plan_data(), route.get_plan_data());
        assert_eq!(loaded.get_sid_id(), Some("ETVI1C"));
        assert_eq!(loaded.get_departure_airport().unwrap().get_active_runway_id(), Some("35C"));
        assert_eq!(loaded.get_waypoint(2).unwrap().get_flag(), WaypointFlag::Sid);
    }

    #[test]
    fn test_empty_route() {
        let route = FlightRoute::new();
        assert_eq!(format_route(&route), "");
    }
}
