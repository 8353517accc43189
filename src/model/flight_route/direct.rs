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

use log::{debug, info};

use crate::earth::coordinate::{course_difference, normalize_degrees};
use crate::error::{Result, RouteError};
use crate::model::waypoint::{Waypoint, WaypointFlag};

use super::{FlightRoute, FlightStatus};

/// Pilot reaction time (seconds) added to the turn lead of a direct-to.
pub const REACTION_TIME_S: f64 = 3.0;

/// Turn angle above which the lead distance stops growing.
const MAX_LEAD_TURN_DEG: f64 = 120.0;

/// Turns of this many degrees or more end the removal of bypassed waypoints.
const MAX_PRUNE_TURN_DEG: f64 = 90.0;

impl FlightRoute {
    /// Fly direct from the present position to the waypoint at `target`.
    ///
    /// Everything before the target is dropped and a direct-to waypoint, set back along the
    /// current heading by the turn lead distance, becomes the active waypoint at index 0.
    /// When the target was already the active waypoint, following waypoints that lie back
    /// along the new direct track are dropped as well.
    pub fn go_direct(
        &mut self,
        target: usize,
        turn_radius_nm: f64,
        status: &FlightStatus,
    ) -> Result<()> {
        if target >= self.route.len() {
            return Err(RouteError::invalid(format!(
                "direct to waypoint {} beyond route length {}",
                target,
                self.route.len()
            )));
        }

        let target_was_active = target == self.active_index;
        let mut route = self.route.clone();

        if target < self.active_index {
            route.modify_waypoint(target, |w| w.clear_holding());
        }
        route.remove_range(0, target);

        let Some(target_wpt) = route.get_waypoint(0).cloned() else {
            return Err(RouteError::invalid("direct to target vanished"));
        };

        let course_to_target = status.position.bearing_to_deg(target_wpt.get_loc());
        let turn = course_difference(status.true_heading, course_to_target).min(MAX_LEAD_TURN_DEG);
        let lead = turn_radius_nm.max(0.0) * (turn.to_radians() / 2.0).tan()
            + status.ground_speed_kts.max(0.0) * REACTION_TIME_S / 3600.0;
        let position = status
            .position
            .coordinate_at(lead, normalize_degrees(status.true_heading + 180.0));

        let mut direct = Waypoint::new("(DCT)", position.get_latitude(), position.get_longitude());
        direct.set_flag(WaypointFlag::DirectTo);
        direct.set_parent(target_wpt.get_id());
        route.insert(direct, 0);

        if target_was_active && route.len() >= 3 {
            let direct_track = route.get_true_track_to_next(0).unwrap_or(course_to_target);
            let mut candidate = 2;
            while candidate + 1 < route.len() {
                let Some(wpt) = route.get_waypoint(candidate) else {
                    break;
                };
                if wpt.get_flag() == WaypointFlag::Ades {
                    break;
                }
                let leg_track = route.get_true_track_to_next(candidate).unwrap_or(0.0);
                let back_to_target = wpt.get_loc().bearing_to_deg(target_wpt.get_loc());
                if course_difference(leg_track, direct_track) < MAX_PRUNE_TURN_DEG
                    && course_difference(back_to_target, direct_track) < MAX_PRUNE_TURN_DEG
                {
                    debug!("Direct to {} bypasses {}", target_wpt.get_id(), wpt.get_id());
                    route.remove(candidate);
                } else {
                    break;
                }
            }
        }

        self.route = route;
        self.active_index = 0;
        self.after_structure_change();
        info!("Direct to {}", target_wpt.get_id());
        self.notify_change(true, "go_direct");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::earth::coordinate::Coordinate;
    use crate::error::RouteError;
    use crate::model::flight_route::{FlightRoute, FlightStatus};
    use crate::model::holding::Holding;
    use crate::model::test_utils::{ids, make_fix, make_flight_route};
    use crate::model::waypoint::WaypointFlag;

    fn status(lat: f64, lon: f64, heading: f64) -> FlightStatus {
        FlightStatus {
            position: Coordinate::new(lat, lon),
            true_heading: heading,
            ground_speed_kts: 250.0,
            altitude_ft: 12000.0,
        }
    }

    #[test]
    fn test_direct_down_route() {
        let mut route = make_flight_route();
        route.set_active_index(1).unwrap();

        route.go_direct(2, 1.5, &status(47.35, 14.0, 270.0)).unwrap();
        assert_eq!(ids(&route), vec!["(DCT)", "KPT", "LOWI"]);
        assert_eq!(route.get_active_index(), 0);
        let dct = route.get_active_waypoint().unwrap();
        assert_eq!(dct.get_flag(), WaypointFlag::DirectTo);
        assert!(dct.get_long() > 14.0);
        assert_eq!(route.get_destination_airport_index(), Some(2));
        assert!(route.get_distance_to_destination() > 0.0);
    }

    #[test]
    fn test_direct_prunes_bypassed_waypoints() {
        let mut route = FlightRoute::new();
        route.append(make_fix("A", 47.0, 10.0));
        route.append(make_fix("T", 47.0, 11.0));
        route.append(make_fix("C", 47.0, 10.5));
        route.append(make_fix("D", 47.0, 12.0));
        route.append(make_fix("E", 47.0, 13.0));
        route.set_active_index(1).unwrap();

        route.go_direct(1, 1.5, &status(47.0, 10.2, 90.0)).unwrap();
        assert_eq!(ids(&route), vec!["(DCT)", "T", "D", "E"]);
    }

    #[test]
    fn test_direct_keeps_waypoints_when_not_active() {
        let mut route = FlightRoute::new();
        route.append(make_fix("A", 47.0, 10.0));
        route.append(make_fix("T", 47.0, 11.0));
        route.append(make_fix("C", 47.0, 10.5));
        route.append(make_fix("D", 47.0, 12.0));

        route.go_direct(1, 1.5, &status(47.0, 10.2, 90.0)).unwrap();
        assert_eq!(ids(&route), vec!["(DCT)", "T", "C", "D"]);
    }

    #[test]
    fn test_direct_back_clears_holding() {
        let mut route = make_flight_route();
        let mut holding = Holding::new();
        holding.set_inbound_track(90.0);
        route.modify_waypoint(1, |w| w.set_holding(holding)).unwrap();
        route.set_active_index(2).unwrap();

        route.go_direct(1, 1.5, &status(47.35, 14.0, 90.0)).unwrap();
        assert_eq!(ids(&route), vec!["(DCT)", "ETVIS", "KPT", "LOWI"]);
        assert!(route.get_waypoint(1).unwrap().get_holding().is_none());
    }

    #[test]
    fn test_direct_invalid_target() {
        let mut route = make_flight_route();
        let before = ids(&route);
        let result = route.go_direct(4, 1.5, &status(47.35, 14.0, 90.0));
        assert!(matches!(result, Err(RouteError::InvalidOperation(_))));
        assert_eq!(ids(&route), before);
    }
}
