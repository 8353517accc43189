use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info};

use kelpie_fmc::event::{Event, EventManager, EventType};
use kelpie_fmc::earth::coordinate::Coordinate;
use kelpie_fmc::model::flight_route::{FlightRoute, FlightStatus};
use kelpie_fmc::navdata::{Navdata, NavdataPaths};
use kelpie_fmc::planner::Planner;
use kelpie_fmc::preference;
use kelpie_fmc::util::Logger;
use kelpie_fmc::{Result, RouteError};

const DEFAULT_TURN_RADIUS_NM: f64 = 1.5;

fn main() -> ExitCode {
    let _logger = Logger::new();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let direct_to = match args.iter().position(|a| a == "--direct") {
        Some(i) if i + 1 < args.len() => {
            let target = args.remove(i + 1);
            args.remove(i);
            Some(target.to_uppercase())
        }
        Some(_) => {
            eprintln!("--direct needs a waypoint");
            return ExitCode::from(2);
        }
        None => None,
    };
    if args.is_empty() {
        eprintln!("usage: kelpie-fmc [--direct WPT] <route-file | \"ICAO ROUTE\">");
        return ExitCode::from(2);
    }
    let source = args.join(" ");

    let events = Arc::new(EventManager::new());
    let receiver = events.register_listener(&[EventType::NavdataLoaded, EventType::RouteChanged]);

    let navdata = match Navdata::load(&NavdataPaths::from_preferences()) {
        Ok(navdata) => navdata,
        Err(e) => {
            error!("Unable to load navdata: {}", e);
            eprintln!("Unable to load navdata: {}", e);
            return ExitCode::FAILURE;
        }
    };
    events.notify_listeners(Event::NavdataLoaded);

    let result = if let Some(path) = route_file(&source) {
        let mut route = FlightRoute::with_events(events.clone());
        route.load(&path, Some(&navdata)).map(|_| route)
    } else {
        Planner::new(&navdata).extract_route(&source).map(|mut route| {
            route.set_event_manager(Some(events.clone()));
            route
        })
    };

    let result = match direct_to {
        Some(target) => result.and_then(|mut route| fly_direct(&mut route, &target).map(|_| route)),
        None => result,
    };

    let code = match result {
        Ok(route) => {
            print_route(&route);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}: {}", source, e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    };

    if let Some(receiver) = receiver {
        while let Ok(event) = receiver.try_recv() {
            info!("{:?}", event);
        }
    }
    code
}

/// The argument as given, or relative to the configured route directory.
fn route_file(source: &str) -> Option<PathBuf> {
    let path = PathBuf::from(source);
    if path.is_file() {
        return Some(path);
    }
    preference::manager()
        .get::<String>(preference::ROUTE_DIRECTORY)
        .map(|dir| PathBuf::from(dir).join(source))
        .filter(|p| p.is_file())
}

/// Direct to `target` from the active waypoint, heading along the current leg.
fn fly_direct(route: &mut FlightRoute, target: &str) -> Result<()> {
    let Some(index) = route.get_waypoints().iter().position(|w| w.get_id() == target) else {
        return Err(RouteError::NotFound(format!("waypoint {} in route", target)));
    };
    let active = route.get_active_index();
    let position = route
        .get_waypoint(active)
        .map(|w| *w.get_loc())
        .unwrap_or_else(|| Coordinate::new(0.0, 0.0));
    let heading = route.get_true_track_to_next(active).unwrap_or(0.0);
    let turn_radius = preference::manager()
        .get::<f64>(preference::TURN_RADIUS_NM)
        .unwrap_or(DEFAULT_TURN_RADIUS_NM);
    let status = FlightStatus {
        position,
        true_heading: heading,
        ground_speed_kts: 0.0,
        altitude_ft: 0.0,
    };
    route.go_direct(index, turn_radius, &status)
}

fn print_route(route: &FlightRoute) {
    println!("{:<12} {:<9} {:>5} {:>7}  {}", "WPT", "FLAG", "TRK", "DIST", "RESTRICTION");
    for (i, wpt) in route.get_waypoints().iter().enumerate() {
        let track = route
            .get_true_track_from_prev(i)
            .map(|t| format!("{:03.0}", t))
            .unwrap_or_default();
        let distance = route
            .get_distance_from_prev(i)
            .map(|d| format!("{:.1}", d))
            .unwrap_or_default();
        let marker = if i == route.get_active_index() { ">" } else { " " };
        println!(
            "{}{:<11} {:<9} {:>5} {:>7}  {}",
            marker,
            wpt.get_id(),
            wpt.get_flag().name(),
            track,
            distance,
            wpt.get_restrictions().to_restriction_text()
        );
    }
    println!("Distance to destination {:.1} NM", route.get_distance_to_destination());
}
