pub mod airport;
pub mod fix;
pub mod flight_route;
pub mod holding;
pub mod location;
pub mod navaid;
pub mod procedure;
pub mod restrictions;
pub mod route;
pub mod runway;
pub mod waypoint;

#[cfg(test)]
pub(crate) mod test_utils;
