//! Flight route engine of a flight management computer: the lateral route with its
//! terminal procedures, the navigation database it is built from, and the persisted
//! flight-plan format.

pub mod earth;
pub mod error;
pub mod event;
pub mod model;
pub mod navdata;
pub mod planner;
pub mod preference;
pub mod util;

pub use error::{Result, RouteError};
