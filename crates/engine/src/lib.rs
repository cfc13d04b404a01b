pub mod aggregate;
pub mod cell;
pub mod coerce;
pub mod compare;
pub mod roles;
pub mod session;
pub mod sheet;
pub mod view;
