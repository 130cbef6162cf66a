//! sea-orm entities for the chat service's relational store.

pub mod bookings;
pub mod loads;
pub mod otps;
pub mod shippers;
pub mod support_tickets;
pub mod truckers;
