pub mod bookings;
pub mod loads;
pub mod sessions;
pub mod truckers;
pub mod webhook;
