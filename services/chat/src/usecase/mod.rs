pub mod booking;
pub mod identity;
pub mod load;
pub mod notify;
pub mod otp;
pub mod registration;
pub mod support;
