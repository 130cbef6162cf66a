mod helpers;

mod booking_test;
mod flow_test;
mod legacy_test;
mod otp_test;
mod router_test;
mod session_test;
