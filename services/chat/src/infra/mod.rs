pub mod db;
pub mod memory;
pub mod templates;
pub mod twilio;
