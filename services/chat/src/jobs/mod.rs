pub mod deferred;
pub mod sweeper;
