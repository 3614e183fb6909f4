pub mod monitor;
pub mod setup;
pub mod ui;
