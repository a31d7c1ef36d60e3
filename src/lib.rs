pub mod app;
pub mod card;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod kanban_board;
pub mod task;
pub mod telemetry;
pub mod ui;
