pub mod args;
pub mod handlers;
pub mod output;
pub mod setup_tui;
