pub mod app;
pub mod columns;
pub mod events;
pub mod pane;
pub mod theme;
pub mod widgets;
