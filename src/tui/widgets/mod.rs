pub mod header;
pub mod panels;
pub mod popup;
pub mod statusbar;
