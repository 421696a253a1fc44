pub mod app;
pub mod marker_table;
pub mod snapshot_panel;
pub mod spectrum;
pub mod toolbar;
