pub mod action_box;
pub mod app;
pub mod batch_panel;
pub mod controls_panel;
pub mod grid_canvas;
pub mod tile_info_panel;

pub use app::App;
