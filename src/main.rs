mod chain;
mod components;
mod config;
mod controller;
mod error;
mod model;
mod render;
mod state;
mod util;

use components::App;

fn main() {
    tracing_wasm::set_as_global_default();
    tracing::info!("mega grid tiles starting");
    yew::Renderer::<App>::new().render();
}
