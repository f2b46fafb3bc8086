mod browser;
mod components;
mod config;
mod error;
mod leaderboard;
mod model;
mod pixels;
mod profile;
mod render;
mod state;
mod util;

use components::app::App;

fn main() {
    util::init_logging();
    tracing::info!("gesture puzzle starting");
    yew::Renderer::<App>::new().render();
}
