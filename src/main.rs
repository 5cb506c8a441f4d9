mod app;
mod clock;
mod config;
mod decay;
mod input;
mod model;
mod render;
mod sim;
mod sleep;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
