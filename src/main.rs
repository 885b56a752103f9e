#[macro_use] extern crate clap;

pub mod graphics;
pub mod interface;

use std::env;
use std::process;

use env_logger::{Builder, Env};

use graphics::error::GlError;
use graphics::frame::{self, Scene};
use graphics::sources::ShaderSources;
use graphics::window::GlWindow;
use interface::cli::{self, Config};

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    Builder::from_env(Env::default().default_filter_or(level)).init();
}

/// Everything GL happens on this thread: the context is only current here.
fn run(config: &Config) -> Result<(), GlError> {
    let mut window = GlWindow::create(config.width, config.height, &config.title, &config.hints)?;

    let sources = ShaderSources::load(
        config.vertex_shader.as_deref(),
        config.fragment_shader.as_deref(),
    )?;

    // Declared after the window so it's dropped first, while the context is still alive
    let scene = Scene::quad(&sources)?;
    log::info!("Ready. Press Escape to quit.");

    let mut frames = 0u64;
    while !window.should_close() {
        frame::draw(&mut window, &scene);
        frames += 1;
    }

    log::info!("Closing after {} frames", frames);
    Ok(())
}

fn main() {
    let config = match cli::parse(env::args_os()) {
        Ok(config) => config,
        Err(e) => e.exit(),
    };

    init_logging(config.verbosity);
    log::debug!("{:?}", config);

    if let Err(e) = run(&config) {
        log::error!("{}", e);
        process::exit(1);
    }
}
