use std::process::ExitCode;

use log::LevelFilter;
use phobia::{
    abs::*,
    config::{CONFIG_FILE, Config},
    logging,
};

fn run(config: &Config) -> phobia::Result<()> {
    let mut window = Window::new(
        config.window.width,
        config.window.height,
        &config.window.title,
        config.window.vsync,
    )?;
    window.set_depth_test(true);

    let shader = ShaderProgram::from_files(
        window.gl(),
        &config.shaders.vertex,
        &config.shaders.fragment,
    )?;
    let texture = config
        .texture
        .as_ref()
        .map(|path| Texture::new(window.gl(), path))
        .transpose()?;

    let clear_color = config.clear_color();
    while !window.should_close() {
        window.clear(clear_color);
        shader.use_program();
        if let Some(texture) = &texture {
            texture.bind();
        }

        window.swap_buffers();
        window.poll_events();
    }

    log::info!("Window closed, shutting down");
    Ok(())
}

fn main() -> ExitCode {
    let config = Config::load(CONFIG_FILE);
    let level = config
        .as_ref()
        .map(|c| c.log_level)
        .unwrap_or(LevelFilter::Info);
    if let Err(e) = logging::init(level) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let result = config.and_then(|config| run(&config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_logged_at_source() {
                log::error!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}
