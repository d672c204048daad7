use clap::Parser;
use log::{error, info};
use model_viewer::app::{run_headless, start_gui};
use model_viewer::io::cli::Cli;
use model_viewer::io::prefabs::build_prefabs;
use model_viewer::viewer::session::ViewerSession;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .filter_module("eframe", log::LevelFilter::Warn)
        .filter_module("egui_glow", log::LevelFilter::Warn)
        .filter_module("egui_winit", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .filter_module("wgpu", log::LevelFilter::Warn)
        .filter_module("glutin", log::LevelFilter::Warn)
        .filter_module("sctk", log::LevelFilter::Warn)
        .format_timestamp(None)
        .format_level(true)
        .init();

    info!("Model viewer starting");
    let cli = Cli::parse();

    let (config, base_dir) = match cli.load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let prefabs = build_prefabs(&config.models, &base_dir);
    let mut session = ViewerSession::new(&config, &prefabs);
    if cli.headless || cli.select.is_some() {
        session.select_model(cli.select.as_deref());
    }

    let result = if cli.headless {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.render.output));
        run_headless(&config, &mut session, cli.frames, &output)
    } else {
        info!("Starting GUI");
        start_gui(config, session)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
