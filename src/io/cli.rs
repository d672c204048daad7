use crate::error::ViewerError;
use crate::io::config::Config;
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};

/// Desktop VR model viewer with emulated motion controllers
#[derive(Parser, Debug)]
#[command(name = "model_viewer")]
#[command(about = "Browse, grab and recolor 3D models with emulated VR controllers")]
pub struct Cli {
    /// Scene config file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run without a window and save one rendered frame
    #[arg(long)]
    pub headless: bool,

    /// Frames to simulate in headless mode
    #[arg(long, default_value_t = 60)]
    pub frames: u32,

    /// Output image for headless mode (overrides `render.output`)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Model to activate at startup, by name
    #[arg(long, value_name = "NAME")]
    pub select: Option<String>,
}

impl Cli {
    /// Loads the config file if given, otherwise the built-in scene.
    ///
    /// Also returns the directory relative model paths resolve against.
    pub fn load_config(&self) -> Result<(Config, PathBuf), ViewerError> {
        match &self.config {
            Some(path) => {
                info!("Loading config file: {}", path.display());
                let config = Config::load(path)?;
                let base = path.parent().unwrap_or(Path::new(".")).to_path_buf();
                Ok((config, base))
            }
            None => {
                info!("No config file given; using the built-in scene");
                Ok((Config::default(), PathBuf::from(".")))
            }
        }
    }
}
