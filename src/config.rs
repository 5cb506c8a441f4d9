use crate::model::{Shape, DEFAULT_NAME};
use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

#[derive(Parser, Debug, Clone)]
#[command(name = "shapepet")]
#[command(about = "A tiny shape pet that eats, plays, and naps in your terminal")]
pub(crate) struct Cli {
    /// Pet name. Starts a game right away, skipping the setup screen.
    #[arg(long)]
    pub(crate) name: Option<String>,

    /// Pet shape: pentagon, square, triangle or circle
    #[arg(long)]
    pub(crate) shape: Option<String>,

    /// Frame cap (10..=240)
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// Force monochrome (no colors)
    #[arg(long, default_value_t = false)]
    pub(crate) mono: bool,

    /// Draw with plain characters instead of braille
    #[arg(long, default_value_t = false)]
    pub(crate) ascii: bool,

    /// Seed for cosmetic randomness
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) default_name: String,
    pub(crate) default_shape: Shape,
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) enable_braille: bool,
    pub(crate) seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_NAME.to_string(),
            default_shape: Shape::FALLBACK,
            fps_cap: 30,
            enable_color: true,
            enable_braille: true,
            seed: 0xC0FFEE_u64,
        }
    }
}

impl Settings {
    /// Command line wins over the file.
    pub(crate) fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(fps) = cli.fps {
            self.fps_cap = fps;
        }
        if cli.mono {
            self.enable_color = false;
        }
        if cli.ascii {
            self.enable_braille = false;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(shape) = cli.shape.as_deref().and_then(Shape::parse) {
            self.default_shape = shape;
        }
        self.fps_cap = self.fps_cap.clamp(10, 240);
        self
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "shapepet", "Shapepet")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("shapepet.log"),
    })
}

/// Missing file means defaults; a broken one is logged and also means defaults.
pub(crate) fn load_settings(path: &Path) -> Settings {
    let Ok(s) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(err) => {
            warn!(path = %path.display(), %err, "ignoring unreadable settings");
            Settings::default()
        }
    }
}
