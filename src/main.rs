mod app;
mod input;
mod term;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glyphfield::theme::{GLYPH_SETS, THEMES};
use glyphfield::Config;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Noise glyphs that reveal text where the mouse rests")]
struct Args {
    /// JSON settings file (camelCase keys, all optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// color theme key, overrides the config file
    #[arg(long)]
    theme: Option<String>,

    /// glyph set key, overrides the config file
    #[arg(long)]
    glyphs: Option<String>,

    /// frame rate cap
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// RNG seed for a repeatable field
    #[arg(long)]
    seed: Option<u64>,

    /// write logs here (the screen is taken by the field)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// print theme and glyph set keys, then exit
    #[arg(long, default_value_t = false)]
    list: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        // Nothing should scribble over the alternate screen unless asked to.
        None if std::env::var_os("RUST_LOG").is_none() => return Ok(()),
        None => {}
    }
    builder.try_init().context("initializing logger")?;
    Ok(())
}

fn print_presets() {
    println!("themes:");
    for t in THEMES {
        println!("  {:<14} {}", t.key, t.name);
    }
    println!("glyph sets:");
    for g in GLYPH_SETS {
        println!("  {:<14} {}", g.key, g.name);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        print_presets();
        return Ok(());
    }

    init_logging(args.log_file.as_ref())?;

    let mut config = match &args.config {
        Some(path) => Config::load(path).context("loading settings")?,
        None => Config::default(),
    };
    if let Some(theme) = args.theme {
        config.theme = theme;
    }
    if let Some(glyphs) = args.glyphs {
        config.glyph_set = glyphs;
    }
    if args.fps == 0 {
        bail!("--fps must be at least 1");
    }

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!("starting: fps cap {}, seed {:?}", args.fps, args.seed);

    let mut app = app::App::init(config, args.fps, rng).context("setting up the terminal")?;
    app.run()
}
