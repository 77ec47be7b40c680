use clap::Parser;
use std::path::PathBuf;

use fe_randomiser_core::inventory::WeaponReplacementPolicy;
use fe_randomiser_core::transfer::BasesTransfer;
use fe_randomiser_core::{apply_patch_file, run, RandomiserError, RandomiserSettings};

#[derive(Debug, Parser)]
#[command(
    name = "fe-randomiser",
    version,
    about = "Class and inventory randomiser for GBA tactics RPG images"
)]
struct Args {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,

    /// JSON description of the image's tables and rules.
    #[arg(long, required_unless_present = "apply_patch")]
    layout: Option<PathBuf>,

    #[arg(long, required_unless_present_any = ["apply_patch", "config"])]
    seed: Option<u64>,

    /// JSON settings file; flags given on the command line override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the changes as a patch file.
    #[arg(long, value_name = "PATCH")]
    patch_out: Option<PathBuf>,

    /// Apply an existing patch file to --input instead of randomising.
    #[arg(long, value_name = "PATCH")]
    apply_patch: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    randomize_bosses: bool,

    #[arg(long, default_value_t = false)]
    randomize_minions: bool,

    #[arg(long, default_value_t = false)]
    include_lords: bool,

    #[arg(long, default_value_t = false)]
    include_thieves: bool,

    #[arg(long, default_value_t = false)]
    include_special: bool,

    #[arg(long, default_value_t = false)]
    force_change: bool,

    #[arg(long, default_value_t = false)]
    assign_evenly: bool,

    #[arg(long, default_value_t = false)]
    separate_monsters: bool,

    /// Replace unusable weapons with any usable one rather than the closest match.
    #[arg(long, default_value_t = false)]
    any_usable_weapon: bool,

    #[arg(long, value_enum)]
    bases: Option<BasesArg>,

    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum BasesArg {
    Keep,
    Match,
    Class,
}

impl From<BasesArg> for BasesTransfer {
    fn from(arg: BasesArg) -> Self {
        match arg {
            BasesArg::Keep => BasesTransfer::NoChange,
            BasesArg::Match => BasesTransfer::AdjustToMatch,
            BasesArg::Class => BasesTransfer::AdjustToClass,
        }
    }
}

fn setup_logging(debug: bool) -> Result<(), fern::InitError> {
    let level = if debug { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn build_settings(args: Args) -> Result<RandomiserSettings, RandomiserError> {
    let mut settings = match &args.config {
        Some(path) => RandomiserSettings::from_json(&std::fs::read_to_string(path)?)?,
        None => RandomiserSettings::default(),
    };

    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    settings.input_path = args.input;
    settings.output_path = args.output;
    if let Some(layout) = args.layout {
        settings.layout_path = layout;
    }
    if args.patch_out.is_some() {
        settings.patch_path = args.patch_out;
    }
    settings.debug |= args.debug;

    let classes = &mut settings.classes;
    classes.randomize_bosses |= args.randomize_bosses;
    classes.randomize_minions |= args.randomize_minions;
    classes.include_lords |= args.include_lords;
    classes.include_thieves |= args.include_thieves;
    classes.include_special |= args.include_special;
    classes.force_change |= args.force_change;
    classes.assign_evenly |= args.assign_evenly;
    classes.separate_monsters |= args.separate_monsters;
    if args.any_usable_weapon {
        classes.weapon_policy = WeaponReplacementPolicy::AnyUsable;
    }
    if let Some(bases) = args.bases {
        classes.bases_transfer = bases.into();
    }

    Ok(settings)
}

fn main() {
    let args = Args::parse();

    if let Err(err) = setup_logging(args.debug) {
        eprintln!("Failed to set up logging: {err}");
    }

    if let Some(patch) = args.apply_patch.as_ref() {
        if let Err(err) = apply_patch_file(&args.input, patch, &args.output) {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
        return;
    }

    let result = build_settings(args).and_then(|settings| {
        log::info!("seed {}", settings.seed);
        run(settings)
    });
    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
