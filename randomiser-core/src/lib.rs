use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod classes;
pub mod data;
pub mod enemies;
pub mod inventory;
pub mod layout;
pub mod mapper;
pub mod patch;
pub mod pool;
pub mod randomizer;
pub mod record;
pub mod seed;
pub mod stats;
pub mod transfer;
pub mod weapons;

use data::GameData;
use enemies::EnemySettings;
use layout::GameLayout;
use patch::DiffCompiler;
use randomizer::{ClassReport, ClassSettings};
use seed::{pass_rng, Pass};
use stats::StatSettings;
use weapons::WeaponSettings;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomiserSettings {
    pub seed: u64,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub layout_path: PathBuf,
    /// Also write the changes as a patch file.
    pub patch_path: Option<PathBuf>,
    pub debug: bool,
    pub classes: ClassSettings,
    pub stats: StatSettings,
    pub weapons: WeaponSettings,
    pub enemies: EnemySettings,
}

impl RandomiserSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Error)]
pub enum RandomiserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("patch error: {0}")]
    Patch(String),
}

pub type Result<T> = std::result::Result<T, RandomiserError>;

/// Problems with a single class, character or item. These are logged and
/// the entity is skipped; they never abort a run.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum EntityIssue {
    #[error("class 0x{id:02X} is not in the class table")]
    MissingClass { id: u8 },
    #[error("character 0x{id:02X} is not in the character table")]
    MissingCharacter { id: u8 },
    #[error("item 0x{id:02X} is not in the item table")]
    MissingItem { id: u8 },
    #[error("no class fits character 0x{character:02X}; it stays in class 0x{class:02X}")]
    NoCandidateClass { character: u8, class: u8 },
    #[error("class 0x{class:02X} has no usable replacement for item 0x{item:02X}; slot cleared")]
    NoReplacement { item: u8, class: u8 },
}

/// Run every enabled pass over already loaded data, committing after each.
pub fn randomise_data(data: &mut GameData, settings: &RandomiserSettings) -> ClassReport {
    let seed = settings.seed;
    let mut report = ClassReport::default();

    if let Some(range) = settings.stats.class_movement {
        log::info!("randomising class movement ({}..{})", range.min, range.max);
        stats::randomize_class_movement(data, range, &mut pass_rng(seed, Pass::ClassMovement));
        data.commit();
    }
    if let Some(variance) = settings.stats.constitution {
        log::info!("randomising constitution");
        stats::randomize_constitution(data, variance, &mut pass_rng(seed, Pass::Constitution));
        data.commit();
    }
    if settings.stats.affinity {
        log::info!("randomising affinity");
        stats::randomize_affinity(data, &mut pass_rng(seed, Pass::Affinity));
        data.commit();
    }

    if settings.weapons.varies_stats() {
        log::info!("randomising weapon stats");
        let mut rng = pass_rng(seed, Pass::WeaponStats);
        weapons::randomize_weapon_stats(data, &settings.weapons, &mut rng);
        data.commit();
    }
    if !settings.weapons.effects.is_empty() {
        log::info!("randomising weapon effects");
        let mut rng = pass_rng(seed, Pass::WeaponEffects);
        weapons::randomize_weapon_effects(data, &settings.weapons.effects, &mut rng);
        data.commit();
    }

    let classes = &settings.classes;
    if classes.randomize_playable {
        log::info!("randomising playable classes");
        let mut rng = pass_rng(seed, Pass::PlayableClasses);
        let pass = randomizer::randomize_playable_classes(data, classes, &mut rng);
        report.absorb(pass);
        data.commit();
    }
    if classes.randomize_bosses {
        log::info!("randomising boss classes");
        let mut rng = pass_rng(seed, Pass::BossClasses);
        let pass = randomizer::randomize_boss_classes(data, classes, &mut rng);
        report.absorb(pass);
        data.commit();
    }
    if classes.randomize_minions {
        log::info!("randomising minion classes");
        let mut rng = pass_rng(seed, Pass::MinionClasses);
        let pass = randomizer::randomize_minion_classes(data, classes, &mut rng);
        report.absorb(pass);
        data.commit();
    }

    let enemy = &settings.enemies;
    let mut rng = pass_rng(seed, Pass::EnemyBuff);
    if let Some(buff) = enemy.minion_growths {
        log::info!("buffing enemy growths ({buff:?})");
        enemies::buff_minion_growths(data, buff);
        data.commit();
    }
    if let Some(buff) = enemy.boss_bases {
        log::info!("buffing boss bases (up to +{}, {:?})", buff.max, buff.curve);
        enemies::buff_boss_bases(data, buff);
        data.commit();
    }
    if let Some(chance) = enemy.improve_minion_weapons {
        log::info!("improving minion weapons ({chance}%)");
        enemies::improve_minion_weapons(data, chance, &mut rng);
        data.commit();
    }
    if let Some(chance) = enemy.improve_boss_weapons {
        log::info!("improving boss weapons ({chance}%)");
        enemies::improve_boss_weapons(data, chance, &mut rng);
        data.commit();
    }

    report
}

/// Load `rom` through `layout`, randomise it and collect the changes. The
/// image is checked before anything is touched, so a bad image yields an
/// error and no patch.
pub fn randomise_image(
    rom: &[u8],
    layout: &GameLayout,
    settings: &RandomiserSettings,
) -> Result<(DiffCompiler, ClassReport)> {
    let mut data = layout.load(rom)?;
    let report = randomise_data(&mut data, settings);
    let patch = data.compile_diffs();
    log::info!(
        "{} diffs, {} bytes changed, {} entity issues",
        patch.len(),
        patch.changed_bytes(),
        report.issues.len()
    );
    Ok((patch, report))
}

fn spoiler_log(
    layout: &GameLayout,
    settings: &RandomiserSettings,
    patch: &DiffCompiler,
    report: &ClassReport,
) -> String {
    let mut log = String::new();
    log.push_str(&format!("game: {} ({})\n", layout.name, layout.game_code));
    log.push_str(&format!("seed: {}\n", settings.seed));
    log.push_str(&format!("diffs: {} ({} bytes)\n", patch.len(), patch.changed_bytes()));
    log.push_str("class changes:\n");
    for change in &report.reassigned {
        log.push_str(&format!(
            "  0x{:02X}: 0x{:02X} -> 0x{:02X}\n",
            change.character, change.from, change.to
        ));
    }
    if !report.issues.is_empty() {
        log.push_str("issues:\n");
        for issue in &report.issues {
            log.push_str(&format!("  {issue}\n"));
        }
    }
    log
}

/// `<output>.spoiler_log.txt`, keeping the image's own extension.
fn spoiler_log_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".spoiler_log.txt");
    PathBuf::from(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn run(settings: RandomiserSettings) -> Result<()> {
    if !settings.input_path.exists() {
        return Err(RandomiserError::Config(format!(
            "Input path does not exist: {}",
            settings.input_path.display()
        )));
    }
    if !settings.layout_path.exists() {
        return Err(RandomiserError::Config(format!(
            "Layout path does not exist: {}",
            settings.layout_path.display()
        )));
    }
    if settings.output_path.as_os_str().is_empty() {
        return Err(RandomiserError::Config("no output path given".to_string()));
    }

    let layout = GameLayout::from_path(&settings.layout_path)?;
    let rom = fs::read(&settings.input_path)?;
    let (patch, report) = randomise_image(&rom, &layout, &settings)?;

    let randomised = patch.apply(&rom)?;
    ensure_parent(&settings.output_path)?;
    fs::write(&settings.output_path, &randomised)?;

    if let Some(path) = &settings.patch_path {
        patch.write_to(path)?;
    }
    if settings.debug {
        let log_path = spoiler_log_path(&settings.output_path);
        fs::write(log_path, spoiler_log(&layout, &settings, &patch, &report))?;
    }
    Ok(())
}

/// Apply a previously written patch file to an image.
pub fn apply_patch_file(input: &Path, patch_path: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        return Err(RandomiserError::Config(format!(
            "Input path does not exist: {}",
            input.display()
        )));
    }
    let patch = DiffCompiler::read_from(patch_path)?;
    let rom = fs::read(input)?;
    let patched = patch.apply(&rom)?;
    ensure_parent(output)?;
    fs::write(output, patched)?;
    log::info!("applied {} diffs to {}", patch.len(), output.display());
    Ok(())
}
