use std::fs;

use fe_randomiser_core::data::{Entity, WeaponRank, WeaponType};
use fe_randomiser_core::layout::GameLayout;
use fe_randomiser_core::randomizer::ClassSettings;
use fe_randomiser_core::{
    apply_patch_file, randomise_image, run, RandomiserError, RandomiserSettings,
};

const CLASSES: usize = 0x100;
const CHARACTERS: usize = 0x200;
const ITEMS: usize = 0x240;
const UNITS: usize = 0x300;

const MERCENARY: u8 = 1;
const CAVALIER: u8 = 2;
const WARRIOR: u8 = 3;

const IRON_SWORD: u8 = 1;
const IRON_LANCE: u8 = 2;
const IRON_AXE: u8 = 3;
const IRON_BOW: u8 = 4;
const VULNERARY: u8 = 5;

const KNIGHT: u8 = 1;

const LAYOUT: &str = r#"{
    "name": "Test Cart",
    "game_code": "FETEST",
    "game_code_offset": 0,
    "classes": { "offset": 256, "count": 3 },
    "characters": { "offset": 512, "count": 1 },
    "items": { "offset": 576, "count": 5 },
    "chapters": [
        { "name": "Prologue", "units": { "offset": 768, "count": 1 }, "lord_leader": 1 }
    ],
    "rules": {
        "playable_characters": [1],
        "restricted_characters": [1],
        "safe_classes": [3]
    }
}"#;

fn image() -> Vec<u8> {
    let mut rom = vec![0u8; 0x400];
    rom[..6].copy_from_slice(b"FETEST");

    let classes: [(u8, &[WeaponType]); 3] = [
        (MERCENARY, &[WeaponType::Sword]),
        (CAVALIER, &[WeaponType::Sword, WeaponType::Lance]),
        (WARRIOR, &[WeaponType::Axe, WeaponType::Bow]),
    ];
    for (i, (id, types)) in classes.iter().enumerate() {
        let base = CLASSES + i * 0x54;
        rom[base + 0x04] = *id;
        rom[base + 0x0B..=base + 0x11].copy_from_slice(&[18, 5, 5, 5, 5, 1, 9]);
        rom[base + 0x12] = 5;
        rom[base + 0x13..=base + 0x19].copy_from_slice(&[60, 20, 20, 20, 20, 20, 20]);
        rom[base + 0x23] = WeaponRank::E.value();
        for ty in *types {
            rom[base + 0x2C + ty.storage_index()] = WeaponRank::A.value();
        }
    }

    rom[CHARACTERS + 0x04] = KNIGHT;
    rom[CHARACTERS + 0x05] = CAVALIER;
    rom[CHARACTERS + 0x14 + WeaponType::Sword.storage_index()] = WeaponRank::C.value();
    rom[CHARACTERS + 0x14 + WeaponType::Lance.storage_index()] = WeaponRank::D.value();

    let items: [(u8, u8, u8); 5] = [
        (IRON_SWORD, WeaponType::Sword.code(), 0x11),
        (IRON_LANCE, WeaponType::Lance.code(), 0x11),
        (IRON_AXE, WeaponType::Axe.code(), 0x11),
        (IRON_BOW, WeaponType::Bow.code(), 0x22),
        (VULNERARY, 0x09, 0x00),
    ];
    for (i, (id, ty, range)) in items.iter().enumerate() {
        let base = ITEMS + i * 0x24;
        rom[base + 0x06] = *id;
        rom[base + 0x07] = *ty;
        rom[base + 0x14] = 40;
        rom[base + 0x15] = 5;
        rom[base + 0x19] = *range;
        if *ty != 0x09 {
            rom[base + 0x1C] = WeaponRank::E.value();
        }
    }

    rom[UNITS] = KNIGHT;
    rom[UNITS + 1] = CAVALIER;
    rom[UNITS + 8] = IRON_SWORD;
    rom[UNITS + 9] = VULNERARY;
    rom
}

fn settings(seed: u64) -> RandomiserSettings {
    RandomiserSettings {
        seed,
        classes: ClassSettings { force_change: true, ..ClassSettings::default() },
        ..RandomiserSettings::default()
    }
}

#[test]
fn knight_becomes_warrior_with_matching_gear() {
    let layout = GameLayout::from_json(LAYOUT).unwrap();
    let rom = image();

    for seed in 0..8 {
        let (patch, report) = randomise_image(&rom, &layout, &settings(seed)).unwrap();
        assert!(report.issues.is_empty());
        let out = patch.apply(&rom).unwrap();
        assert_eq!(out.len(), rom.len());

        let data = layout.load(&out).unwrap();
        let knight = data.characters.get(KNIGHT).unwrap();
        assert_eq!(knight.class_id(), WARRIOR);
        assert_eq!(knight.rank(WeaponType::Sword), 0);
        assert_eq!(knight.rank(WeaponType::Lance), 0);
        for ty in [WeaponType::Axe, WeaponType::Bow] {
            let rank = knight.rank(ty);
            assert!(
                rank == WeaponRank::C.value() || rank == WeaponRank::D.value(),
                "seed {seed}: {rank}"
            );
        }

        let unit = &data.chapters[0].units[0];
        assert_eq!(unit.class_id(), WARRIOR);
        let [first, second, third, fourth] = unit.items().as_array();
        assert!(first == IRON_AXE || first == IRON_BOW, "seed {seed}: {first:#X}");
        assert_eq!([second, third, fourth], [VULNERARY, 0, 0]);
        assert!(data.items.get(first).is_some_and(|item| item.id() == first));
    }
}

#[test]
fn same_seed_gives_same_patch() {
    let layout = GameLayout::from_json(LAYOUT).unwrap();
    let rom = image();
    let (a, _) = randomise_image(&rom, &layout, &settings(1234)).unwrap();
    let (b, _) = randomise_image(&rom, &layout, &settings(1234)).unwrap();
    assert_eq!(a.diffs(), b.diffs());
    assert!(!a.is_empty());
}

#[test]
fn nothing_enabled_means_no_diffs() {
    let layout = GameLayout::from_json(LAYOUT).unwrap();
    let settings = RandomiserSettings {
        classes: ClassSettings { randomize_playable: false, ..ClassSettings::default() },
        ..RandomiserSettings::default()
    };
    let (patch, _) = randomise_image(&image(), &layout, &settings).unwrap();
    assert!(patch.is_empty());
}

#[test]
fn malformed_image_is_rejected_before_randomising() {
    let layout = GameLayout::from_json(LAYOUT).unwrap();
    let mut rom = image();
    rom[0] = b'X';
    let err = randomise_image(&rom, &layout, &settings(1)).unwrap_err();
    assert!(matches!(err, RandomiserError::Layout(_)));

    let short = &image()[..0x308];
    let err = randomise_image(short, &layout, &settings(1)).unwrap_err();
    assert!(matches!(err, RandomiserError::Layout(_)));
}

#[test]
fn run_writes_image_and_patch_that_agree() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("base.gba");
    let layout = dir.path().join("layout.json");
    let output = dir.path().join("out").join("random.gba");
    let patch = dir.path().join("out").join("random.ferp");
    fs::write(&input, image()).unwrap();
    fs::write(&layout, LAYOUT).unwrap();

    let settings = RandomiserSettings {
        input_path: input.clone(),
        layout_path: layout,
        output_path: output.clone(),
        patch_path: Some(patch.clone()),
        debug: true,
        ..settings(77)
    };
    run(settings).unwrap();

    let randomised = fs::read(&output).unwrap();
    assert_ne!(randomised, image());
    assert!(dir.path().join("out").join("random.gba.spoiler_log.txt").exists());

    let replayed = dir.path().join("replayed.gba");
    apply_patch_file(&input, &patch, &replayed).unwrap();
    assert_eq!(fs::read(&replayed).unwrap(), randomised);
}

#[test]
fn run_reports_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let settings = RandomiserSettings {
        input_path: dir.path().join("missing.gba"),
        ..RandomiserSettings::default()
    };
    let err = run(settings).unwrap_err();
    assert!(err.to_string().contains("Input path does not exist"));
}
