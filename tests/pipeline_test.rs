//! 変換パイプラインの統合テスト
//!
//! 合成したスクリーンショットとアイコンで、帯分割 → 照合 → テキスト解析 → Lv補正
//! までを通しで確認する。

use formation_ocr::config::Config;
use formation_ocr::export;
use formation_ocr::matcher::{self, BandLayout, CcoeffNormed, MatchOptions};
use formation_ocr::ocr::TextFileOcr;
use formation_ocr::pipeline::{self, ConversionRequest};
use formation_ocr::scanner;
use formation_ocr_common::HeaderTokens;
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const ICON: u32 = 12;

/// 左半分が黒
fn icon_left_half() -> GrayImage {
    GrayImage::from_fn(ICON, ICON, |x, _| if x < ICON / 2 { Luma([0]) } else { Luma([255]) })
}

/// 上半分が黒
fn icon_top_half() -> GrayImage {
    GrayImage::from_fn(ICON, ICON, |_, y| if y < ICON / 2 { Luma([0]) } else { Luma([255]) })
}

/// 中央の正方形が黒
fn icon_center() -> GrayImage {
    GrayImage::from_fn(ICON, ICON, |x, y| {
        if (3..9).contains(&x) && (3..9).contains(&y) {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

fn paste(screen: &mut RgbImage, icon: &GrayImage, x: u32, y: u32) {
    for (ix, iy, pixel) in icon.enumerate_pixels() {
        let v = pixel[0];
        screen.put_pixel(x + ix, y + iy, Rgb([v, v, v]));
    }
}

struct Fixture {
    dir: TempDir,
    screenshot: PathBuf,
    catalog: PathBuf,
}

impl Fixture {
    /// 既定の帯配置（x=280, y=210/305/405/510）に合わせた画面を作る
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let catalog = dir.path().join("icons");
        std::fs::create_dir_all(&catalog).unwrap();
        icon_left_half().save(catalog.join("Alice_01.png")).unwrap();
        icon_top_half().save(catalog.join("Bob.png")).unwrap();
        icon_center().save(catalog.join("Carol_summer.png")).unwrap();
        std::fs::write(catalog.join("readme.txt"), "not an icon").unwrap();

        let mut screen = RgbImage::from_pixel(1300, 600, Rgb([255, 255, 255]));
        // 1段目: Alice(左) Bob(右)
        paste(&mut screen, &icon_left_half(), 280 + 100, 210 + 30);
        paste(&mut screen, &icon_top_half(), 280 + 300, 210 + 30);
        // 2段目: Carol
        paste(&mut screen, &icon_center(), 280 + 50, 305 + 30);

        let screenshot = dir.path().join("screen.png");
        screen.save(&screenshot).unwrap();

        Self {
            dir,
            screenshot,
            catalog,
        }
    }

    fn work_dir(&self) -> PathBuf {
        self.dir.path().join("work")
    }

    fn write_text(&self, text: &str) -> PathBuf {
        let path = self.dir.path().join("ocr.txt");
        std::fs::write(&path, text).unwrap();
        path
    }

    fn request(&self) -> ConversionRequest {
        let mut config = Config::default();
        config.base_names = vec!["GuildBaseAlpha".to_string()];
        config.headers = HeaderTokens::english();
        config.catalog_dir = Some(self.catalog.clone());
        config.work_dir = Some(self.work_dir());

        ConversionRequest::from_config(&config, self.screenshot.clone())
    }
}

const TWO_FORMATIONS: &str = "\
GuildBaseAlpha
total party count
4
PlayerOne
Lv120 Lv118
1
rank
3
combat power
1,234,567
PlayerTwo
Lv90
2
rank
5
combat power
987,654
";

#[test]
fn test_catalog_loads_in_file_name_order() {
    let fixture = Fixture::new();
    let icons = scanner::load_catalog(&fixture.catalog).unwrap();
    let names: Vec<&str> = icons.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
}

#[test]
fn test_build_slot_map_from_screenshot() {
    let fixture = Fixture::new();
    let icons = scanner::load_catalog(&fixture.catalog).unwrap();

    let slots = matcher::build_slot_map(
        &fixture.screenshot,
        &icons,
        &CcoeffNormed,
        &MatchOptions::default(),
    )
    .unwrap();

    assert_eq!(slots.len(), 4);
    assert_eq!(slots.get(1).unwrap(), ["Alice".to_string(), "Bob".to_string()]);
    assert_eq!(slots.get(2).unwrap(), ["Carol".to_string()]);
    assert!(slots.get(3).unwrap().is_empty());
    assert!(slots.get(4).unwrap().is_empty());
}

#[test]
fn test_convert_with_matching() {
    let fixture = Fixture::new();
    let ocr = TextFileOcr::new(fixture.write_text(TWO_FORMATIONS));
    let mut request = fixture.request();
    request.level_correction = false;

    let report = pipeline::convert(&request, &ocr, &CcoeffNormed).unwrap();

    assert_eq!(report.base_name, "GuildBaseAlpha");
    assert_eq!(report.sum_party_num, 4);
    assert_eq!(report.formations.len(), 2);

    let first = &report.formations[0];
    assert_eq!(first.player_name, "PlayerOne");
    let characters: Vec<(&str, i32)> = first
        .characters
        .iter()
        .map(|c| (c.name.as_str(), c.level))
        .collect();
    assert_eq!(characters, vec![("Alice", 120), ("Bob", 118)]);
    assert_eq!(first.formation_position, 1);
    assert_eq!(first.rank, 3);
    assert_eq!(first.combat_power, 1_234_567);

    let second = &report.formations[1];
    assert_eq!(second.characters[0].name, "Carol");
    assert_eq!(second.characters[0].level, 90);
    assert_eq!(second.combat_power, 987_654);
}

#[test]
fn test_convert_with_correction_uses_first_mode() {
    let fixture = Fixture::new();
    let ocr = TextFileOcr::new(fixture.write_text(TWO_FORMATIONS));

    let report = pipeline::convert(&fixture.request(), &ocr, &CcoeffNormed).unwrap();

    // 120 と 118 が同数なので先に出た 120
    let levels: Vec<i32> = report.formations[0].characters.iter().map(|c| c.level).collect();
    assert_eq!(levels, vec![120, 120]);
}

#[test]
fn test_convert_drops_formations_beyond_matched_slots() {
    let fixture = Fixture::new();
    let ocr = TextFileOcr::new(fixture.write_text(TWO_FORMATIONS));
    let mut request = fixture.request();
    request.match_options.layout = BandLayout {
        count: 1,
        ..BandLayout::default()
    };

    let report = pipeline::convert(&request, &ocr, &CcoeffNormed).unwrap();
    assert_eq!(report.formations.len(), 1);
    assert_eq!(report.formations[0].player_name, "PlayerOne");
}

#[test]
fn test_convert_writes_band_images() {
    let fixture = Fixture::new();
    let ocr = TextFileOcr::new(fixture.write_text(TWO_FORMATIONS));
    let mut request = fixture.request();
    request.match_options.annotate = true;

    pipeline::convert(&request, &ocr, &CcoeffNormed).unwrap();

    let mut files: Vec<String> = std::fs::read_dir(fixture.work_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    files.sort();

    assert_eq!(files.len(), 8);
    assert_eq!(files.iter().filter(|f| f.ends_with("_matches.png")).count(), 4);
    assert!(files.iter().all(|f| f.contains("_screen_")));

    let band = image::open(fixture.work_dir().join(&files[0])).unwrap();
    assert_eq!((band.width(), band.height()), (1000, 80));
}

#[test]
fn test_convert_without_matching_leaves_names_empty() {
    let fixture = Fixture::new();
    let ocr = TextFileOcr::new(fixture.write_text(TWO_FORMATIONS));
    let mut request = fixture.request();
    request.character_matching = false;
    request.match_options.layout = BandLayout {
        count: 1,
        ..BandLayout::default()
    };

    let report = pipeline::convert(&request, &ocr, &CcoeffNormed).unwrap();
    assert_eq!(report.formations.len(), 2);
    assert!(report
        .formations
        .iter()
        .flat_map(|f| f.characters.iter())
        .all(|c| c.name.is_empty()));
    assert!(!fixture.work_dir().exists());
}

#[test]
fn test_report_export_round_trip() {
    let fixture = Fixture::new();
    let ocr = TextFileOcr::new(fixture.write_text(TWO_FORMATIONS));
    let report = pipeline::convert(&fixture.request(), &ocr, &CcoeffNormed).unwrap();

    let output = fixture.dir.path().join("report.json");
    export::write_report(&report, Some(&output), false).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["BaseName"], "GuildBaseAlpha");
    assert_eq!(json["Formations"][0]["CharacterDtos"][1]["Name"], "Bob");
    assert_eq!(json["Formations"][1]["CombatPower"], 987_654);
    assert!(Path::new(&output).is_file());
}
