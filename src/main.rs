use clap::Parser;
use formation_ocr::{cli, config, error, export, matcher, ocr, pipeline};
use cli::{Cli, Commands};
use config::Config;
use error::{FormationOcrError, Result};
use ocr::{OcrEngine, TesseractCli, TextFileOcr};
use pipeline::ConversionRequest;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Convert {
            image,
            text,
            catalog,
            no_matching,
            no_correction,
            threshold,
            annotate,
            headers,
            output,
            pretty,
        } => {
            // 標準出力はJSON用
            eprintln!("🎮 formation-ocr - 編成情報変換\n");

            let mut request = ConversionRequest::from_config(&config, image);
            if let Some(dir) = catalog {
                request.catalog_dir = Some(dir);
            }
            if no_matching {
                request.character_matching = false;
            }
            if no_correction {
                request.level_correction = false;
            }
            if let Some(threshold) = threshold {
                request.match_options.threshold = checked_threshold(threshold)?;
            }
            if annotate {
                request.match_options.annotate = true;
            }
            if let Some(tokens) = headers {
                request.headers = tokens;
            }

            // 入力チェックは pipeline::convert の先頭で行う
            eprintln!(
                "[1/2] 変換中...{}",
                if request.character_matching { " (キャラクター画像マッチング有効)" } else { "" }
            );
            let engine: Box<dyn OcrEngine> = match text {
                Some(path) => Box::new(TextFileOcr::new(path)),
                None => Box::new(TesseractCli::new(config.ocr.clone())),
            };
            let report = tokio::task::spawn_blocking(move || {
                pipeline::convert(&request, engine.as_ref(), &matcher::CcoeffNormed)
            })
            .await
            .map_err(|e| FormationOcrError::Worker(e.to_string()))??;
            eprintln!(
                "✔ 陣地: {} / 編成 {}件\n",
                report.base_name,
                report.formations.len()
            );

            eprintln!("[2/2] 結果を出力中...");
            export::write_report(&report, output.as_deref(), pretty)?;
            if let Some(path) = &output {
                eprintln!("✔ 結果を保存: {}", path.display());
            }

            eprintln!("\n✅ 変換完了");
        }

        Commands::Parse {
            input,
            headers,
            no_correction,
            output,
            pretty,
        } => {
            let text = std::fs::read_to_string(&input)?;

            let mut request = ConversionRequest::from_config(&config, input);
            request.character_matching = false;
            if no_correction {
                request.level_correction = false;
            }
            if let Some(tokens) = headers {
                request.headers = tokens;
            }

            let report = pipeline::parse_report(&request, &text, None)?;
            export::write_report(&report, output.as_deref(), pretty)?;
            if let Some(path) = &output {
                println!("✔ 結果を保存: {}", path.display());
            }
        }

        Commands::Match {
            image,
            catalog,
            threshold,
            annotate,
        } => {
            println!("🔍 formation-ocr - キャラクター画像マッチング\n");

            let mut request = ConversionRequest::from_config(&config, image);
            request.character_matching = true;
            if let Some(dir) = catalog {
                request.catalog_dir = Some(dir);
            }
            if let Some(threshold) = threshold {
                request.match_options.threshold = checked_threshold(threshold)?;
            }
            if annotate {
                request.match_options.annotate = true;
            }
            request.validate()?;

            let work_dir = request.match_options.work_dir.clone();
            let slots = tokio::task::spawn_blocking(move || {
                pipeline::match_characters(&request, &matcher::CcoeffNormed)
            })
            .await
            .map_err(|e| FormationOcrError::Worker(e.to_string()))??
            .unwrap_or_default();

            for (slot, names) in slots.iter() {
                println!("  スロット{}: {}", slot, names.join(", "));
            }
            if let Some(dir) = work_dir {
                println!("\n帯画像: {}", dir.display());
            }
        }

        Commands::Config {
            show,
            set_threshold,
            add_base_name,
            catalog_dir,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(threshold) = set_threshold {
                config.set_match_threshold(threshold)?;
                println!("✔ マッチング閾値を設定しました: {}", threshold);
                changed = true;
            }

            for name in &add_base_name {
                if config.add_base_name(name) {
                    println!("✔ 陣地名を追加しました: {}", name.trim());
                    changed = true;
                }
            }

            if let Some(dir) = catalog_dir {
                println!("✔ キャラクター画像フォルダを設定しました: {}", dir.display());
                config.catalog_dir = Some(dir);
                changed = true;
            }

            if changed {
                config.save_to(&config_path)?;
            }

            if show || !changed {
                println!("設定: {}", config_path.display());
                println!("  マッチング閾値: {}", config.match_threshold);
                println!("  二値化閾値: {}", config.binarize_threshold);
                println!("  陣地名: {}", config.base_names.join(", "));
                println!(
                    "  キャラクター画像フォルダ: {}",
                    config
                        .catalog_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".to_string())
                );
                println!("  作業フォルダ: {}", config.resolved_work_dir().display());
                println!(
                    "  キャラクター画像マッチング: {}",
                    if config.character_matching { "有効" } else { "無効" }
                );
                println!(
                    "  Lv補正: {}",
                    if config.level_correction { "有効" } else { "無効" }
                );
                println!("  OCR: {} (-l {})", config.ocr.command, config.ocr.language);
            }
        }
    }

    Ok(())
}

/// ログ出力の初期化（RUST_LOG が優先、--verbose で debug）
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("formation_ocr=debug,formation_ocr_common=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn checked_threshold(threshold: f32) -> Result<f32> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(FormationOcrError::Validation(format!(
            "マッチング閾値は0～1で指定してください: {}",
            threshold
        )));
    }
    Ok(threshold)
}
