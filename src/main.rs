use barcode_check_rust::{annotator, batch, checker, cli, config, decoder, error, reference};
use checker::CodeSource;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use dialoguer::Input;
use error::{BarcodeCheckError, Result};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            image,
            location,
            prompt,
            mode,
            out,
            expected,
            output,
        } => {
            println!("🔍 barcode-check - 単品照合\n");

            let image_path = image;
            let mut config = config;
            config.apply_overrides(expected, None, output);

            // 1. 期待値CSV（壊れていればここで止める）
            println!("[1/3] 期待値CSVを読み込み中...");
            let reference = reference::ExpectedReference::from_csv(&config.expected_csv)?;
            println!("✔ {}件\n", reference.len());

            let decoder = decoder::default_decoder();
            if cli.verbose {
                println!("  デコーダ: {} / モード: {}\n", decoder.name(), mode);
            }

            // 2. 照合
            println!("[2/3] 画像を照合中...");
            let file_name = image_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let rgb = image::open(&image_path)
                .map_err(|e| {
                    BarcodeCheckError::ImageLoad(format!("{}: {}", image_path.display(), e))
                })?
                .to_rgb8();

            let resolution = checker::resolve(&rgb, &file_name, mode, decoder.as_ref());
            let location_id = resolve_location(location, prompt, resolution.location_id.clone())?;
            let expected_code = location_id
                .as_deref()
                .and_then(|loc| reference.get(loc))
                .map(|s| s.to_string());

            let verdict =
                checker::classify(resolution.detected_code.as_deref(), expected_code.as_deref());

            match verdict {
                Some(result) => {
                    let source = match resolution.source {
                        CodeSource::Decoder => decoder.name(),
                        CodeSource::Filename => "filename",
                    };
                    println!("結果: {}", result);
                    println!(
                        "  ロケーション: {}",
                        location_id.as_deref().unwrap_or("-")
                    );
                    println!(
                        "  検出コード:   {} (取得元: {})",
                        resolution.detected_code.as_deref().unwrap_or("-"),
                        source
                    );
                    println!("  期待値:       {}", expected_code.as_deref().unwrap_or("-"));
                    println!();

                    // 3. 注釈画像（判定できたときだけ描く）
                    println!("[3/3] 注釈画像を保存中...");
                    let save_path = match out {
                        Some(p) => p,
                        None => {
                            std::fs::create_dir_all(&config.output_dir)?;
                            config
                                .output_dir
                                .join(annotator::annotated_file_name(&file_name, result))
                        }
                    };
                    let saved = annotator::annotate(
                        &rgb,
                        resolution.bbox,
                        result,
                        &image_path,
                        Some(&save_path),
                    )?;
                    println!("✔ 保存先: {}", saved.display());
                }
                None => {
                    // 比較できないときは警告だけ。結果行も注釈画像も出さない（UNKNOWNはバッチ専用）
                    if resolution.detected_code.is_none() {
                        println!("⚠ コードを取得できません（デコーダ検出なし・ファイル名も規約外）");
                    }
                    match &location_id {
                        None => println!("⚠ ロケーションIDが不明です（--location で指定できます）"),
                        Some(loc) if expected_code.is_none() => {
                            println!("⚠ ロケーション {} の期待値がCSVにありません", loc);
                        }
                        _ => {}
                    }
                    println!();

                    println!("[3/3] 注釈画像の保存をスキップ（判定なし）");
                }
            }

            println!("\n✅ 完了");
        }

        Commands::Batch {
            mode,
            input,
            output,
            expected,
        } => {
            println!("📦 barcode-check - バッチ照合\n");

            let mut config = config;
            config.apply_overrides(expected, input, output);

            // 1. 期待値CSV
            println!("[1/4] 期待値CSVを読み込み中...");
            let reference = reference::ExpectedReference::from_csv(&config.expected_csv)?;
            println!("✔ {}件\n", reference.len());

            let decoder = decoder::default_decoder();
            if cli.verbose {
                println!("  デコーダ: {} / モード: {}\n", decoder.name(), mode);
            }

            // 2. 照合
            println!("[2/4] 画像を照合中...");
            let report = batch::run_batch(&config, mode, decoder.as_ref(), &reference, cli.verbose)?;
            println!("✔ {}枚を処理\n", report.total);

            // 3. レポート
            println!("[3/4] レポートを保存中...");
            let csv_path = config.output_dir.join(batch::REPORT_CSV_FILE_NAME);
            let json_path = config.output_dir.join(batch::REPORT_JSON_FILE_NAME);
            batch::write_report_csv(&report, &csv_path)?;
            batch::write_report_json(&report, &json_path)?;
            println!("✔ {}", csv_path.display());
            println!("✔ {}\n", json_path.display());

            // 4. ZIP
            println!("[4/4] ZIPを作成中...");
            let zip_path = config.output_dir.join(batch::ARCHIVE_FILE_NAME);
            let packed = batch::package_outputs(&config.output_dir, &zip_path)?;
            println!("✔ {} ({}エントリ)\n", zip_path.display(), packed);

            let unknown_count = report.total - report.pass_count - report.fail_count;
            println!(
                "✅ バッチ完了: 全{}件 / PASS {} / FAIL {} / UNKNOWN {}",
                report.total, report.pass_count, report.fail_count, unknown_count
            );
        }

        Commands::Config { show } => {
            if show {
                println!("設定:");
                println!("  入力フォルダ: {}", config.images_dir.display());
                println!("  期待値CSV:    {}", config.expected_csv.display());
                println!("  出力フォルダ: {}", config.output_dir.display());
            }
        }
    }

    Ok(())
}

/// ロケーションIDを決める。--location > 対話入力 > ファイル名からの抽出
fn resolve_location(
    flag: Option<String>,
    prompt: bool,
    inferred: Option<String>,
) -> Result<Option<String>> {
    if let Some(loc) = flag {
        return Ok(Some(loc));
    }

    if prompt {
        let input: String = Input::new()
            .with_prompt("ロケーションID")
            .with_initial_text(inferred.unwrap_or_default())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| BarcodeCheckError::Prompt(e.to_string()))?;
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        return Ok(Some(trimmed.to_string()));
    }

    Ok(inferred)
}
