use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use selfie_ai_rust::{cli, config, Analyzer, AnalyzeRequest, ImageInput};
use cli::{Cli, Commands};
use config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { image, mode, prompt, mime, inline, output, repeat, use_cache } => {
            eprintln!("📸 selfie-ai - 髪・肌解析\n");

            // 1. APIキー確認・画像読み込み
            let mut options = config.analyzer_options()?;
            options.cache_responses |= use_cache;

            eprintln!("[1/2] 画像を読み込み中...");
            let mut input = ImageInput::from_file(&image, mime.as_deref())?;
            if inline {
                input = input.into_inline()?;
            }
            eprintln!("✔ {} ({} bytes)\n", image.display(), input.len());

            // 2. AI解析
            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("🔍 [{bar:40.cyan/blue}] {pos}% {msg}")?
                    .progress_chars("##-"),
            );
            let progress = bar.clone();
            options = options.with_progress(move |value| {
                progress.set_position((value * 100.0).round() as u64);
            });

            let mut analyzer = Analyzer::new(options)?;
            eprintln!(
                "[2/2] AI解析中...{}",
                if analyzer.cache().is_enabled() { " (キャッシュ有効)" } else { "" }
            );

            let request = AnalyzeRequest::new(input)
                .with_mode(mode)
                .with_custom_prompt(prompt);

            let mut result = analyzer.analyze(request.clone()).await?;
            for round in 1..repeat {
                bar.reset();
                bar.set_message(format!("{}/{}", round + 1, repeat));
                result = analyzer.analyze(request.clone()).await?;
            }
            bar.finish_and_clear();

            if cli.verbose {
                eprintln!("  キャッシュ件数: {}", analyzer.cache().len());
            }
            eprintln!("✔ 特徴: {}\n", if result.features.is_empty() {
                "（検出なし）".to_string()
            } else {
                result.features.join(", ")
            });

            // 3. 結果出力
            let json = serde_json::to_string_pretty(&result)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("結果の保存に失敗: {}", path.display()))?;
                    eprintln!("✔ 結果を保存: {}", path.display());
                }
                None => println!("{}", json),
            }

            eprintln!("\n✅ 解析完了");
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  モデルURL: {}", config.fal_settings().model_url());
                println!("  アップロードURL: {}", config.upload_url);
                println!("  キャッシュ: {}", if config.cache_responses { "有効" } else { "無効" });
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "selfie_ai_rust=debug" } else { "selfie_ai_rust=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
