use colored::Colorize;
use o2js_build::{BuildxBackend, ReleasePipeline};
use o2js_config::ReleaseConfig;

/// リリースを実行し、プロセスの終了コードを返す
pub async fn handle() -> i32 {
    let config = ReleaseConfig::default();

    println!("{}", "openapi2jsonschema イメージをリリース中...".green());
    println!("イメージ: {}", config.image.cyan());
    println!("プラットフォーム: {}", config.platforms.join(",").cyan());
    println!("ビルダー: {}", config.builder.cyan());
    println!();

    let pipeline = ReleasePipeline::new(BuildxBackend::new(), config);
    match pipeline.run().await {
        Ok(published) => {
            println!();
            println!(
                "  {} {} ({})",
                "✓".green(),
                published.image.to_string().cyan(),
                published.targets.to_arg()
            );
            println!("{}", "📤 プッシュ完了".blue().bold());
            0
        }
        Err(e) => {
            eprintln!();
            eprintln!(
                "{} [{}]",
                "✗ リリースに失敗しました".red().bold(),
                e.step()
            );
            eprintln!();
            eprintln!("{}", e.user_message());
            e.exit_code()
        }
    }
}
