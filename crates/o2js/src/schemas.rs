use anyhow::Context;
use colored::Colorize;
use o2js_config::SchemaConfig;
use o2js_schema::{GenerateOptions, SchemaError, generate_schemas};
use std::path::PathBuf;

pub async fn handle(output: Option<PathBuf>, jobs: Option<usize>) -> anyhow::Result<()> {
    let workdir = std::env::current_dir().context("カレントディレクトリを取得できません")?;
    let mut options = GenerateOptions::new(workdir);
    options.output = output;
    if let Some(jobs) = jobs {
        options.jobs = jobs;
    }

    println!("{}", "Kubernetes JSON スキーマを生成中...".green());
    println!("作業ディレクトリ: {}", options.workdir.display().to_string().cyan());
    println!("並列数: {}", options.jobs.to_string().cyan());
    println!();

    match generate_schemas(SchemaConfig::default(), options).await {
        Ok(report) => {
            println!();
            println!(
                "  {} 生成: {} / スキップ: {}",
                "✓".green(),
                report.generated.len(),
                report.skipped.len()
            );
            for (minor, patch) in &report.promoted {
                println!("  • {} ← {}", minor.cyan(), patch);
            }
            Ok(())
        }
        Err(SchemaError::Docker(e)) => {
            eprintln!();
            eprintln!("{}", "✗ Docker接続エラー".red().bold());
            eprintln!();
            eprintln!("{}", "原因:".yellow());
            eprintln!("  {}", e);
            eprintln!();
            eprintln!("{}", "解決方法:".yellow());
            eprintln!("  • Dockerが起動しているか確認してください");
            eprintln!("  • docker ps コマンドが正常に動作するか確認してください");
            Err(anyhow::anyhow!("Docker接続に失敗しました"))
        }
        Err(e) => {
            eprintln!();
            eprintln!("  {} {}", "✗".red().bold(), e);
            Err(e.into())
        }
    }
}
