mod release;
mod schemas;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "o2js")]
#[command(about = "openapi2jsonschema イメージをマルチアーキテクチャでビルドして公開する", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// イメージをビルドしてレジストリへプッシュ（引数なしの既定動作）
    Release,
    /// 固定設定を JSON で表示
    Config,
    /// Kubernetes の JSON スキーマを生成
    Schemas {
        /// 出力ディレクトリ（カレントディレクトリからの相対パス）
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 同時に実行するコンテナ数
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command.unwrap_or(Commands::Release) {
        Commands::Release => {
            let code = release::handle().await;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Config => {
            let settings = o2js_config::Settings::default();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::Schemas { output, jobs } => {
            schemas::handle(output, jobs).await?;
        }
        Commands::Version => {
            println!("o2js {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
