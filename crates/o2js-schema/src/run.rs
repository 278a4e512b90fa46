//! スキーマ生成全体の流れ
//!
//! タグ取得 → バージョン選択 → 各バージョンの生成（並列）→ マイナーへの昇格

use crate::error::{SchemaError, SchemaResult};
use crate::generator::SchemaGenerator;
use crate::progress::GenerationProgress;
use crate::promote::promote_latest_patches;
use crate::tags::fetch_kubernetes_tags;
use crate::version::{ApiVersion, select_versions};
use bollard::Docker;
use futures_util::stream::{self, StreamExt};
use o2js_config::SchemaConfig;
use o2js_config::schema::MASTER;
use std::fs;
use std::path::{Component, Path, PathBuf};

const MAX_DEFAULT_JOBS: usize = 32;

/// 生成オプション
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// コンテナにマウントする作業ディレクトリ
    pub workdir: PathBuf,
    /// 出力先の上書き（作業ディレクトリからの相対パス）
    pub output: Option<PathBuf>,
    /// 同時に実行するコンテナ数
    pub jobs: usize,
}

impl GenerateOptions {
    pub fn new(workdir: PathBuf) -> Self {
        Self {
            workdir,
            output: None,
            jobs: default_jobs(),
        }
    }
}

/// 生成結果
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub generated: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
    /// `(minor, patch)` の組
    pub promoted: Vec<(String, String)>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 実行対象と、出力済みのため読み飛ばすバージョン
#[derive(Debug, PartialEq, Eq)]
pub struct Plan {
    pub run: Vec<String>,
    pub skipped: Vec<String>,
}

/// 既存の出力ディレクトリから実行計画を立てる
///
/// `master` は常に末尾に加わり、出力済みでも再生成されます。
pub fn plan_versions(output_root: &Path, versions: &[ApiVersion]) -> Plan {
    let mut run = Vec::new();
    let mut skipped = Vec::new();

    for version in versions {
        if output_root.join(version.as_str()).exists() {
            tracing::warn!(
                "Output path {} already exists. Skipping version {}.",
                output_root.join(version.as_str()).display(),
                version
            );
            skipped.push(version.to_string());
        } else {
            run.push(version.to_string());
        }
    }
    run.push(MASTER.to_string());

    Plan { run, skipped }
}

/// 出力先が作業ディレクトリ配下の相対パスであることを確認
///
/// コンテナに見えるのは作業ディレクトリ（`/workdir`）配下だけです。
/// 絶対パスと `..` を含むパスは受け付けません。
pub fn validate_output_dir(output: &Path) -> SchemaResult<()> {
    let escapes = output.as_os_str().is_empty()
        || output.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(SchemaError::InvalidOutput(output.to_path_buf()));
    }
    Ok(())
}

/// CPU 数 + 4（上限 32）
pub fn default_jobs() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus + 4).min(MAX_DEFAULT_JOBS)
}

/// Kubernetes の各バージョンについて JSON スキーマを生成
///
/// 個々のバージョンの失敗では止まらず、昇格まで行ったうえで
/// 失敗があれば [`SchemaError::Incomplete`] を返します。
pub async fn generate_schemas(
    config: SchemaConfig,
    options: GenerateOptions,
) -> SchemaResult<GenerationReport> {
    let config = match options.output {
        Some(ref output) => SchemaConfig {
            output_dir: output.clone(),
            ..config
        },
        None => config,
    };
    validate_output_dir(&config.output_dir)?;
    let output_root = options.workdir.join(&config.output_dir);

    let client = reqwest::Client::new();
    let tags = fetch_kubernetes_tags(&client, &config.tags_url).await?;
    let versions = select_versions(&tags, &config.earliest, &config.latest)?;

    let master_dir = output_root.join(MASTER);
    if master_dir.exists() {
        tracing::info!(
            "Removing existing master directory: {}",
            master_dir.display()
        );
        fs::remove_dir_all(&master_dir)?;
    }
    fs::create_dir_all(&output_root)?;

    let plan = plan_versions(&output_root, &versions);

    let docker = Docker::connect_with_local_defaults()?;
    docker.ping().await?;

    let generator = SchemaGenerator::new(docker, config, options.workdir.clone());
    generator.ensure_image().await?;

    let mut report = GenerationReport {
        skipped: plan.skipped,
        ..Default::default()
    };
    let total = plan.run.len();
    let progress = GenerationProgress::new(total);
    let jobs = options.jobs.max(1);

    let generator = &generator;
    let progress_ref = &progress;
    let results: Vec<(String, SchemaResult<()>)> = stream::iter(plan.run)
        .map(|version| async move {
            progress_ref.start(&version);
            let result = generator.generate(&version).await;
            match &result {
                Ok(()) => progress_ref.succeeded(&version),
                Err(e) => {
                    tracing::error!("Error processing version {}: {}", version, e);
                    progress_ref.failed(&version);
                }
            }
            (version, result)
        })
        .buffer_unordered(jobs)
        .collect()
        .await;

    for (version, result) in results {
        match result {
            Ok(()) => report.generated.push(version),
            Err(_) => report.failed.push(version),
        }
    }
    progress.finish(report.failed.len());

    report.promoted = promote_latest_patches(&output_root, &versions)?;

    if !report.is_success() {
        return Err(SchemaError::Incomplete {
            failed: report.failed.len(),
            total,
        });
    }

    tracing::info!("All versions processed successfully.");
    Ok(report)
}
