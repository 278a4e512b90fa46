//! openapi2jsonschema コンテナの実行
//!
//! 作業ディレクトリを `/workdir` にマウントし、呼び出し元と同じ uid:gid で
//! 実行するため、生成されたファイルはホスト側のユーザーが所有します。

use crate::error::{SchemaError, SchemaResult};
use crate::format::sort_json_files;
use bollard::Docker;
use bollard::container::{Config, CreateContainerOptions};
use bollard::models::HostConfig;
use colored::Colorize;
use futures_util::stream::StreamExt;
use o2js_config::SchemaConfig;
use std::path::PathBuf;

const CONTAINER_WORKDIR: &str = "/workdir";
const LOG_TAIL_LINES: &str = "50";

pub struct SchemaGenerator {
    docker: Docker,
    config: SchemaConfig,
    workdir: PathBuf,
    user: Option<String>,
}

impl SchemaGenerator {
    pub fn new(docker: Docker, config: SchemaConfig, workdir: PathBuf) -> Self {
        Self {
            docker,
            config,
            workdir,
            user: current_user(),
        }
    }

    /// 生成用イメージがローカルになければ pull
    pub async fn ensure_image(&self) -> SchemaResult<()> {
        let image = &self.config.generator_image;
        match self.docker.inspect_image(image).await {
            Ok(_) => return Ok(()),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {}
            Err(e) => return Err(e.into()),
        }

        println!("  ↓ イメージをダウンロード中: {}", image.cyan());
        let (from_image, tag) = image.rsplit_once(':').unwrap_or((image.as_str(), "latest"));

        #[allow(deprecated)]
        let options = bollard::image::CreateImageOptions {
            from_image,
            tag,
            ..Default::default()
        };

        #[allow(deprecated)]
        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(info) = stream.next().await {
            let info = info?;
            if let Some(status) = info.status {
                tracing::debug!("pull {}: {}", image, status);
            }
        }

        println!("  ✓ イメージのダウンロード完了");
        Ok(())
    }

    /// 1バージョン分のスキーマを生成し、JSON を整列
    pub async fn generate(&self, version: &str) -> SchemaResult<()> {
        let args = generator_args(&self.config, version);
        tracing::debug!("Running openapi2jsonschema: {}", args.join(" "));

        #[allow(deprecated)]
        let config = Config {
            image: Some(self.config.generator_image.clone()),
            cmd: Some(args),
            working_dir: Some(CONTAINER_WORKDIR.to_string()),
            user: self.user.clone(),
            host_config: Some(HostConfig {
                binds: Some(vec![format!(
                    "{}:{}",
                    self.workdir.display(),
                    CONTAINER_WORKDIR
                )]),
                ..Default::default()
            }),
            ..Default::default()
        };

        #[allow(deprecated)]
        let options = CreateContainerOptions {
            name: format!("o2js-{}-{}", version, std::process::id()),
            platform: None,
        };

        let response = self.docker.create_container(Some(options), config).await?;
        let id = response.id;

        let result = self.run_container(&id, version).await;
        self.remove_container(&id).await;
        result?;

        tracing::info!("Successfully ran openapi2jsonschema for {}", version);
        sort_json_files(&self.workdir.join(self.config.version_dir(version)))?;
        Ok(())
    }

    async fn run_container(&self, id: &str, version: &str) -> SchemaResult<()> {
        self.docker
            .start_container(id, None::<bollard::query_parameters::StartContainerOptions>)
            .await?;

        let mut exit_code = 0;
        let mut wait = self
            .docker
            .wait_container(id, None::<bollard::query_parameters::WaitContainerOptions>);
        while let Some(result) = wait.next().await {
            match result {
                Ok(response) => exit_code = response.status_code,
                Err(bollard::errors::Error::DockerContainerWaitError { code, .. }) => {
                    exit_code = code
                }
                Err(e) => return Err(e.into()),
            }
        }

        if exit_code != 0 {
            return Err(SchemaError::GeneratorFailed {
                version: version.to_string(),
                code: exit_code,
                output: self.container_logs(id).await,
            });
        }

        Ok(())
    }

    async fn container_logs(&self, id: &str) -> String {
        let options = bollard::query_parameters::LogsOptions {
            stdout: true,
            stderr: true,
            tail: LOG_TAIL_LINES.to_string(),
            ..Default::default()
        };

        let mut output = String::new();
        let mut logs = self.docker.logs(id, Some(options));
        while let Some(log_result) = logs.next().await {
            match log_result {
                Ok(log) => output.push_str(&log.to_string()),
                Err(e) => {
                    tracing::warn!("Failed to read container logs: {}", e);
                    break;
                }
            }
        }
        output.trim_end().to_string()
    }

    async fn remove_container(&self, id: &str) {
        let options = bollard::query_parameters::RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        if let Err(e) = self.docker.remove_container(id, Some(options)).await {
            tracing::warn!("Failed to remove container {}: {}", id, e);
        }
    }
}

/// コンテナに渡すコマンドライン
pub fn generator_args(config: &SchemaConfig, version: &str) -> Vec<String> {
    let output = config.version_dir(version);
    vec![
        "openapi2jsonschema".to_string(),
        "-o".to_string(),
        output.to_string_lossy().replace('\\', "/"),
        "--strict".to_string(),
        "--expanded".to_string(),
        "--kubernetes".to_string(),
        "--prefix".to_string(),
        config.definitions_prefix(version),
        config.swagger_url(version),
    ]
}

#[cfg(unix)]
fn current_user() -> Option<String> {
    // SAFETY: getuid/getgid は常に成功し、副作用もない
    let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
    Some(format!("{}:{}", uid, gid))
}

#[cfg(not(unix))]
fn current_user() -> Option<String> {
    None
}
