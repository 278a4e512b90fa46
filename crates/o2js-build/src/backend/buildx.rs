//! `docker buildx` バックエンド
//!
//! マルチプラットフォームビルドは Docker Engine API ではなく buildx CLI で行います。
//! buildx の出力は加工せずにそのまま stderr へ流し、失敗時の分類用に末尾だけを保持します。

use super::classify::BackendOutput;
use super::{BuildRequest, ImageBackend, PublishedImage};
use crate::error::{BuildError, BuildResult};
use async_trait::async_trait;
use colored::Colorize;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// docker buildx CLI wrapper
pub struct BuildxBackend {
    program: PathBuf,
}

impl Default for BuildxBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildxBackend {
    /// PATH 上の `docker` を使用
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("docker"),
        }
    }

    /// 実行する docker バイナリを指定して作成
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `docker buildx build` の引数列
    ///
    /// プッシュは常に指定します（ローカルのみのビルドは行わない）。
    pub fn build_args(request: &BuildRequest) -> Vec<OsString> {
        vec![
            "buildx".into(),
            "build".into(),
            "--builder".into(),
            request.profile.clone().into(),
            "--platform".into(),
            request.targets.to_arg().into(),
            "--tag".into(),
            request.image.to_string().into(),
            "--push".into(),
            request.context.clone().into_os_string(),
        ]
    }

    fn unavailable(&self, profile: &str, e: std::io::Error) -> BuildError {
        BuildError::ProfileUnavailable {
            profile: profile.to_string(),
            message: format!("failed to run {}: {}", self.program.display(), e),
        }
    }
}

#[async_trait]
impl ImageBackend for BuildxBackend {
    fn name(&self) -> &str {
        "docker buildx"
    }

    async fn check_profile(&self, profile: &str) -> BuildResult<()> {
        tracing::debug!("Running: {} buildx inspect {}", self.program.display(), profile);

        let output = Command::new(&self.program)
            .args(["buildx", "inspect", profile])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.unavailable(profile, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .map(|l| l.trim().to_string())
                .unwrap_or_else(|| format!("buildx inspect exited with {}", output.status));
            return Err(BuildError::ProfileUnavailable {
                profile: profile.to_string(),
                message,
            });
        }

        tracing::debug!("Builder '{}' is available", profile);
        Ok(())
    }

    async fn build_and_push(&self, request: &BuildRequest) -> BuildResult<PublishedImage> {
        let args = Self::build_args(request);
        tracing::debug!(
            "Running: {} {} (in {})",
            self.program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" "),
            request.working_dir.display()
        );

        println!("  {} docker buildx build を実行中...", "→".blue());

        let mut child = Command::new(&self.program)
            .args(&args)
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.unavailable(&request.profile, e))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| BuildError::BuildFailed("buildx stderr was not captured".to_string()))?;

        // 出力をそのまま転送しつつ末尾を記録
        let mut reader = BufReader::new(stderr);
        let mut output = BackendOutput::new();
        if let Err(e) = relay_output(&mut reader, &mut std::io::stderr(), &mut output).await {
            tracing::error!("Failed to read buildx output: {}", e);
            if let Err(kill_err) = child.kill().await {
                tracing::warn!("Failed to stop buildx: {}", kill_err);
            }
            return Err(e.into());
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(output.classify(&request.profile, status.code()));
        }

        tracing::info!("Successfully pushed: {}", request.image);
        Ok(PublishedImage {
            image: request.image.clone(),
            targets: request.targets.clone(),
        })
    }
}

/// バックエンドの出力を 1 行ずつ `sink` へ転送し、`output` に記録する
///
/// `sink` への書き込みに失敗した場合は転送だけをやめ、読み取りは最後まで続けます。
/// 成否はバックエンドの終了ステータスだけで決まります。
pub async fn relay_output<R, W>(
    reader: &mut R,
    sink: &mut W,
    output: &mut BackendOutput,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    let mut forward = true;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        if forward {
            if let Err(e) = sink.write_all(&buf).and_then(|()| sink.flush()) {
                tracing::debug!("Stopped forwarding buildx output: {}", e);
                forward = false;
            }
        }
        let line = String::from_utf8_lossy(&buf);
        output.record(line.trim_end_matches(['\n', '\r']));
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::platform::TargetSet;
    use serial_test::serial;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    /// 引数と作業ディレクトリを記録する偽の docker
    struct FakeDocker {
        dir: TempDir,
    }

    impl FakeDocker {
        fn new(inspect_body: &str, build_body: &str) -> Self {
            let dir = tempdir().unwrap();
            let log = dir.path().join("calls.log");
            let script = format!(
                "#!/bin/sh\n\
                 printf '%s\\n' \"$*\" >> '{log}'\n\
                 pwd >> '{log}'\n\
                 case \"$2\" in\n\
                 inspect)\n{inspect_body}\n;;\n\
                 build)\n{build_body}\n;;\n\
                 esac\n",
                log = log.display(),
            );
            let program = dir.path().join("docker");
            fs::write(&program, script).unwrap();
            fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();
            Self { dir }
        }

        fn backend(&self) -> BuildxBackend {
            BuildxBackend::with_program(self.dir.path().join("docker"))
        }

        fn calls(&self) -> Vec<String> {
            fs::read_to_string(self.dir.path().join("calls.log"))
                .unwrap_or_default()
                .lines()
                .map(String::from)
                .collect()
        }
    }

    fn request_in(working_dir: &Path) -> BuildRequest {
        BuildRequest {
            targets: TargetSet::parse(&["linux/amd64", "linux/arm64"]).unwrap(),
            image: "patthomasrick/openapi2jsonschema:latest".parse().unwrap(),
            working_dir: working_dir.to_path_buf(),
            context: PathBuf::from("docker-openapi2jsonschema"),
            profile: "multiarch".to_string(),
        }
    }

    #[test]
    fn test_build_args() {
        let request = request_in(Path::new("/srv/repo"));
        let args: Vec<String> = BuildxBackend::build_args(&request)
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect();

        assert_eq!(
            args,
            vec![
                "buildx",
                "build",
                "--builder",
                "multiarch",
                "--platform",
                "linux/amd64,linux/arm64",
                "--tag",
                "patthomasrick/openapi2jsonschema:latest",
                "--push",
                "docker-openapi2jsonschema",
            ]
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_check_profile_ok() {
        let fake = FakeDocker::new("exit 0", "exit 0");
        fake.backend().check_profile("multiarch").await.unwrap();
        assert_eq!(fake.calls()[0], "buildx inspect multiarch");
    }

    #[tokio::test]
    #[serial]
    async fn test_check_profile_missing_builder() {
        let fake = FakeDocker::new(
            "echo 'ERROR: no builder \"multiarch\" found' >&2\nexit 1",
            "exit 0",
        );

        match fake.backend().check_profile("multiarch").await {
            Err(BuildError::ProfileUnavailable { profile, message }) => {
                assert_eq!(profile, "multiarch");
                assert!(message.contains("no builder"));
            }
            other => panic!("expected ProfileUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_docker_binary() {
        let backend = BuildxBackend::with_program("/nonexistent/o2js-test/docker");
        let result = backend.check_profile("multiarch").await;
        assert!(matches!(result, Err(BuildError::ProfileUnavailable { .. })));
    }

    #[tokio::test]
    #[serial]
    async fn test_build_and_push_success() {
        let fake = FakeDocker::new("exit 0", "echo '#12 pushing layers' >&2\nexit 0");
        let work = tempdir().unwrap();

        let published = fake
            .backend()
            .build_and_push(&request_in(work.path()))
            .await
            .unwrap();

        assert_eq!(
            published.image.to_string(),
            "patthomasrick/openapi2jsonschema:latest"
        );
        assert_eq!(published.targets.len(), 2);

        let calls = fake.calls();
        assert_eq!(
            calls[0],
            "buildx build --builder multiarch --platform linux/amd64,linux/arm64 \
             --tag patthomasrick/openapi2jsonschema:latest --push docker-openapi2jsonschema"
        );
        assert_eq!(
            Path::new(&calls[1]).canonicalize().unwrap(),
            work.path().canonicalize().unwrap()
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_build_failure_for_one_platform() {
        let fake = FakeDocker::new(
            "exit 0",
            "echo '#9 [linux/arm64 3/4] RUN pip install openapi2jsonschema' >&2\n\
             echo 'ERROR: failed to solve: process \"/bin/sh -c pip install openapi2jsonschema\" did not complete successfully: exit code: 1' >&2\n\
             exit 1",
        );
        let work = tempdir().unwrap();

        let result = fake.backend().build_and_push(&request_in(work.path())).await;
        assert!(matches!(result, Err(BuildError::BuildFailed(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_push_failure_after_build() {
        let fake = FakeDocker::new(
            "exit 0",
            "echo '#12 exporting to image' >&2\n\
             echo '#12 pushing layers' >&2\n\
             echo 'ERROR: failed to solve: failed to push patthomasrick/openapi2jsonschema:latest: unauthorized' >&2\n\
             exit 1",
        );
        let work = tempdir().unwrap();

        let result = fake.backend().build_and_push(&request_in(work.path())).await;
        match result {
            Err(BuildError::PushFailed { message }) => assert!(message.contains("unauthorized")),
            other => panic!("expected PushFailed, got {:?}", other),
        }
    }
}
