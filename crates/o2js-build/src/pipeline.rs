//! リリースパイプライン
//!
//! 1. 実行ファイルのディレクトリを解決
//! 2. 固定設定からビルド引数を組み立て（ビルドコンテキストの存在確認を含む）
//! 3. ビルダーを確認し、ビルド＆プッシュを実行
//!
//! どのステップも失敗した時点で以降は実行しません。リトライや
//! 一部プラットフォームだけの公開も行いません。

use crate::backend::{BuildRequest, ImageBackend, PublishedImage};
use crate::context::resolve_build_context;
use crate::error::{BuildError, BuildResult};
use crate::invocation::InvocationContext;
use crate::platform::TargetSet;
use crate::reference::ImageReference;
use o2js_config::ReleaseConfig;
use std::fmt;

/// パイプラインのステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStep {
    ResolveInvocation,
    ConfigureArguments,
    BuildAndPush,
}

impl ReleaseStep {
    pub fn number(&self) -> usize {
        match self {
            ReleaseStep::ResolveInvocation => 1,
            ReleaseStep::ConfigureArguments => 2,
            ReleaseStep::BuildAndPush => 3,
        }
    }
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseStep::ResolveInvocation => "resolve invocation directory",
            ReleaseStep::ConfigureArguments => "configure build arguments",
            ReleaseStep::BuildAndPush => "build and push",
        };
        write!(f, "{}/3 {}", self.number(), name)
    }
}

impl BuildError {
    /// このエラーが発生したステップ
    pub fn step(&self) -> ReleaseStep {
        match self {
            BuildError::EnvironmentResolution(_) => ReleaseStep::ResolveInvocation,
            BuildError::ContextNotFound(_)
            | BuildError::InvalidPlatform(_)
            | BuildError::InvalidReference(_)
            | BuildError::InvalidConfig(_) => ReleaseStep::ConfigureArguments,
            BuildError::ProfileUnavailable { .. }
            | BuildError::BuildFailed(_)
            | BuildError::PushFailed { .. }
            | BuildError::Io(_) => ReleaseStep::BuildAndPush,
        }
    }
}

/// 固定設定で一度だけリリースを実行するパイプライン
pub struct ReleasePipeline<B: ImageBackend> {
    backend: B,
    config: ReleaseConfig,
}

impl<B: ImageBackend> ReleasePipeline<B> {
    pub fn new(backend: B, config: ReleaseConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 実行ファイルの場所を解決してからリリース
    pub async fn run(&self) -> BuildResult<PublishedImage> {
        self.run_with(|| InvocationContext::resolve(&self.config.context_dir))
            .await
    }

    /// `resolve` で基準ディレクトリを求めてからリリース
    ///
    /// 解決に失敗した場合、バックエンドは一切呼び出しません。
    pub async fn run_with<F>(&self, resolve: F) -> BuildResult<PublishedImage>
    where
        F: FnOnce() -> BuildResult<InvocationContext>,
    {
        tracing::info!(step = %ReleaseStep::ResolveInvocation, "Resolving invocation directory");
        let invocation = resolve().inspect_err(log_failure)?;
        self.run_from(&invocation).await
    }

    /// 解決済みのディレクトリを基準にリリース
    pub async fn run_from(&self, invocation: &InvocationContext) -> BuildResult<PublishedImage> {
        let result = match self.prepare(invocation) {
            Ok(request) => self.publish(&request).await,
            Err(e) => Err(e),
        };
        result.inspect_err(log_failure)
    }

    /// 設定を検証してビルド引数を組み立てる
    pub fn prepare(&self, invocation: &InvocationContext) -> BuildResult<BuildRequest> {
        tracing::info!(step = %ReleaseStep::ConfigureArguments, "Preparing build request");

        let targets = TargetSet::parse(&self.config.platforms)?;
        let image: ImageReference = self.config.image.parse()?;
        if self.config.builder.trim().is_empty() {
            return Err(BuildError::InvalidConfig(
                "builder profile must not be empty".to_string(),
            ));
        }
        resolve_build_context(invocation, &self.config.context_dir)?;

        Ok(BuildRequest {
            targets,
            image,
            working_dir: invocation.root.clone(),
            context: self.config.context_dir.clone(),
            profile: self.config.builder.clone(),
        })
    }

    async fn publish(&self, request: &BuildRequest) -> BuildResult<PublishedImage> {
        tracing::info!(
            step = %ReleaseStep::BuildAndPush,
            backend = self.backend.name(),
            profile = %request.profile,
            "Checking builder"
        );
        self.backend.check_profile(&request.profile).await?;

        tracing::info!(
            image = %request.image,
            platforms = %request.targets.to_arg(),
            "Building and pushing"
        );
        self.backend.build_and_push(request).await
    }
}

fn log_failure(e: &BuildError) {
    tracing::error!(step = %e.step(), "Release failed: {}", e);
}
