//! イメージビルドバックエンド
//!
//! バックエンドはビルドとプッシュを一つの不可分な操作として扱います。
//! 成功が返るのはレジストリへのプッシュが完了した後だけです。

pub mod buildx;
pub mod classify;

pub use buildx::BuildxBackend;

use crate::error::BuildResult;
use crate::platform::TargetSet;
use crate::reference::ImageReference;
use async_trait::async_trait;
use std::path::PathBuf;

/// バックエンドへ渡す完全な引数セット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub targets: TargetSet,
    pub image: ImageReference,
    /// サブプロセスの作業ディレクトリ
    pub working_dir: PathBuf,
    /// `working_dir` からの相対パス
    pub context: PathBuf,
    /// ビルダー名
    pub profile: String,
}

/// 公開されたイメージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedImage {
    pub image: ImageReference,
    pub targets: TargetSet,
}

/// Image build backend abstraction
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Backend name for display (e.g. "docker buildx")
    fn name(&self) -> &str;

    /// Check that the named builder exists and is reachable
    async fn check_profile(&self, profile: &str) -> BuildResult<()>;

    /// Build every target platform and push the result under `request.image`
    async fn build_and_push(&self, request: &BuildRequest) -> BuildResult<PublishedImage>;
}
