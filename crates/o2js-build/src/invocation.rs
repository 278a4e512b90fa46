//! 実行ファイル自身の場所の解決
//!
//! 呼び出し元のカレントディレクトリには依存せず、実行中のバイナリが置かれた
//! ディレクトリを基準にビルドコンテキストを探します。

use crate::error::{BuildError, BuildResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 開発時のワークスペースルートを示すファイル
const WORKSPACE_MARKER: &str = "Cargo.toml";

/// 実行中のバイナリを含むディレクトリ（絶対パス）を返す
#[tracing::instrument]
pub fn resolve_invocation_directory() -> BuildResult<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| BuildError::EnvironmentResolution(e.to_string()))?;
    directory_of(&exe)
}

/// 実行ファイルのパスからそのディレクトリを求める
///
/// シンボリックリンクは解決されるため、リンク経由で起動しても
/// 実体のあるディレクトリが返ります。
pub fn directory_of(executable: &Path) -> BuildResult<PathBuf> {
    let canonical = executable.canonicalize().map_err(|e| {
        BuildError::EnvironmentResolution(format!("{}: {}", executable.display(), e))
    })?;

    let dir = canonical.parent().ok_or_else(|| {
        BuildError::EnvironmentResolution(format!(
            "{} has no parent directory",
            canonical.display()
        ))
    })?;

    debug!(invocation_dir = %dir.display(), "Resolved invocation directory");
    Ok(dir.to_path_buf())
}

/// リリース処理の基準となるディレクトリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// 実行ファイルのディレクトリ
    pub executable_dir: PathBuf,
    /// ビルドコンテキストの相対パスを解決する基準
    pub root: PathBuf,
}

impl InvocationContext {
    /// 実行ファイルの場所を解決し、ビルドコンテキストを含むルートを決定
    pub fn resolve(context_dir: &Path) -> BuildResult<Self> {
        let executable_dir = resolve_invocation_directory()?;
        Ok(Self::anchor(executable_dir, context_dir))
    }

    /// `context_dir` を含むルートを決定
    ///
    /// `executable_dir` 直下にあればそこをルートにします。なければ
    /// `Cargo.toml` を持つ最も近い祖先（`target/<profile>/` から実行した場合の
    /// ワークスペース）だけを確認し、それより上は探しません。
    /// 見つからない場合は `executable_dir` をそのままルートにします
    /// （存在確認はこの後のステップで行う）。
    pub fn anchor(executable_dir: PathBuf, context_dir: &Path) -> Self {
        let root = if executable_dir.join(context_dir).is_dir() {
            executable_dir.clone()
        } else {
            executable_dir
                .ancestors()
                .skip(1)
                .find(|dir| dir.join(WORKSPACE_MARKER).is_file())
                .filter(|dir| dir.join(context_dir).is_dir())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| executable_dir.clone())
        };

        if root != executable_dir {
            info!(
                executable_dir = %executable_dir.display(),
                root = %root.display(),
                "Build context found above the executable directory"
            );
        }

        Self {
            executable_dir,
            root,
        }
    }

    /// 相対パスをルート基準で解決
    pub fn join(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}
