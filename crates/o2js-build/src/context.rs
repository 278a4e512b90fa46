use crate::error::{BuildError, BuildResult};
use crate::invocation::InvocationContext;
use std::path::{Path, PathBuf};

/// ビルドコンテキストのパスを解決
///
/// ディレクトリが存在し、中身を列挙できることを確認します。
/// バックエンドを呼び出す前に必ず通すチェックです。
pub fn resolve_build_context(
    invocation: &InvocationContext,
    context_dir: &Path,
) -> BuildResult<PathBuf> {
    let context = invocation.join(context_dir);

    if !context.exists() {
        return Err(BuildError::ContextNotFound(context));
    }

    if !context.is_dir() {
        tracing::debug!("Build context is not a directory: {}", context.display());
        return Err(BuildError::ContextNotFound(context));
    }

    // 読み取り権限の確認
    if let Err(e) = std::fs::read_dir(&context) {
        tracing::debug!("Build context is unreadable: {}", e);
        return Err(BuildError::ContextNotFound(context));
    }

    if !context.join("Dockerfile").is_file() {
        tracing::warn!(
            "No Dockerfile at the top of the build context: {}",
            context.display()
        );
    }

    Ok(context)
}
