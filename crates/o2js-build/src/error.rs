use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Cannot determine the location of the running executable: {0}")]
    EnvironmentResolution(String),

    #[error("Build context directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Builder profile '{profile}' is unavailable: {message}")]
    ProfileUnavailable { profile: String, message: String },

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),

    #[error("Invalid image reference: {0}")]
    InvalidReference(String),

    #[error("Invalid build configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::EnvironmentResolution(msg) => {
                format!(
                    "実行ファイルの場所を特定できませんでした: {}\n\
                     \n\
                     ビルドは実行していません。",
                    msg
                )
            }
            BuildError::ContextNotFound(path) => {
                format!(
                    "ビルドコンテキストが見つかりません: {}\n\
                     \n\
                     o2js と同じディレクトリ（またはその親）に\n\
                     docker-openapi2jsonschema/ があるか確認してください。",
                    path.display()
                )
            }
            BuildError::ProfileUnavailable { profile, message } => {
                format!(
                    "buildx ビルダー '{}' を利用できません: {}\n\
                     \n\
                     解決方法:\n\
                     1. docker buildx ls でビルダーを確認してください\n\
                     2. 存在しない場合は作成してください:\n\
                        docker buildx create --name {} --use",
                    profile, message, profile
                )
            }
            BuildError::BuildFailed(msg) => {
                format!(
                    "ビルドに失敗しました: {}\n\
                     \n\
                     Dockerfileの内容を確認してください。イメージは公開されていません。",
                    msg
                )
            }
            BuildError::PushFailed { message } => {
                format!(
                    "ビルドは完了しましたが、プッシュに失敗しました: {}\n\
                     \n\
                     docker login の状態とレジストリへの権限を確認してください。",
                    message
                )
            }
            _ => format!("{}", self),
        }
    }

    /// 失敗したステップを表すプロセス終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::EnvironmentResolution(_) => 3,
            BuildError::ContextNotFound(_) => 4,
            BuildError::ProfileUnavailable { .. } => 5,
            BuildError::BuildFailed(_) => 6,
            BuildError::PushFailed { .. } => 7,
            BuildError::InvalidPlatform(_)
            | BuildError::InvalidReference(_)
            | BuildError::InvalidConfig(_)
            | BuildError::Io(_) => 1,
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
