use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 公開先イメージ（タグは常に latest）
pub const IMAGE_REFERENCE: &str = "patthomasrick/openapi2jsonschema:latest";

/// ビルド対象プラットフォーム
pub const TARGET_PLATFORMS: [&str; 2] = ["linux/amd64", "linux/arm64"];

/// Dockerfile を含むビルドコンテキスト（実行ファイルのディレクトリからの相対パス）
pub const BUILD_CONTEXT_DIR: &str = "docker-openapi2jsonschema";

/// buildx のビルダー名
pub const BUILDER_PROFILE: &str = "multiarch";

/// リリース設定
///
/// 起動時に一度だけ構築され、以降は変更されません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// `os/arch` 形式のプラットフォーム一覧（順序はそのまま buildx に渡る）
    pub platforms: Vec<String>,
    /// `repository:tag` 形式のイメージ参照
    pub image: String,
    /// ビルドコンテキストの相対パス
    pub context_dir: PathBuf,
    /// buildx ビルダー名
    pub builder: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            platforms: TARGET_PLATFORMS.iter().map(|p| p.to_string()).collect(),
            image: IMAGE_REFERENCE.to_string(),
            context_dir: PathBuf::from(BUILD_CONTEXT_DIR),
            builder: BUILDER_PROFILE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_release_config() {
        let config = ReleaseConfig::default();
        assert_eq!(config.platforms, vec!["linux/amd64", "linux/arm64"]);
        assert_eq!(config.image, "patthomasrick/openapi2jsonschema:latest");
        assert_eq!(config.context_dir, PathBuf::from("docker-openapi2jsonschema"));
        assert_eq!(config.builder, "multiarch");
    }

    #[test]
    fn test_release_config_serializes_fixed_values() {
        let json = serde_json::to_value(ReleaseConfig::default()).unwrap();
        assert_eq!(json["image"], "patthomasrick/openapi2jsonschema:latest");
        assert_eq!(json["platforms"][1], "linux/arm64");
        assert_eq!(json["context_dir"], "docker-openapi2jsonschema");
    }
}
