use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const KUBERNETES_GIT_URL: &str = "https://raw.githubusercontent.com/kubernetes/kubernetes";
pub const KUBERNETES_TAGS_URL: &str =
    "https://api.github.com/repos/kubernetes/kubernetes/git/refs/tags";
pub const SCHEMA_REF_BASE_URL: &str = "https://patthomasrick.github.io/kubernetes-json-schema";
pub const EARLIEST_API_VERSION: &str = "v1.7.0";
pub const LATEST_API_VERSION: &str = "v2.0.0";
pub const OUTPUT_DIR: &str = "kubernetes-api";

/// 常に再生成するブランチ名
pub const MASTER: &str = "master";

/// スキーマ生成設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// swagger.json を取得する raw.githubusercontent.com のベース URL
    pub kubernetes_git_url: String,
    /// タグ一覧を取得する GitHub API
    pub tags_url: String,
    /// 生成スキーマの `$ref` に付けるプレフィックスのベース URL
    pub schema_ref_base_url: String,
    /// openapi2jsonschema を実行するイメージ
    pub generator_image: String,
    /// 対象とする最も古いバージョン（含む）
    pub earliest: String,
    /// 対象とする最も新しいバージョン（含む）
    pub latest: String,
    /// 作業ディレクトリからの相対出力先
    pub output_dir: PathBuf,
}

impl SchemaConfig {
    /// `version` の swagger.json の URL
    pub fn swagger_url(&self, version: &str) -> String {
        format!(
            "{}/{}/api/openapi-spec/swagger.json",
            self.kubernetes_git_url, version
        )
    }

    /// `version` の `_definitions.json` を指す `$ref` プレフィックス
    pub fn definitions_prefix(&self, version: &str) -> String {
        format!("{}/{}/_definitions.json", self.schema_ref_base_url, version)
    }

    /// `version` の出力ディレクトリ
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.output_dir.join(version)
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            kubernetes_git_url: KUBERNETES_GIT_URL.to_string(),
            tags_url: KUBERNETES_TAGS_URL.to_string(),
            schema_ref_base_url: SCHEMA_REF_BASE_URL.to_string(),
            generator_image: crate::release::IMAGE_REFERENCE.to_string(),
            earliest: EARLIEST_API_VERSION.to_string(),
            latest: LATEST_API_VERSION.to_string(),
            output_dir: PathBuf::from(OUTPUT_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swagger_url() {
        let config = SchemaConfig::default();
        assert_eq!(
            config.swagger_url("v1.18.0"),
            "https://raw.githubusercontent.com/kubernetes/kubernetes/v1.18.0/api/openapi-spec/swagger.json"
        );
    }

    #[test]
    fn test_definitions_prefix() {
        let config = SchemaConfig::default();
        assert_eq!(
            config.definitions_prefix("master"),
            "https://patthomasrick.github.io/kubernetes-json-schema/master/_definitions.json"
        );
    }

    #[test]
    fn test_generator_uses_published_image() {
        let config = SchemaConfig::default();
        assert_eq!(config.generator_image, crate::release::IMAGE_REFERENCE);
        assert_eq!(config.version_dir("v1.7.0"), PathBuf::from("kubernetes-api/v1.7.0"));
    }
}
