//! Kubernetes JSON スキーマの生成
//!
//! 公開済みの openapi2jsonschema イメージを使い、Kubernetes の各リリースの
//! OpenAPI 定義から JSON スキーマを生成します。

pub mod error;
pub mod format;
pub mod generator;
pub mod progress;
pub mod promote;
pub mod run;
pub mod tags;
pub mod version;

pub use error::{SchemaError, SchemaResult};
pub use format::{sort_json_files, sort_keys};
pub use generator::{SchemaGenerator, generator_args};
pub use progress::GenerationProgress;
pub use promote::{copy_dir_all, promote_latest_patches};
pub use run::{
    GenerateOptions, GenerationReport, Plan, default_jobs, generate_schemas, plan_versions,
    validate_output_dir,
};
pub use tags::{fetch_kubernetes_tags, parse_tag_refs};
pub use version::{ApiVersion, select_versions};
