//! openapi2jsonschema イメージのリリース処理
//!
//! 実行ファイル自身のディレクトリを基準にビルドコンテキストを解決し、
//! `docker buildx` でマルチプラットフォームイメージをビルドしてレジストリへ
//! プッシュします。いずれかのステップが失敗した時点で処理を打ち切ります。

pub mod backend;
pub mod context;
pub mod error;
pub mod invocation;
pub mod pipeline;
pub mod platform;
pub mod reference;

pub use backend::{BuildRequest, BuildxBackend, ImageBackend, PublishedImage};
pub use context::resolve_build_context;
pub use error::{BuildError, BuildResult};
pub use invocation::{InvocationContext, resolve_invocation_directory};
pub use pipeline::{ReleasePipeline, ReleaseStep};
pub use platform::{Platform, TargetSet};
pub use reference::{ImageReference, split_image_tag};
