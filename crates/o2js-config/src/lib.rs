//! o2js の固定設定
//!
//! リリース（マルチアーキテクチャイメージのビルド＆プッシュ）と
//! Kubernetes スキーマ生成で使う値は、すべてここでリテラルとして定義します。
//! 実行時のフラグや環境変数で上書きされることはありません。

pub mod release;
pub mod schema;

pub use release::ReleaseConfig;
pub use schema::SchemaConfig;

use serde::Serialize;

/// `o2js config` で表示する設定全体
#[derive(Debug, Clone, Default, Serialize)]
pub struct Settings {
    pub release: ReleaseConfig,
    pub schema: SchemaConfig,
}
