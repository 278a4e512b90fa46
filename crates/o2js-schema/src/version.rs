//! Kubernetes API バージョン（`vX.Y.Z`）の比較と選択

use crate::error::{SchemaError, SchemaResult};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// `v` で始まる数値ドット区切りのバージョン
///
/// 比較時は短い方を 0 で埋めるため、`v1.7` と `v1.7.0` は等しくなります。
#[derive(Debug, Clone)]
pub struct ApiVersion {
    raw: String,
    parts: Vec<u64>,
}

impl ApiVersion {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// マイナーバージョン（例: `v1.18.3` -> `v1.18`）
    pub fn minor(&self) -> String {
        self.raw.split('.').take(2).collect::<Vec<_>>().join(".")
    }
}

impl FromStr for ApiVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> SchemaResult<Self> {
        let parts = s
            .trim_matches('v')
            .split('.')
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| SchemaError::InvalidVersion(s.to_string()))?;

        Ok(Self {
            raw: s.to_string(),
            parts,
        })
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| {
                let a = self.parts.get(i).copied().unwrap_or(0);
                let b = other.parts.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ApiVersion {}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// タグ一覧から生成対象のバージョンを選ぶ
///
/// プレリリース（`-` を含むもの）を除き、`earliest..=latest` の範囲を昇順で返します。
/// 数値として解釈できないタグは警告を出して読み飛ばします。
pub fn select_versions(
    tags: &[String],
    earliest: &str,
    latest: &str,
) -> SchemaResult<Vec<ApiVersion>> {
    let earliest: ApiVersion = earliest.parse()?;
    let latest: ApiVersion = latest.parse()?;

    let mut versions: Vec<ApiVersion> = tags
        .iter()
        .filter(|t| !t.contains('-'))
        .filter_map(|t| match t.parse::<ApiVersion>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Skipping tag: {}", e);
                None
            }
        })
        .filter(|v| *v >= earliest && *v <= latest)
        .collect();

    versions.sort();
    tracing::info!("Filtered Kubernetes API versions: {}", versions.len());
    tracing::debug!(
        "Versions: {}",
        versions
            .iter()
            .map(ApiVersion::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(versions)
}
