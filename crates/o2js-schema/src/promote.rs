//! マイナーバージョンのディレクトリを最新パッチで更新
//!
//! `v1.18.3` が `v1.18` 系の最新なら、`v1.18.3/` の内容を `v1.18/` にコピーします。

use crate::error::SchemaResult;
use crate::version::ApiVersion;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 出力済みのバージョンについて、マイナーごとの最新パッチをコピー
///
/// 戻り値は `(minor, patch)` の組（マイナー名の昇順）。
pub fn promote_latest_patches(
    output_dir: &Path,
    versions: &[ApiVersion],
) -> SchemaResult<Vec<(String, String)>> {
    let mut latest: BTreeMap<String, &ApiVersion> = BTreeMap::new();

    for version in versions {
        if !output_dir.join(version.as_str()).is_dir() {
            continue;
        }
        latest
            .entry(version.minor())
            .and_modify(|current| {
                if version > *current {
                    *current = version;
                }
            })
            .or_insert(version);
    }

    tracing::debug!(
        "Minor version to latest patch mapping: {:?}",
        latest
            .iter()
            .map(|(minor, patch)| format!("{} -> {}", minor, patch))
            .collect::<Vec<_>>()
    );

    let mut promoted = Vec::with_capacity(latest.len());
    for (minor, patch) in latest {
        let source = output_dir.join(patch.as_str());
        let target = output_dir.join(&minor);

        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        copy_dir_all(&source, &target)?;

        tracing::info!(
            "Copied latest patch version {} to minor version {}",
            patch,
            minor
        );
        promoted.push((minor, patch.to_string()));
    }

    Ok(promoted)
}

/// ディレクトリを再帰的にコピー
pub fn copy_dir_all(source: &Path, target: &Path) -> std::io::Result<()> {
    fs::create_dir_all(target)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let dest = target.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), dest)?;
        }
    }
    Ok(())
}
