//! 生成された JSON のキーを整列して書き直す
//!
//! バージョン間の差分が意味のある変更だけになるよう、キー順と
//! インデント（2スペース）を揃えます。

use crate::error::{SchemaError, SchemaResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// ディレクトリ直下の `*.json` を整列する
///
/// 個々のファイルの失敗はログに残して続行し、整列できた件数を返します。
pub fn sort_json_files(dir: &Path) -> SchemaResult<usize> {
    if !dir.is_dir() {
        return Err(SchemaError::NotFound(dir.to_path_buf()));
    }

    let mut sorted = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") || !path.is_file() {
            continue;
        }

        match sort_json_file(&path) {
            Ok(()) => sorted += 1,
            Err(e) => tracing::error!("Failed to sort {}: {}", path.display(), e),
        }
    }

    tracing::info!("Sorted {} JSON files in {}", sorted, dir.display());
    Ok(sorted)
}

fn sort_json_file(path: &Path) -> SchemaResult<()> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let mut output = serde_json::to_string_pretty(&sort_keys(value))?;
    output.push('\n');
    fs::write(path, output)?;
    Ok(())
}

/// オブジェクトのキーを再帰的に昇順へ並べ替える
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sort_keys_nested() {
        let value: Value =
            serde_json::from_str(r#"{"b": 1, "a": {"z": [{"y": 1, "x": 2}], "m": null}}"#).unwrap();
        let text = serde_json::to_string(&sort_keys(value)).unwrap();
        assert_eq!(text, r#"{"a":{"m":null,"z":[{"x":2,"y":1}]},"b":1}"#);
    }

    #[test]
    fn test_sort_json_files() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("deployment.json"),
            r#"{"type": "object", "description": "Deployment"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "{\"b\":1,\"a\":2}").unwrap();

        let sorted = sort_json_files(dir.path()).unwrap();
        assert_eq!(sorted, 1);

        let content = fs::read_to_string(dir.path().join("deployment.json")).unwrap();
        assert_eq!(
            content,
            "{\n  \"description\": \"Deployment\",\n  \"type\": \"object\"\n}\n"
        );
        // 対象外のファイルは変更しない
        assert_eq!(
            fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "{\"b\":1,\"a\":2}"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("broken.json")).unwrap(),
            "{not json"
        );
    }

    #[test]
    fn test_sort_json_files_missing_dir() {
        let dir = tempdir().unwrap();
        let result = sort_json_files(&dir.path().join("v1.7.0"));
        assert!(matches!(result, Err(SchemaError::NotFound(_))));
    }
}
