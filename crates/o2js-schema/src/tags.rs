//! GitHub API から Kubernetes のリリースタグを取得

use crate::error::{SchemaError, SchemaResult};
use serde::Deserialize;

const TAG_PREFIX: &str = "refs/tags/";

#[derive(Debug, Deserialize)]
struct GitRef {
    #[serde(rename = "ref")]
    name: String,
}

/// タグ一覧を取得（`v1` で始まるもののみ、`refs/tags/` は除去）
pub async fn fetch_kubernetes_tags(client: &reqwest::Client, url: &str) -> SchemaResult<Vec<String>> {
    tracing::debug!("Fetching tags from {}", url);

    let response = client
        .get(url)
        .header("User-Agent", "o2js")
        .header("Accept", "application/vnd.github+json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SchemaError::Api {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    let tags = parse_tag_refs(&body)?;
    tracing::info!("Found {} Kubernetes API versions.", tags.len());
    Ok(tags)
}

/// `git/refs/tags` のレスポンスを解析
pub fn parse_tag_refs(body: &str) -> SchemaResult<Vec<String>> {
    let refs: Vec<GitRef> = serde_json::from_str(body)?;
    Ok(refs
        .into_iter()
        .filter_map(|r| {
            r.name
                .strip_prefix(TAG_PREFIX)
                .filter(|tag| tag.starts_with("v1"))
                .map(String::from)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_refs() {
        let body = r#"[
            {"ref": "refs/tags/v0.21.0", "object": {"sha": "aaa"}},
            {"ref": "refs/tags/v1.7.0", "object": {"sha": "bbb"}},
            {"ref": "refs/tags/v1.18.0-rc.1", "object": {"sha": "ccc"}},
            {"ref": "refs/heads/v1.99.0"}
        ]"#;

        let tags = parse_tag_refs(body).unwrap();
        assert_eq!(tags, vec!["v1.7.0", "v1.18.0-rc.1"]);
    }

    #[test]
    fn test_parse_tag_refs_rejects_non_array() {
        let body = r#"{"message": "API rate limit exceeded"}"#;
        assert!(matches!(parse_tag_refs(body), Err(SchemaError::Json(_))));
    }
}
