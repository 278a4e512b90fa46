//! イメージ参照（`[registry/]repository:tag`）の解析と検証

use crate::error::{BuildError, BuildResult};
use std::fmt;
use std::str::FromStr;

/// 公開先イメージの参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// レジストリ込みのリポジトリ名（タグなし）
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    /// リポジトリ名からレジストリを抽出
    ///
    /// 先頭コンポーネントが `.` か `:` を含む、または `localhost` の場合のみ
    /// レジストリとみなします。それ以外は Docker Hub です。
    pub fn registry(&self) -> Option<&str> {
        let (first, rest) = self.repository.split_once('/')?;
        if !rest.is_empty() && is_registry_host(first) {
            Some(first)
        } else {
            None
        }
    }

    fn validate(&self) -> BuildResult<()> {
        validate_tag(&self.tag)?;

        let mut components: Vec<&str> = self.repository.split('/').collect();
        if let Some(registry) = self.registry() {
            validate_registry(registry)?;
            components.remove(0);
        }

        for component in components {
            validate_path_component(component, &self.repository)?;
        }

        Ok(())
    }
}

impl FromStr for ImageReference {
    type Err = BuildError;

    fn from_str(s: &str) -> BuildResult<Self> {
        if s.is_empty() {
            return Err(BuildError::InvalidReference("(empty)".to_string()));
        }
        if s.contains('@') {
            return Err(BuildError::InvalidReference(format!(
                "digest references cannot be pushed by tag: {}",
                s
            )));
        }

        let (repository, tag) = split_image_tag(s);
        let reference = Self { repository, tag };
        reference.validate()?;
        Ok(reference)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// イメージ名とタグを分離
///
/// # Examples
/// - `patthomasrick/openapi2jsonschema:latest` -> `("patthomasrick/openapi2jsonschema", "latest")`
/// - `ghcr.io/org/app` -> `("ghcr.io/org/app", "latest")`
/// - `localhost:5000/app:dev` -> `("localhost:5000/app", "dev")`
pub fn split_image_tag(image: &str) -> (String, String) {
    if let Some(pos) = image.rfind(':') {
        let potential_tag = &image[pos + 1..];
        let potential_image = &image[..pos];

        // ポート番号は / を含まない純粋な数字で、後ろにパスが続く
        if !potential_tag.contains('/') && !potential_tag.chars().all(|c| c.is_ascii_digit()) {
            return (potential_image.to_string(), potential_tag.to_string());
        }
    }

    (image.to_string(), "latest".to_string())
}

fn is_registry_host(component: &str) -> bool {
    component.contains('.') || component.contains(':') || component == "localhost"
}

/// タグのバリデーション
///
/// - 128文字以下
/// - 英数字、ピリオド、ハイフン、アンダースコアのみ
/// - 先頭はピリオドまたはハイフンではない
fn validate_tag(tag: &str) -> BuildResult<()> {
    if tag.is_empty() {
        return Err(BuildError::InvalidReference("empty tag".to_string()));
    }

    if tag.len() > 128 {
        return Err(BuildError::InvalidReference(format!(
            "tag too long ({} characters, max 128)",
            tag.len()
        )));
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(BuildError::InvalidReference(format!(
            "tag may not start with '.' or '-': {}",
            tag
        )));
    }

    if let Some(c) = tag
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-' && *c != '_')
    {
        return Err(BuildError::InvalidReference(format!(
            "invalid character '{}' in tag: {}",
            c, tag
        )));
    }

    Ok(())
}

fn validate_registry(registry: &str) -> BuildResult<()> {
    let (host, port) = match registry.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (registry, None),
    };

    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let port_ok = port.is_none_or(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

    if host_ok && port_ok {
        Ok(())
    } else {
        Err(BuildError::InvalidReference(format!(
            "invalid registry host: {}",
            registry
        )))
    }
}

/// リポジトリのパスコンポーネント
///
/// 小文字英数字を区切り文字（`.` `_` `-`）でつないだもの。先頭と末尾は英数字。
fn validate_path_component(component: &str, repository: &str) -> BuildResult<()> {
    let valid_chars = component.chars().all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' || c == '-'
    });
    let starts_ok = component
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    let ends_ok = component
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_alphanumeric());

    if valid_chars && starts_ok && ends_ok {
        Ok(())
    } else {
        Err(BuildError::InvalidReference(format!(
            "invalid repository component '{}' in {}",
            component, repository
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_image_tag_with_tag() {
        let (image, tag) = split_image_tag("ghcr.io/org/app:v1.0");
        assert_eq!(image, "ghcr.io/org/app");
        assert_eq!(tag, "v1.0");
    }

    #[test]
    fn test_split_image_tag_without_tag() {
        let (image, tag) = split_image_tag("ghcr.io/org/app");
        assert_eq!(image, "ghcr.io/org/app");
        assert_eq!(tag, "latest");
    }

    #[test]
    fn test_split_image_tag_with_port() {
        let (image, tag) = split_image_tag("localhost:5000/app");
        assert_eq!(image, "localhost:5000/app");
        assert_eq!(tag, "latest");
    }

    #[test]
    fn test_split_image_tag_with_port_and_tag() {
        let (image, tag) = split_image_tag("localhost:5000/app:dev");
        assert_eq!(image, "localhost:5000/app");
        assert_eq!(tag, "dev");
    }

    #[test]
    fn test_parse_release_reference() {
        let reference: ImageReference = "patthomasrick/openapi2jsonschema:latest".parse().unwrap();
        assert_eq!(reference.repository, "patthomasrick/openapi2jsonschema");
        assert_eq!(reference.tag, "latest");
        assert_eq!(reference.registry(), None);
        assert_eq!(reference.to_string(), "patthomasrick/openapi2jsonschema:latest");
    }

    #[test]
    fn test_registry_detection() {
        let reference: ImageReference = "ghcr.io/org/app:v1".parse().unwrap();
        assert_eq!(reference.registry(), Some("ghcr.io"));

        let reference: ImageReference = "localhost:5000/app".parse().unwrap();
        assert_eq!(reference.registry(), Some("localhost:5000"));
    }

    #[test]
    fn test_rejects_uppercase_repository() {
        let result = "PattHomasRick/openapi2jsonschema:latest".parse::<ImageReference>();
        assert!(matches!(result, Err(BuildError::InvalidReference(_))));
    }

    #[test]
    fn test_rejects_bad_tags() {
        assert!("app:-bad".parse::<ImageReference>().is_err());
        assert!("app:bad!".parse::<ImageReference>().is_err());
        let long = format!("app:{}", "a".repeat(129));
        assert!(long.parse::<ImageReference>().is_err());
    }

    #[test]
    fn test_rejects_empty_and_digest() {
        assert!("".parse::<ImageReference>().is_err());
        assert!("app@sha256:abcd".parse::<ImageReference>().is_err());
        assert!("org//app:latest".parse::<ImageReference>().is_err());
    }
}
