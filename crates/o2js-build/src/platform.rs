//! ビルド対象プラットフォーム
//!
//! buildx の `--platform` に渡す `os/arch[/variant]` を検証します。

use crate::error::{BuildError, BuildResult};
use std::fmt;
use std::str::FromStr;

const KNOWN_OS: &[&str] = &["linux", "windows", "darwin", "freebsd"];
const KNOWN_ARCH: &[&str] = &[
    "amd64", "arm64", "arm", "386", "ppc64le", "s390x", "riscv64", "mips64le",
];

/// `os/arch[/variant]` の組
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
    pub variant: Option<String>,
}

impl FromStr for Platform {
    type Err = BuildError;

    fn from_str(s: &str) -> BuildResult<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        let (os, arch, variant) = match parts.as_slice() {
            [os, arch] => (*os, *arch, None),
            [os, arch, variant] if !variant.is_empty() => (*os, *arch, Some(variant.to_string())),
            _ => {
                return Err(BuildError::InvalidPlatform(format!(
                    "'{}' is not of the form os/arch",
                    s
                )));
            }
        };

        if !KNOWN_OS.contains(&os) {
            return Err(BuildError::InvalidPlatform(format!(
                "unknown operating system '{}' in '{}'",
                os, s
            )));
        }
        if !KNOWN_ARCH.contains(&arch) {
            return Err(BuildError::InvalidPlatform(format!(
                "unknown architecture '{}' in '{}'",
                arch, s
            )));
        }

        Ok(Self {
            os: os.to_string(),
            arch: arch.to_string(),
            variant,
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{}/{}/{}", self.os, self.arch, variant),
            None => write!(f, "{}/{}", self.os, self.arch),
        }
    }
}

/// 順序付きで重複のないプラットフォーム集合（1件以上）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet(Vec<Platform>);

impl TargetSet {
    /// 文字列のリストから構築
    ///
    /// 重複は最初の出現だけを残します。
    pub fn parse<S: AsRef<str>>(platforms: &[S]) -> BuildResult<Self> {
        let mut set: Vec<Platform> = Vec::with_capacity(platforms.len());
        for raw in platforms {
            let platform: Platform = raw.as_ref().parse()?;
            if !set.contains(&platform) {
                set.push(platform);
            }
        }

        if set.is_empty() {
            return Err(BuildError::InvalidConfig(
                "at least one target platform is required".to_string(),
            ));
        }

        Ok(Self(set))
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `--platform` 引数の値（カンマ区切り）
    pub fn to_arg(&self) -> String {
        self.0
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
