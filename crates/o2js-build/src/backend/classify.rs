//! バックエンド出力からの失敗分類
//!
//! buildx はビルドとプッシュを一つのコマンドで行うため、失敗がどの段階で
//! 起きたかは出力から判断します。

use crate::error::BuildError;
use std::collections::VecDeque;

const TAIL_LINES: usize = 200;

/// プッシュ段階に入ったことを示す出力
const PUSH_PHASE_MARKERS: &[&str] = &["pushing layers", "pushing manifest"];

/// プッシュの失敗を示すエラー文言
///
/// `unauthorized` などの認証エラーはベースイメージの取得時にも出る。
const PUSH_ERROR_MARKERS: &[&str] = &["failed to push", "push access denied"];

/// ビルド段階（ソースイメージの解決）の失敗を示すエラー文言
const BUILD_ERROR_MARKERS: &[&str] = &["failed to resolve source metadata", "load metadata for"];

/// ビルダー／デーモンに到達できないことを示すエラー文言
const PROFILE_ERROR_MARKERS: &[&str] = &[
    "no builder",
    "cannot connect to the docker daemon",
    "failed to find driver",
];

/// 実行中に観測した出力
#[derive(Debug, Default)]
pub struct BackendOutput {
    tail: VecDeque<String>,
    push_started: bool,
}

impl BackendOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1行を記録（末尾 TAIL_LINES 行だけを保持）
    pub fn record(&mut self, line: &str) {
        let lower = line.to_lowercase();
        if PUSH_PHASE_MARKERS.iter().any(|m| lower.contains(m)) {
            self.push_started = true;
        }

        if self.tail.len() == TAIL_LINES {
            self.tail.pop_front();
        }
        self.tail.push_back(line.to_string());
    }

    pub fn push_started(&self) -> bool {
        self.push_started
    }

    /// 失敗の要約（最後の `ERROR:` 行、なければ最後の空でない行）
    pub fn summary(&self) -> Option<String> {
        self.tail
            .iter()
            .rev()
            .find(|l| l.trim_start().starts_with("ERROR"))
            .or_else(|| self.tail.iter().rev().find(|l| !l.trim().is_empty()))
            .map(|l| l.trim().to_string())
    }

    /// 非ゼロ終了を BuildError に分類
    pub fn classify(&self, profile: &str, exit_code: Option<i32>) -> BuildError {
        let message = self.summary().unwrap_or_else(|| match exit_code {
            Some(code) => format!("docker buildx exited with status {}", code),
            None => "docker buildx was terminated by a signal".to_string(),
        });

        let error_lines: Vec<String> = self
            .tail
            .iter()
            .filter(|l| l.to_lowercase().contains("error"))
            .map(|l| l.to_lowercase())
            .collect();
        let mentions = |markers: &[&str]| {
            error_lines
                .iter()
                .any(|l| markers.iter().any(|m| l.contains(m)))
        };

        if mentions(PROFILE_ERROR_MARKERS) {
            BuildError::ProfileUnavailable {
                profile: profile.to_string(),
                message,
            }
        } else if mentions(BUILD_ERROR_MARKERS) {
            BuildError::BuildFailed(message)
        } else if self.push_started || mentions(PUSH_ERROR_MARKERS) {
            BuildError::PushFailed { message }
        } else {
            BuildError::BuildFailed(message)
        }
    }
}
