use indicatif::{ProgressBar, ProgressStyle};

/// バージョンごとの生成状況を表示するプログレスバー
pub struct GenerationProgress {
    progress_bar: ProgressBar,
}

impl GenerationProgress {
    pub fn new(total: usize) -> Self {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb.set_message("Generating schemas...");

        Self { progress_bar: pb }
    }

    pub fn start(&self, version: &str) {
        self.progress_bar.set_message(format!("{} ...", version));
    }

    pub fn succeeded(&self, version: &str) {
        self.progress_bar.inc(1);
        self.progress_bar.set_message(format!("{} ✓", version));
    }

    pub fn failed(&self, version: &str) {
        self.progress_bar.inc(1);
        self.progress_bar
            .println(format!("  ✗ {} の生成に失敗しました", version));
    }

    pub fn finish(&self, failed: usize) {
        if failed == 0 {
            self.progress_bar
                .finish_with_message("Generation completed ✓");
        } else {
            self.progress_bar
                .finish_with_message(format!("Generation finished with {} failure(s)", failed));
        }
    }
}
