//! Use case for saving a text selection directly (context menu)
//! 直接保存选中文本的用例（右键菜单）

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use sv_core::capture::is_capturable;
use sv_core::ports::{ClockPort, SnippetRepositoryPort};
use sv_core::snippet::{Snippet, Tag};
use tracing::{info, info_span, Instrument};

/// Creates a tagged snippet at the front without asking for consent.
pub struct CaptureSelection {
    snippets: Arc<dyn SnippetRepositoryPort>,
    clock: Arc<dyn ClockPort>,
    tag: Tag,
}

impl CaptureSelection {
    pub fn new(snippets: Arc<dyn SnippetRepositoryPort>, clock: Arc<dyn ClockPort>, tag: Tag) -> Self {
        Self {
            snippets,
            clock,
            tag,
        }
    }

    pub async fn execute(&self, text: String) -> Result<Snippet> {
        let span = info_span!("usecase.capture_selection.execute", len = text.len());

        async {
            if !is_capturable(&text) {
                bail!("selection is empty");
            }

            let snippet = Snippet::new(text, vec![self.tag.clone()], self.clock.now());
            self.snippets
                .prepend(snippet.clone())
                .await
                .context("failed to store captured selection")?;

            info!(id = %snippet.id, "selection captured");
            Ok(snippet)
        }
        .instrument(span)
        .await
    }
}
