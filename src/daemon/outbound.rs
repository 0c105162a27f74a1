use std::path::PathBuf;

use tokio::sync::watch;

use crate::domain::daemon::outbound::DisplayPort;

/// A [`DisplayPort`] implementation which logs every title change and
/// optionally mirrors the title text into a file for status bars to poll.
///
/// File writes happen on a background task fed through a latest-wins
/// channel, so `set_title` and `clear_title` never touch the disk.
#[derive(Debug, Default)]
pub struct TitleDisplay {
    mirror: Option<watch::Sender<String>>,
}

impl TitleDisplay {
    /// Creates a new [`TitleDisplay`]. Nothing is written to disk if `file`
    /// is `None`; otherwise the writer task is spawned on the current tokio
    /// runtime.
    pub fn new(file: Option<PathBuf>) -> Self {
        let mirror = file.map(|path| {
            let (sender, receiver) = watch::channel(String::new());
            tokio::spawn(mirror_title(path, receiver));
            sender
        });
        Self { mirror }
    }

    fn write(&self, text: &str) {
        if let Some(mirror) = &self.mirror {
            mirror.send_replace(text.to_owned());
        }
    }
}

/// Writes each new title into `path` until the [`TitleDisplay`] is dropped.
async fn mirror_title(path: PathBuf, mut titles: watch::Receiver<String>) {
    while titles.changed().await.is_ok() {
        let text = titles.borrow_and_update().clone();
        if let Err(err) = tokio::fs::write(&path, text).await {
            tracing::warn!(path = %path.display(), %err, "Could not write title file");
        }
    }
}

impl DisplayPort for TitleDisplay {
    fn set_title(&self, text: &str) {
        tracing::info!(title = text, "Title changed");
        self.write(text);
    }

    fn clear_title(&self) {
        tracing::info!("Title cleared");
        self.write("");
    }
}
