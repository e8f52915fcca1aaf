/// Clipboard polling
///
/// The poller reads the clipboard on a fixed interval and emits a search
/// whenever the text changes to something non-blank. It runs as a stream
/// feeding the UI loop through a channel and never touches display state.

use iced::futures::channel::mpsc;
use iced::futures::{SinkExt, Stream};
use std::time::Duration;
use tokio::task;
use tracing::{debug, info, warn};

use crate::error::LookupError;
use crate::state::data::SearchTerm;

/// Something the clipboard text can be read from
pub trait ClipboardSource: Clone + Send + 'static {
    /// Blocking read of the current clipboard text
    fn read_text(&self) -> Result<String, LookupError>;
}

/// The OS clipboard, opened fresh on every read
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSource for SystemClipboard {
    fn read_text(&self) -> Result<String, LookupError> {
        let mut clipboard = arboard::Clipboard::new()?;
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            // Images, files, or nothing at all: treat like empty text
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// What one poll tick produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// New non-blank text was copied
    Search(SearchTerm),
    /// The clipboard could not be read
    Failed(String),
}

/// Change detection over successive clipboard reads
#[derive(Debug, Default)]
pub struct ClipboardPoller {
    last_seen: Option<String>,
}

impl ClipboardPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the text present at start-up without searching for it
    pub fn prime(&mut self, read: Result<String, LookupError>) {
        match read {
            Ok(text) => self.last_seen = Some(text),
            Err(e) => warn!("⚠️  Initial clipboard read failed: {}", e),
        }
    }

    /// Feed one clipboard read and decide whether it is a new search
    pub fn observe(&mut self, read: Result<String, LookupError>) -> Option<PollEvent> {
        let text = match read {
            Ok(text) => text,
            Err(e) => {
                warn!("⚠️  Clipboard read failed: {}", e);
                return Some(PollEvent::Failed(format!("Clipboard read failed: {}", e)));
            }
        };

        if self.last_seen.as_deref() == Some(text.as_str()) {
            return None;
        }

        let term = SearchTerm::parse(&text)?;
        self.last_seen = Some(text);
        Some(PollEvent::Search(term))
    }
}

async fn read<S: ClipboardSource>(source: &S) -> Result<String, LookupError> {
    let source = source.clone();
    task::spawn_blocking(move || source.read_text())
        .await
        .map_err(LookupError::from)?
}

/// Poll `source` every `interval` for as long as the stream is alive
pub fn watch<S: ClipboardSource>(source: S, interval: Duration) -> impl Stream<Item = PollEvent> {
    iced::stream::channel(16, move |mut output: mpsc::Sender<PollEvent>| async move {
        let mut poller = ClipboardPoller::new();
        poller.prime(read(&source).await);
        info!("📋 Watching clipboard every {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            if let Some(event) = poller.observe(read(&source).await) {
                if let PollEvent::Search(term) = &event {
                    debug!("📋 Clipboard changed: '{}'", term);
                }
                if output.send(event).await.is_err() {
                    break;
                }
            }
        }
    })
}
