//! Foreground event feed from the platform accessibility bridge.

use guardian_core::ForegroundEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, Lines};
use tracing::{debug, trace};

/// Stream of foreground-change events, delivered one at a time.
#[trait_variant::make(Send)]
pub trait EventSource {
    /// Next event, or `None` once the feed has closed.
    async fn next_event(&mut self) -> std::io::Result<Option<ForegroundEvent>>;
}

/// Line-oriented feed: `<kind> [<app_id>]` per line.
pub struct LineFeed<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> LineFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl LineFeed<tokio::io::BufReader<tokio::io::Stdin>> {
    /// Feed read from the daemon's stdin.
    pub fn stdin() -> Self {
        Self::new(tokio::io::BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> EventSource for LineFeed<R> {
    async fn next_event(&mut self) -> std::io::Result<Option<ForegroundEvent>> {
        while let Some(line) = self.lines.next_line().await? {
            match ForegroundEvent::parse_line(&line) {
                Some(event) => {
                    trace!(?event, "foreground event");
                    return Ok(Some(event));
                }
                None => debug!("skipping blank event line"),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::EventKind;

    #[tokio::test]
    async fn test_line_feed() {
        let input = b"window_state_changed com.game.x\n\nview_focused com.chat.z\n32\n" as &[u8];
        let mut feed = LineFeed::new(input);

        assert_eq!(
            feed.next_event().await.unwrap(),
            Some(ForegroundEvent::focus("com.game.x"))
        );

        let other = feed.next_event().await.unwrap().unwrap();
        assert_eq!(other.kind, EventKind::Other);

        let bare = feed.next_event().await.unwrap().unwrap();
        assert_eq!(bare.kind, EventKind::WindowStateChanged);
        assert_eq!(bare.source_app_id, None);

        assert_eq!(feed.next_event().await.unwrap(), None);
    }
}
