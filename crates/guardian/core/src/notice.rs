//! Blocking notice shown in place of a blocked app.
//!
//! The text is flavor only. What matters is that every way out of the
//! notice lands on the home screen.

use rand::Rng;

const WAIT_ESTIMATES: &[&str] = &[
    "2 hours 30 minutes",
    "4 hours 15 minutes",
    "5 hours 45 minutes",
    "6 hours 10 minutes",
    "8 hours 20 minutes",
    "10 hours 30 minutes",
    "12 hours",
    "3 hours 50 minutes",
    "7 hours 25 minutes",
    "1 hour 45 minutes",
];

const FALLBACK_APP_NAME: &str = "this app";

/// Text content of one notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeContent {
    pub app_name: String,
    pub wait_estimate: &'static str,
    pub error_code: String,
}

impl NoticeContent {
    /// Generate content for `app_name`, or a generic name when unknown.
    pub fn generate<R: Rng + ?Sized>(app_name: Option<&str>, rng: &mut R) -> Self {
        let wait_estimate = WAIT_ESTIMATES[rng.gen_range(0..WAIT_ESTIMATES.len())];
        let error_code = format!(
            "ERR_{}_SRV_{}",
            rng.gen_range(100..999),
            rng.gen_range(10..99)
        );

        Self {
            app_name: app_name.unwrap_or(FALLBACK_APP_NAME).to_string(),
            wait_estimate,
            error_code,
        }
    }

    pub fn title(&self) -> &'static str {
        "Server Unavailable"
    }

    pub fn message(&self) -> String {
        format!(
            "Sorry, {} servers are currently experiencing issues. \
             Our team is working to resolve this as quickly as possible.",
            self.app_name
        )
    }
}

/// Ways the user can try to leave the notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeAction {
    Back,
    TryAgain,
    ContactSupport,
}

/// The device home screen.
pub trait HomeSurface: Send + Sync {
    fn go_home(&self) -> color_eyre::eyre::Result<()>;
}

/// A notice covering one blocked app.
#[derive(Debug)]
pub struct BlockingNotice {
    blocked_app_id: String,
    content: NoticeContent,
    finished: bool,
}

impl BlockingNotice {
    pub fn new(blocked_app_id: impl Into<String>, content: NoticeContent) -> Self {
        Self {
            blocked_app_id: blocked_app_id.into(),
            content,
            finished: false,
        }
    }

    pub fn content(&self) -> &NoticeContent {
        &self.content
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Leave the notice. Every action goes home, never back to the blocked app.
    pub fn escape<H: HomeSurface + ?Sized>(&mut self, action: EscapeAction, home: &H) {
        tracing::debug!(app_id = %self.blocked_app_id, ?action, "leaving blocking notice");

        if let Err(e) = home.go_home() {
            tracing::warn!(error = %e, "failed to return to home screen");
        }
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHome(AtomicUsize);

    impl HomeSurface for CountingHome {
        fn go_home(&self) -> color_eyre::eyre::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct BrokenHome;

    impl HomeSurface for BrokenHome {
        fn go_home(&self) -> color_eyre::eyre::Result<()> {
            Err(eyre!("no launcher"))
        }
    }

    #[test]
    fn test_generated_content_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let content = NoticeContent::generate(Some("Arcade"), &mut rng);
            assert!(WAIT_ESTIMATES.contains(&content.wait_estimate));

            let code = content.error_code.strip_prefix("ERR_").unwrap();
            let (major, minor) = code.split_once("_SRV_").unwrap();
            assert!((100..999).contains(&major.parse::<u32>().unwrap()));
            assert!((10..99).contains(&minor.parse::<u32>().unwrap()));
        }
    }

    #[test]
    fn test_fallback_name() {
        let mut rng = StdRng::seed_from_u64(1);
        let content = NoticeContent::generate(None, &mut rng);
        assert!(content.message().starts_with("Sorry, this app servers"));
    }

    #[test]
    fn test_every_escape_goes_home() {
        let mut rng = StdRng::seed_from_u64(3);
        let home = CountingHome::default();

        for action in [EscapeAction::Back, EscapeAction::TryAgain, EscapeAction::ContactSupport] {
            let mut notice =
                BlockingNotice::new("com.game.x", NoticeContent::generate(None, &mut rng));
            notice.escape(action, &home);
            assert!(notice.is_finished());
        }
        assert_eq!(home.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_notice_ends_even_if_home_fails() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut notice = BlockingNotice::new("com.game.x", NoticeContent::generate(None, &mut rng));
        notice.escape(EscapeAction::Back, &BrokenHome);
        assert!(notice.is_finished());
    }

    #[test]
    fn test_notice_names_blocked_app() {
        let mut rng = StdRng::seed_from_u64(7);
        let notice = BlockingNotice::new(
            "com.game.x",
            NoticeContent::generate(Some("com.game.x"), &mut rng),
        );
        assert_eq!(notice.content().app_name, "com.game.x");
        assert!(notice.content().message().contains("com.game.x"));
        assert!(!notice.is_finished());
    }
}
