//! Foreground event classification.

use crate::config::BlockingConfig;
use crate::event::{EventKind, ForegroundEvent};
use crate::exclusion::ExclusionList;

/// Outcome of classifying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the app through.
    Pass,
    /// Seize the foreground from this app.
    Intercept(String),
}

impl Decision {
    pub fn is_intercept(&self) -> bool {
        matches!(self, Self::Intercept(_))
    }
}

/// Decide whether `event` must be intercepted.
///
/// Checks run cheapest first: event kind, source presence, exclusions, the
/// enabled flag, then block-set membership. App ids compare as exact,
/// case-sensitive strings.
pub fn classify(
    event: &ForegroundEvent,
    config: &BlockingConfig,
    exclusions: &ExclusionList,
) -> Decision {
    if event.kind != EventKind::WindowStateChanged {
        return Decision::Pass;
    }

    let Some(app_id) = event.source() else {
        return Decision::Pass;
    };

    if exclusions.contains(app_id) {
        return Decision::Pass;
    }

    if !config.enabled || config.blocked_ids.is_empty() {
        return Decision::Pass;
    }

    if config.blocked_ids.contains(app_id) {
        Decision::Intercept(app_id.to_string())
    } else {
        Decision::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_blocked_ids;
    use crate::exclusion::SYSTEM_EXCLUSIONS;

    fn config(enabled: bool, blocked: &str) -> BlockingConfig {
        BlockingConfig {
            enabled,
            blocked_ids: parse_blocked_ids(blocked),
        }
    }

    #[test]
    fn test_blocked_app_intercepted() {
        let decision = classify(
            &ForegroundEvent::focus("com.game.x"),
            &config(true, "com.game.x"),
            &ExclusionList::default(),
        );
        assert_eq!(decision, Decision::Intercept("com.game.x".into()));
    }

    #[test]
    fn test_system_ui_passes() {
        let decision = classify(
            &ForegroundEvent::focus("com.android.systemui"),
            &config(true, "com.game.x"),
            &ExclusionList::default(),
        );
        assert_eq!(decision, Decision::Pass);
    }

    #[test]
    fn test_empty_block_list_passes() {
        let exclusions = ExclusionList::default();
        for app in ["com.game.x", "com.other", "org.example"] {
            let decision = classify(&ForegroundEvent::focus(app), &config(true, ""), &exclusions);
            assert_eq!(decision, Decision::Pass);
        }
    }

    #[test]
    fn test_disabled_passes() {
        let decision = classify(
            &ForegroundEvent::focus("com.game.x"),
            &config(false, "com.game.x"),
            &ExclusionList::default(),
        );
        assert_eq!(decision, Decision::Pass);
    }

    #[test]
    fn test_other_kind_passes() {
        let event = ForegroundEvent {
            source_app_id: Some("com.game.x".into()),
            kind: EventKind::Other,
        };
        let decision = classify(&event, &config(true, "com.game.x"), &ExclusionList::default());
        assert_eq!(decision, Decision::Pass);
    }

    #[test]
    fn test_missing_source_passes() {
        let exclusions = ExclusionList::default();
        for source in [None, Some(String::new())] {
            let event = ForegroundEvent {
                source_app_id: source,
                kind: EventKind::WindowStateChanged,
            };
            assert_eq!(classify(&event, &config(true, "com.game.x"), &exclusions), Decision::Pass);
        }
    }

    #[test]
    fn test_exclusion_beats_membership() {
        let exclusions = ExclusionList::new("org.example.guardian");
        let ids = SYSTEM_EXCLUSIONS
            .iter()
            .copied()
            .chain(["org.example.guardian"]);

        for id in ids {
            let decision = classify(&ForegroundEvent::focus(id), &config(true, id), &exclusions);
            assert_eq!(decision, Decision::Pass, "{id} must never be intercepted");
        }
    }

    #[test]
    fn test_case_sensitive_match() {
        let decision = classify(
            &ForegroundEvent::focus("com.Game.X"),
            &config(true, "com.game.x"),
            &ExclusionList::default(),
        );
        assert_eq!(decision, Decision::Pass);
    }

    #[test]
    fn test_same_input_same_decision() {
        let event = ForegroundEvent::focus("com.game.x");
        let config = config(true, "com.game.x, com.video.y");
        let exclusions = ExclusionList::default();

        let first = classify(&event, &config, &exclusions);
        let second = classify(&event, &config, &exclusions);
        assert_eq!(first, second);
        assert!(first.is_intercept());
    }
}
