//! Apps that are never intercepted.

use std::collections::HashSet;

/// Shell UI, launchers and system settings.
pub const SYSTEM_EXCLUSIONS: &[&str] = &[
    "com.android.systemui",
    "com.android.launcher",
    "com.android.launcher3",
    "com.google.android.apps.nexuslauncher",
    "com.sec.android.app.launcher",
    "com.miui.home",
    "com.android.settings",
];

/// Fixed allow-list checked before any configuration.
#[derive(Debug, Clone)]
pub struct ExclusionList {
    ids: HashSet<String>,
}

impl ExclusionList {
    /// Build the list for a guardian installed as `own_id`.
    pub fn new(own_id: &str) -> Self {
        let ids = SYSTEM_EXCLUSIONS
            .iter()
            .copied()
            .chain(std::iter::once(own_id))
            .map(str::to_string)
            .collect();
        Self { ids }
    }

    pub fn contains(&self, app_id: &str) -> bool {
        self.ids.contains(app_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl Default for ExclusionList {
    fn default() -> Self {
        Self::new(crate::GUARDIAN_APP_ID)
    }
}
