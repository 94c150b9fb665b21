//! Installed application listing for the configuration UI.

/// Apps hidden from the block-list picker besides the guardian itself.
const HIDDEN_APPS: &[&str] = &["com.android.settings", "com.android.systemui"];

/// One launchable app.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEntry {
    pub package_name: String,
    pub app_name: String,
    pub is_system_app: bool,
}

/// Enumerates installed apps.
pub trait AppCatalog: Send + Sync {
    fn installed_apps(&self) -> color_eyre::eyre::Result<Vec<AppEntry>>;
}

/// Apps the user may put on the block list, sorted by name.
pub fn launchable_apps<C: AppCatalog + ?Sized>(
    catalog: &C,
    own_id: &str,
) -> color_eyre::eyre::Result<Vec<AppEntry>> {
    let mut apps: Vec<AppEntry> = catalog
        .installed_apps()?
        .into_iter()
        .filter(|app| app.package_name != own_id && !HIDDEN_APPS.contains(&app.package_name.as_str()))
        .collect();

    apps.sort_by_cached_key(|app| app.app_name.to_lowercase());
    Ok(apps)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<AppEntry>);

    impl AppCatalog for Fixed {
        fn installed_apps(&self) -> color_eyre::eyre::Result<Vec<AppEntry>> {
            Ok(self.0.clone())
        }
    }

    fn app(package_name: &str, app_name: &str) -> AppEntry {
        AppEntry {
            package_name: package_name.into(),
            app_name: app_name.into(),
            is_system_app: false,
        }
    }

    #[test]
    fn test_filters_and_sorts() {
        let catalog = Fixed(vec![
            app("com.video.y", "video"),
            app("org.example.guardian", "Guardian"),
            app("com.android.settings", "Settings"),
            app("com.game.x", "Arcade"),
            app("com.android.systemui", "System UI"),
            app("com.chat.z", "Chat"),
        ]);

        let apps = launchable_apps(&catalog, "org.example.guardian").unwrap();
        let names: Vec<_> = apps.iter().map(|a| a.app_name.as_str()).collect();
        assert_eq!(names, vec!["Arcade", "Chat", "video"]);
    }
}
