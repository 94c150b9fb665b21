//! Self-protection capabilities.

/// Explanation shown when asking the user to grant device admin.
pub const ADMIN_EXPLANATION: &str = "Device Hub needs admin privileges to prevent unauthorized \
     uninstallation and protect your device.";

/// Warning returned when the user asks to disable device admin.
pub const ADMIN_DISABLE_WARNING: &str =
    "Warning: Disabling admin will allow restricted apps to be unblocked. Are you sure?";

/// A platform grant the guardian depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Receiving window-focus events.
    Accessibility,
    /// Reading app usage statistics.
    UsageStats,
    /// Uninstall protection.
    DeviceAdmin,
    /// Drawing over other apps.
    Overlay,
}

impl Capability {
    pub const ALL: [Self; 4] = [
        Self::Accessibility,
        Self::UsageStats,
        Self::DeviceAdmin,
        Self::Overlay,
    ];

    /// Name used in status reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Accessibility => "accessibility",
            Self::UsageStats => "usageStats",
            Self::DeviceAdmin => "deviceAdmin",
            Self::Overlay => "overlay",
        }
    }

    /// Text the user must confirm before giving `self` up, if any.
    pub fn revoke_warning(self) -> Option<&'static str> {
        match self {
            Self::DeviceAdmin => Some(ADMIN_DISABLE_WARNING),
            _ => None,
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = color_eyre::eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accessibility" => Ok(Self::Accessibility),
            "usage-stats" | "usageStats" | "usage_stats" => Ok(Self::UsageStats),
            "device-admin" | "deviceAdmin" | "device_admin" => Ok(Self::DeviceAdmin),
            "overlay" => Ok(Self::Overlay),
            other => Err(color_eyre::eyre::eyre!("unknown capability: {other}")),
        }
    }
}

/// Source of grant status for each capability.
pub trait CapabilityProvider: Send + Sync {
    /// Whether `capability` is currently granted.
    fn is_granted(&self, capability: Capability) -> bool;

    /// Open the settings surface where `capability` is granted.
    fn open_settings(&self, capability: Capability) -> color_eyre::eyre::Result<()>;
}

/// Grant status of all four capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub accessibility: bool,
    pub usage_stats: bool,
    pub device_admin: bool,
    pub overlay: bool,
}

impl ServiceStatus {
    pub fn get(&self, capability: Capability) -> bool {
        match capability {
            Capability::Accessibility => self.accessibility,
            Capability::UsageStats => self.usage_stats,
            Capability::DeviceAdmin => self.device_admin,
            Capability::Overlay => self.overlay,
        }
    }
}

/// Query every capability independently.
pub fn service_status<P: CapabilityProvider + ?Sized>(provider: &P) -> ServiceStatus {
    ServiceStatus {
        accessibility: provider.is_granted(Capability::Accessibility),
        usage_stats: provider.is_granted(Capability::UsageStats),
        device_admin: provider.is_granted(Capability::DeviceAdmin),
        overlay: provider.is_granted(Capability::Overlay),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Granted(&'static [Capability]);

    impl CapabilityProvider for Granted {
        fn is_granted(&self, capability: Capability) -> bool {
            self.0.contains(&capability)
        }

        fn open_settings(&self, _capability: Capability) -> color_eyre::eyre::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_status_is_independent() {
        let status = service_status(&Granted(&[Capability::UsageStats, Capability::Overlay]));
        assert_eq!(
            status,
            ServiceStatus {
                accessibility: false,
                usage_stats: true,
                device_admin: false,
                overlay: true,
            }
        );
        for capability in Capability::ALL {
            assert_eq!(
                status.get(capability),
                matches!(capability, Capability::UsageStats | Capability::Overlay)
            );
        }
    }

    #[test]
    fn test_capability_from_str() {
        assert_eq!("usage-stats".parse::<Capability>().unwrap(), Capability::UsageStats);
        assert_eq!("deviceAdmin".parse::<Capability>().unwrap(), Capability::DeviceAdmin);
        assert!("camera".parse::<Capability>().is_err());
    }

    #[test]
    fn test_only_device_admin_warns_on_revoke() {
        assert_eq!(
            Capability::DeviceAdmin.revoke_warning(),
            Some(ADMIN_DISABLE_WARNING)
        );
        for capability in [Capability::Accessibility, Capability::UsageStats, Capability::Overlay] {
            assert!(capability.revoke_warning().is_none());
        }
    }

    #[test]
    fn test_names_round_trip() {
        for capability in Capability::ALL {
            assert_eq!(capability.name().parse::<Capability>().unwrap(), capability);
        }
    }
}
