//! Capability probes backed by platform shell tools.

use color_eyre::eyre::WrapErr as _;
use guardian_core::capability::{ADMIN_EXPLANATION, Capability, CapabilityProvider};
use guardian_core::dispatcher::LaunchFlags;
use std::process::{Command, Stdio};
use tracing::debug;

use crate::config::ServiceConfig;

const USAGE_STATS_OP: &str = "GET_USAGE_STATS";
const OVERLAY_OP: &str = "SYSTEM_ALERT_WINDOW";

/// Reads grant status via `settings`, `appops` and `dumpsys`.
#[derive(Debug, Clone)]
pub struct ShellCapabilities {
    package: String,
    service_class: String,
    admin_component: String,
}

impl ShellCapabilities {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            package: config.package.clone(),
            service_class: config.service_class.clone(),
            admin_component: config.admin_component.clone(),
        }
    }

    fn probe(&self, capability: Capability) -> color_eyre::eyre::Result<bool> {
        let granted = match capability {
            Capability::Accessibility => {
                let out = run("settings", &["get", "secure", "enabled_accessibility_services"])?;
                accessibility_enabled(&out, &self.package, &self.service_class)
            }
            Capability::UsageStats => {
                let out = run("appops", &["get", &self.package, USAGE_STATS_OP])?;
                appop_allowed(&out, USAGE_STATS_OP)
            }
            Capability::Overlay => {
                let out = run("appops", &["get", &self.package, OVERLAY_OP])?;
                appop_allowed(&out, OVERLAY_OP)
            }
            Capability::DeviceAdmin => {
                let out = run("dumpsys", &["device_policy"])?;
                admin_active(&out, &self.admin_component)
            }
        };
        Ok(granted)
    }

    fn settings_args(&self, capability: Capability) -> Vec<String> {
        let mut args: Vec<String> = vec!["start".into(), "-a".into()];
        match capability {
            Capability::Accessibility => {
                args.push("android.settings.ACCESSIBILITY_SETTINGS".into());
            }
            Capability::UsageStats => {
                args.push("android.settings.USAGE_ACCESS_SETTINGS".into());
            }
            Capability::Overlay => {
                args.push("android.settings.action.MANAGE_OVERLAY_PERMISSION".into());
                args.push("-d".into());
                args.push(format!("package:{}", self.package));
            }
            Capability::DeviceAdmin => {
                args.push("android.app.action.ADD_DEVICE_ADMIN".into());
                args.push("--ecn".into());
                args.push("android.app.extra.DEVICE_ADMIN".into());
                args.push(self.admin_component.clone());
                args.push("--es".into());
                args.push("android.app.extra.ADD_EXPLANATION".into());
                args.push(ADMIN_EXPLANATION.into());
            }
        }
        args.push("-f".into());
        args.push(format!("0x{:08x}", LaunchFlags::NEW_TASK_ONLY.bits()));
        args
    }
}

impl CapabilityProvider for ShellCapabilities {
    fn is_granted(&self, capability: Capability) -> bool {
        match self.probe(capability) {
            Ok(granted) => granted,
            Err(e) => {
                debug!(capability = capability.name(), error = %e, "capability probe failed");
                false
            }
        }
    }

    fn open_settings(&self, capability: Capability) -> color_eyre::eyre::Result<()> {
        let args = self.settings_args(capability);
        let status = Command::new("am")
            .args(&args)
            .stdout(Stdio::null())
            .status()
            .wrap_err("failed to run am")?;

        if !status.success() {
            color_eyre::eyre::bail!("am exited with {}", status);
        }
        Ok(())
    }
}

fn run(program: &str, args: &[&str]) -> color_eyre::eyre::Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .wrap_err_with(|| format!("failed to run {}", program))?;

    if !output.status.success() {
        color_eyre::eyre::bail!("{} exited with {}", program, output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether `<package>/<class>` appears in the enabled-services setting.
fn accessibility_enabled(setting: &str, package: &str, class: &str) -> bool {
    let service = format!("{}/{}", package, class);
    setting.contains(&service)
}

/// Whether `op` is in mode `allow` in `appops get` output.
fn appop_allowed(output: &str, op: &str) -> bool {
    output.lines().any(|line| {
        line.trim()
            .strip_prefix(op)
            .and_then(|rest| rest.strip_prefix(':'))
            .is_some_and(|mode| mode.trim_start().starts_with("allow"))
    })
}

/// Whether the admin component is listed in `dumpsys device_policy`.
///
/// Accepts the short (`pkg/.Class`) and full (`pkg/pkg.Class`) forms.
fn admin_active(output: &str, component: &str) -> bool {
    let full = match component.split_once('/') {
        Some((package, class)) if class.starts_with('.') => format!("{}/{}{}", package, package, class),
        _ => component.to_string(),
    };
    output.contains(component) || output.contains(&full)
}
