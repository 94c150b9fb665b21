//! Installed app enumeration via the package manager.

use color_eyre::eyre::WrapErr as _;
use guardian_core::catalog::{AppCatalog, AppEntry};
use std::collections::{BTreeSet, HashSet};
use std::process::Command;

/// Lists launcher activities with `cmd package` and marks system apps with `pm`.
///
/// Shell tools expose no labels, so the package id doubles as the name.
#[derive(Debug, Clone, Default)]
pub struct ShellCatalog;

impl AppCatalog for ShellCatalog {
    fn installed_apps(&self) -> color_eyre::eyre::Result<Vec<AppEntry>> {
        let launchers = run(
            "cmd",
            &[
                "package",
                "query-activities",
                "--brief",
                "-a",
                "android.intent.action.MAIN",
                "-c",
                "android.intent.category.LAUNCHER",
            ],
        )?;
        let system = run("pm", &["list", "packages", "-s"])?;

        Ok(build_entries(&launchers, &system))
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

/// Packages owning a launcher activity, from `query-activities --brief` output.
fn launcher_packages(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.contains('=') && !line.contains(' '))
        .filter_map(|line| line.split_once('/'))
        .map(|(package, _)| package.to_string())
        .collect()
}

/// Package ids from `pm list packages` output.
fn listed_packages(output: &str) -> HashSet<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .map(str::to_string)
        .collect()
}

fn build_entries(launchers: &str, system: &str) -> Vec<AppEntry> {
    let system = listed_packages(system);

    launcher_packages(launchers)
        .into_iter()
        .map(|package| AppEntry {
            app_name: package.clone(),
            is_system_app: system.contains(&package),
            package_name: package,
        })
        .collect()
}
