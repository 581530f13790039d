//! Stamps the binary version.
//!
//! Packagers can pin it with `OAI_PROVIDER_VERSION`; otherwise `git describe`
//! is used, then the crate version.

use std::env;
use std::process::Command;

const VERSION_VAR: &str = "OAI_PROVIDER_VERSION";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed={}", VERSION_VAR);

    let version = pinned_version()
        .or_else(git_version)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env={}={}", VERSION_VAR, version);
}

fn pinned_version() -> Option<String> {
    env::var(VERSION_VAR)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    let version = described.strip_prefix('v').unwrap_or(described);
    (!version.is_empty()).then(|| version.to_string())
}
