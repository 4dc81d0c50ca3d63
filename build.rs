// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=BARCODE_SCANNER_VERSION");

    // Packagers may pin the version explicitly
    let version = std::env::var("BARCODE_SCANNER_VERSION")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(git_version);

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version from `git describe`:
/// - "0.1.0-abcdef1" when HEAD is exactly at tag v0.1.0
/// - "0.1.0-dirty-abcdef1" when HEAD is past the tag
/// - the package version plus commit hash without tags
fn git_version() -> String {
    let commit = git(&["rev-parse", "--short", "HEAD"]);

    let Some(described) = git(&["describe", "--tags", "--match", "v*"]) else {
        let base = env!("CARGO_PKG_VERSION");
        return match commit {
            Some(hash) => format!("{}-{}", base, hash),
            None => base.to_string(),
        };
    };
    let described = described.strip_prefix('v').unwrap_or(&described);

    // tag-commits-ghash
    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    if parts.len() == 3 {
        let hash = parts[0].strip_prefix('g').unwrap_or(parts[0]);
        return format!("{}-dirty-{}", parts[2], hash);
    }

    match commit {
        Some(hash) => format!("{}-{}", described, hash),
        None => described.to_string(),
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}
