//! Stamps the binary with the short git revision it was built from.
//! `spendtalk --version` shows it; builds outside a checkout get "unknown".

use std::path::Path;
use std::process::Command;

fn git_short_sha(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?.trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let workspace = Path::new(&manifest_dir).join("..");

    println!("cargo:rerun-if-changed={}", workspace.join(".git/HEAD").display());
    let sha = git_short_sha(&workspace).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=SPENDTALK_BUILD_SHA={sha}");
}
