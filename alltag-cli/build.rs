//! Stamps the binary with the commit it was built from, for `alltag --version`.

use std::path::Path;
use std::process::Command;

/// Run git inside the workspace and return trimmed stdout on success.
fn git(root: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(root).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).trim().to_owned())
}

fn main() {
    let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR").unwrap_or_else(|| ".".into());
    let root = Path::new(&manifest_dir).join("..");

    // "abc1234", "abc1234+dirty", or "unknown" outside a checkout
    let build = match git(&root, &["rev-parse", "--short", "HEAD"]).filter(|s| !s.is_empty()) {
        Some(sha) => match git(&root, &["status", "--porcelain", "--untracked-files=no"]) {
            Some(changes) if !changes.is_empty() => format!("{sha}+dirty"),
            _ => sha,
        },
        None => "unknown".to_owned(),
    };

    println!("cargo:rustc-env=ALLTAG_BUILD_SHA={build}");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/index");
}
