use std::process::Command;

/// Stamp the git revision into `pesa --version` long output.
/// Packagers building outside a checkout can set PESA_BUILD_SHA themselves.
fn main() {
    println!("cargo:rerun-if-env-changed=PESA_BUILD_SHA");

    let sha = std::env::var("PESA_BUILD_SHA")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(git_short_sha)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=PESA_BUILD_SHA={sha}");
}

fn git_short_sha() -> Option<String> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").ok()?;
    let out = Command::new("git")
        .args(["-C", &manifest_dir, "rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}
