use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    println!("cargo:rustc-env=VIEWSTATE_BUILD_COMMIT={}", build_commit());
    println!("cargo:rustc-env=VIEWSTATE_BUILD_DATE={}", build_date());
}

// CI exports the full sha; local builds ask git and mark uncommitted trees.
fn build_commit() -> String {
    if let Some(sha) = env::var("GITHUB_SHA").ok().filter(|v| !v.is_empty()) {
        return sha.chars().take(7).collect();
    }
    let Some(short) = git(&["rev-parse", "--short=7", "HEAD"]) else {
        return UNKNOWN.to_string();
    };
    match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(_) => format!("{short}-dirty"),
        None => short,
    }
}

fn build_date() -> String {
    if let Some(epoch) = env::var("SOURCE_DATE_EPOCH").ok().filter(|v| !v.is_empty()) {
        return format!("@{epoch}");
    }
    git(&["log", "-1", "--format=%cs"]).unwrap_or_else(|| UNKNOWN.to_string())
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}
