//! Embeds the package version plus the git commit it was built from.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let pkg = env!("CARGO_PKG_VERSION");
    let version = match commit() {
        Some(commit) => format!("{pkg} ({commit})"),
        None => pkg.to_string(),
    };

    println!("cargo:rustc-env=AUTOREFRESH_VERSION={version}");
}

/// Short commit hash, suffixed with `-dirty` when the work tree has changes.
fn commit() -> Option<String> {
    let hash = git(&["rev-parse", "--short", "HEAD"])?;
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"]).is_some();

    Some(if dirty { format!("{hash}-dirty") } else { hash })
}

/// Trimmed stdout of a successful git invocation, if non-empty.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
