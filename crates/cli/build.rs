use std::process::Command;

/// Commit label for `eodsweep --version`. Packaged builds without a `.git`
/// directory can pass it in through `EODSWEEP_COMMIT`.
fn commit_label() -> String {
    if let Ok(label) = std::env::var("EODSWEEP_COMMIT") {
        if !label.trim().is_empty() {
            return label.trim().to_string();
        }
    }

    Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=7"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");
    println!("cargo:rerun-if-env-changed=EODSWEEP_COMMIT");

    println!("cargo:rustc-env=EODSWEEP_COMMIT={}", commit_label());

    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=EODSWEEP_TARGET={}", target);
}
