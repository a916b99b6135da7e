use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let hash = command_output("git", &["rev-parse", "--short", "HEAD"])
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let status = match command_output("git", &["status", "--porcelain"]) {
        Some(out) if out.is_empty() => "clean",
        Some(_) => "dirty",
        None => "unknown",
    };
    let rustc = command_output("rustc", &["--version"]).unwrap_or_else(|| "unknown".to_string());
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    emit("FLOWZI_BUILD_HASH", &hash);
    emit("FLOWZI_BUILD_STATUS", status);
    emit("FLOWZI_BUILD_TIMESTAMP", &timestamp);
    emit("FLOWZI_BUILD_TARGET", &env::var("TARGET").unwrap_or_else(|_| "unknown".into()));
    emit("FLOWZI_BUILD_PROFILE", &env::var("PROFILE").unwrap_or_else(|_| "unknown".into()));
    emit("FLOWZI_BUILD_RUSTC", &rustc);
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}

/// Trimmed stdout of a successful command.
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}
