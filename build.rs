use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let git_hash = command_output("git", &["rev-parse", "--short", "HEAD"]);
    emit("EXPENSE_TRACKER_BUILD_HASH", &git_hash);

    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    emit("EXPENSE_TRACKER_BUILD_TIMESTAMP", &timestamp);

    let target = env::var("TARGET").unwrap_or_else(|_| UNKNOWN.to_string());
    emit("EXPENSE_TRACKER_BUILD_TARGET", &target);

    let profile = env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string());
    emit("EXPENSE_TRACKER_BUILD_PROFILE", &profile);
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}

fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
