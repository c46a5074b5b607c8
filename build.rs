use std::process::Command;

fn run(cmd: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(cmd).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}

fn main() {
    let git_hash =
        run("git", &["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let build_time = run("date", &["+%Y%m%d-%H%M%S"]).unwrap_or_else(|| "unknown".to_string());

    // Tagged commits build without the -dev suffix
    let tagged = run("git", &["describe", "--exact-match", "--tags", "HEAD"]).is_some();
    if tagged {
        println!("cargo:rustc-env=VKDATA_VERSION_SUFFIX=");
    } else {
        println!("cargo:rustc-env=VKDATA_VERSION_SUFFIX=-dev.{build_time}.{git_hash}");
    }

    println!("cargo:rustc-env=VKDATA_GIT_HASH={git_hash}");
    println!("cargo:rustc-env=VKDATA_BUILD_TIME={build_time}");

    // Rebuild when the checked-out commit moves
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
