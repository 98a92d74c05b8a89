/// Build script for diskparam
/// Records the commit a binary was built from and rebuilds when the
/// bundled templates change.

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=templates");

    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            if let Ok(hash) = String::from_utf8(output.stdout) {
                let hash = hash.trim();
                if !hash.is_empty() {
                    println!("cargo:rustc-env=DISKPARAM_GIT_HASH={hash}");
                }
            }
        }
    }
}
