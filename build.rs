use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

use cargo_lock::Lockfile;
use serde::Serialize;

#[derive(Serialize)]
struct DepInfo {
    name: String,
    version: String,
    checksum: Option<String>,
    source: Option<String>,
}

fn git_hash() -> String {
    let output = Command::new("git").args(["rev-parse", "HEAD"]).output();
    match output {
        Ok(o) if o.status.success() => String::from_utf8_lossy(&o.stdout).trim().to_string(),
        _ => "unknown".to_string(),
    }
}

fn locked_dependencies(manifest_dir: &str) -> Vec<DepInfo> {
    let lock_path = Path::new(manifest_dir).join("Cargo.lock");
    let lockfile = Lockfile::load(lock_path).expect("Could not load Cargo.lock");
    lockfile
        .packages
        .into_iter()
        .map(|pkg| DepInfo {
            name: pkg.name.as_str().to_string(),
            version: pkg.version.to_string(),
            checksum: pkg.checksum.map(|c| c.to_string()),
            source: pkg.source.map(|s| s.to_string()),
        })
        .collect()
}

fn main() {
    println!("cargo:rustc-env=PVCURVE_GIT_HASH={}", git_hash());
    println!("cargo:rerun-if-changed=.git/HEAD");

    // Embed the resolved dependency set for --show-build-info
    println!("cargo:rerun-if-changed=Cargo.lock");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let deps = locked_dependencies(&manifest_dir);
    let json_info = serde_json::to_string(&deps).expect("Failed to serialize deps");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("deps_info.json");
    fs::write(&dest_path, json_info).expect("Failed to write info to file");
    println!("cargo:rustc-env=PVCURVE_DEPS_PATH={}", dest_path.display());
}
