//! Fingerprints static assets so they can be served with immutable caching.
//!
//! Each asset is hashed, copied to `static/derived/{stem}.{hash}.{ext}`, and
//! the hash exported as a compile-time env var for the `asset_hash` filter.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

const ASSETS: [(&str, &str); 2] = [("css/main.css", "CSS_HASH"), ("js/site.js", "JS_HASH")];

fn main() {
    let manifest_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo"));
    let static_dir = manifest_dir.join("static");
    let derived_dir = static_dir.join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create static/derived");

    for (asset, var) in ASSETS {
        fingerprint(&static_dir.join(asset), &derived_dir, var);
    }
}

fn fingerprint(path: &Path, derived_dir: &Path, var: &str) {
    println!("cargo:rerun-if-changed={}", path.display());

    let Ok(content) = fs::read(path) else {
        println!("cargo:warning=Missing asset {}", path.display());
        println!("cargo:rustc-env={var}=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let hash = digest.get(..8).unwrap_or(&digest);
    println!("cargo:rustc-env={var}={hash}");

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("asset");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("bin");
    fs::copy(path, derived_dir.join(format!("{stem}.{hash}.{ext}")))
        .expect("Failed to copy fingerprinted asset");
}
