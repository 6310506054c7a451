use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=LISTING_DATA_DIR_HINT");

    let hint = env::var("LISTING_DATA_DIR_HINT")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            env::var("CARGO_MANIFEST_DIR")
                .ok()
                .map(|root| PathBuf::from(root).join("data"))
        });

    if let Some(candidate) = hint {
        let canonical = candidate.canonicalize().unwrap_or(candidate);

        println!(
            "cargo:rustc-env=LISTING_DATA_DIR_HINT={}",
            canonical.display()
        );
    }
}
