use std::path::PathBuf;
use std::sync::OnceLock;

/// Returns the workspace root directory, the parent of the calling crate.
fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the directory test artifacts are written to, creating it on first use.
pub fn test_output_dir() -> PathBuf {
    static DIR: OnceLock<PathBuf> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = workspace_root().join("test_output");
        std::fs::create_dir_all(&dir).expect("Failed to create test_output directory");
        dir
    })
    .clone()
}

/// Returns the path to a test output file.
pub fn test_output_path(name: &str) -> PathBuf {
    test_output_dir().join(name)
}
