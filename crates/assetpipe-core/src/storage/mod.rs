//! Side-file lifecycle for in-progress downloads.
//!
//! Bytes are appended to `<dest>.part` so an interrupted transfer can resume
//! from the side-file's current length, then the side-file is renamed into
//! place once the stream completes.

mod part;

pub use part::PartFile;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the side-file: appends `.part` to the final path (e.g. `model.safetensors` → `model.safetensors.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}
