use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const HEADER: &str =
    "pk,FieldName,Crop,Customer,Farm,Variety,Manager,Zone,Acres,Region,Product";

/// One temp workspace: order form path, photo source dir, delivery target dir.
pub fn setup() -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photos");
    let target = tmp.path().join("delivery");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    let form = tmp.path().join("orders.csv");
    (tmp, form, source, target)
}

pub fn write_form(path: &Path, rows: &[&str]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
}

pub fn add_photo(source: &Path, name: &str) {
    std::fs::write(source.join(name), name.as_bytes()).unwrap();
}

/// Names of entries in `dir` starting with `prefix`.
pub fn entries_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
        .map(|e| e.path())
        .collect()
}
