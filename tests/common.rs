use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

/// The canonical sweep fixture: `a.png` is referenced by `index.html`,
/// `b.png` is referenced by nothing.
pub fn referenced_tree(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let a = write_file(dir, "a.png", b"fake png data");
    let b = write_file(dir, "b.png", b"fake png data");
    let html = write_file(dir, "index.html", b"<img src=\"a.png\">");
    (a, b, html)
}
