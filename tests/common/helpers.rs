//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{Cursor, Write};
use std::path::Path;

use unbundle::Reporter;
use zip::write::SimpleFileOptions;

/// One entry of a fixture archive. Names ending in `/` become directories.
pub type Fixture<'a> = (&'a str, &'a str);

/// Build an archive with the given entries in exactly this order.
pub fn build_archive(entries: &[Fixture<'_>]) -> Vec<u8> {
    build_archive_with(entries, zip::CompressionMethod::Deflated)
}

pub fn build_archive_with(entries: &[Fixture<'_>], method: zip::CompressionMethod) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("add directory");
        } else {
            writer.start_file(*name, options).expect("start file");
            writer.write_all(contents.as_bytes()).expect("write contents");
        }
    }
    writer.finish().expect("finish archive").into_inner()
}

/// Archive whose file entry carries Unix permission bits.
pub fn build_archive_with_mode(name: &str, contents: &str, mode: u32) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(mode);
    writer.start_file(name, options).expect("start file");
    writer.write_all(contents.as_bytes()).expect("write contents");
    writer.finish().expect("finish archive").into_inner()
}

/// Offset of the `n`th occurrence of `needle` in `haystack`.
pub fn nth_position(haystack: &[u8], needle: &[u8], n: usize) -> usize {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .nth(n)
        .map(|(offset, _)| offset)
        .expect("needle present")
}

/// Rewrite an entry name in place, in both its local and central headers.
/// Names must have the same length; used for names a writer would refuse.
pub fn rename_entry(archive: &mut [u8], from: &str, to: &str) {
    assert_eq!(from.len(), to.len(), "renames must keep the length");
    let mut renamed = 0;
    let mut offset = 0;
    while let Some(found) = archive[offset..]
        .windows(from.len())
        .position(|window| window == from.as_bytes())
    {
        let at = offset + found;
        archive[at..at + to.len()].copy_from_slice(to.as_bytes());
        offset = at + to.len();
        renamed += 1;
    }
    assert_eq!(renamed, 2, "expected a local and a central header for {from}");
}

/// Sorted list of every path under `root`, relative, with `/` separators
/// and a trailing `/` on directories.
pub fn tree(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            let relative = path
                .strip_prefix(root)
                .expect("under root")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if path.is_dir() {
                out.push(format!("{relative}/"));
                walk(root, &path, out);
            } else {
                out.push(relative);
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

pub fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).expect("read extracted file")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Debug,
    Error,
}

/// Reporter that keeps every message for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    messages: RefCell<Vec<(Level, String)>>,
}

impl RecordingReporter {
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
