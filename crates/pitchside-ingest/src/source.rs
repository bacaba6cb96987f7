//! Source-file plumbing shared by the loaders: locating files, inferring ids
//! from file names, and reading (optionally compressed) documents.

use std::{
  collections::BTreeMap,
  fs::File,
  io::{BufRead, BufReader},
  path::{Path, PathBuf},
};

use bzip2::read::MultiBzDecoder;
use serde_json::Value;

use crate::error::{Error, Result};

// ─── File names ──────────────────────────────────────────────────────────────

fn file_name(path: &Path) -> &str {
  path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// The first run of three or more digits anywhere in the file name.
/// `roster_3812.json` → 3812.
pub fn id_from_digit_run(path: &Path) -> Option<i64> {
  let name = file_name(path);
  let mut rest = name;
  while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
    let tail = &rest[start..];
    let len = tail.find(|c: char| !c.is_ascii_digit()).unwrap_or(tail.len());
    if len >= 3 {
      return tail[..len].parse().ok();
    }
    rest = &tail[len..];
  }
  None
}

/// The whole file stem as an integer. `3812.json` → 3812.
pub fn id_from_stem(path: &Path) -> Option<i64> {
  path.file_stem().and_then(|s| s.to_str())?.trim().parse().ok()
}

/// Everything before the first `.` as an integer. `3812.jsonl.bz2` → 3812.
pub fn id_from_prefix(path: &Path) -> Option<i64> {
  file_name(path).split('.').next()?.trim().parse().ok()
}

// ─── Reading ─────────────────────────────────────────────────────────────────

/// `*.json` files directly inside `dir`, sorted by name.
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
  let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
  let mut files = Vec::new();
  for entry in entries {
    let path = entry.map_err(|e| Error::io(dir, e))?.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
      files.push(path);
    }
  }
  files.sort();
  Ok(files)
}

pub fn read_json(path: &Path) -> Result<Value> {
  let file = File::open(path).map_err(|e| Error::io(path, e))?;
  serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::json(path, e))
}

/// Open a line-oriented file, decompressing `.bz2` transparently.
pub fn open_lines(path: &Path) -> Result<Box<dyn BufRead + Send>> {
  let file = File::open(path).map_err(|e| Error::io(path, e))?;
  if path.extension().is_some_and(|ext| ext == "bz2") {
    Ok(Box::new(BufReader::new(MultiBzDecoder::new(file))))
  } else {
    Ok(Box::new(BufReader::new(file)))
  }
}

// ─── Dedup ───────────────────────────────────────────────────────────────────

/// Collapse rows sharing a key into the last one seen, keeping the position of
/// the first.
pub fn keep_last<T, K: Ord>(rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
  let mut index: BTreeMap<K, usize> = BTreeMap::new();
  let mut out: Vec<T> = Vec::with_capacity(rows.len());
  for row in rows {
    match index.get(&key(&row)) {
      Some(&i) => out[i] = row,
      None => {
        index.insert(key(&row), out.len());
        out.push(row);
      }
    }
  }
  out
}
