//! Input resources and record streams.
//!
//! This module handles:
//! - Resolving `--input` arguments (paths, `file://` and `http(s)://` URLs,
//!   glob patterns) into concrete resources
//! - Opening every resource and chaining them into a single byte stream
//! - Turning that stream into JSON objects, either with the tolerant stream
//!   reader ([`RecordStream`]) or the legacy brace-counting assembler
//!   ([`LineRecords`])

mod lines;
mod stream;

pub use lines::LineRecords;
pub use stream::RecordStream;

use globset::GlobBuilder;
use log::debug;
use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

const USER_AGENT: &str = concat!("traceability-matrix/", env!("CARGO_PKG_VERSION"));

/// One readable input location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    File(PathBuf),
    Http(String),
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::File(path) => write!(f, "{}", path.display()),
            Resource::Http(url) => write!(f, "{}", url),
        }
    }
}

/// Strip a `file://` scheme, leaving a filesystem path
pub fn file_url_to_path(spec: &str) -> Option<PathBuf> {
    if spec.starts_with("http://") || spec.starts_with("https://") {
        return None;
    }
    let path = spec.strip_prefix("file://").unwrap_or(spec);
    Some(PathBuf::from(path))
}

fn is_glob(spec: &str) -> bool {
    spec.contains(['*', '?', '[', '{'])
}

/// Resolve `--input` arguments into resources, in argument order.
///
/// Glob patterns expand to their matches in sorted order; a pattern with no
/// match is an error.
pub fn resolve_resources(specs: &[String]) -> Result<Vec<Resource>, String> {
    let mut resources = Vec::new();
    for spec in specs {
        if spec.starts_with("http://") || spec.starts_with("https://") {
            resources.push(Resource::Http(spec.clone()));
            continue;
        }

        let Some(path) = file_url_to_path(spec) else {
            return Err(format!("Unsupported input resource: {}", spec));
        };
        let pattern = path.to_string_lossy().to_string();
        if is_glob(&pattern) {
            let matches = expand_glob(&pattern)?;
            if matches.is_empty() {
                return Err(format!("Input pattern {} matched no files", spec));
            }
            debug!("Pattern {} matched {} files", spec, matches.len());
            resources.extend(matches.into_iter().map(Resource::File));
        } else {
            resources.push(Resource::File(path));
        }
    }
    Ok(resources)
}

/// Leading path components that contain no glob metacharacters
fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        if is_glob(&component.as_os_str().to_string_lossy()) {
            break;
        }
        base.push(component);
    }
    base
}

/// Expand a glob pattern against the local filesystem, sorted
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, String> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| format!("Invalid input pattern {}: {}", pattern, e))?
        .compile_matcher();

    let base = glob_base(pattern);
    let relative = base.as_os_str().is_empty();
    let root = if relative { PathBuf::from(".") } else { base };

    let mut matches = Vec::new();
    let mut pending = vec![root];
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping unreadable directory {:?}: {}", dir, e);
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let candidate = if relative { path.strip_prefix(".").unwrap_or(&path).to_path_buf() } else { path.clone() };
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                pending.push(path);
            } else if matcher.is_match(&candidate) {
                matches.push(candidate);
            }
        }
    }
    matches.sort();
    Ok(matches)
}

/// Open one resource for reading
pub fn open_resource(resource: &Resource) -> Result<Box<dyn Read>, String> {
    match resource {
        Resource::File(path) => {
            let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
            Ok(Box::new(BufReader::new(file)))
        }
        Resource::Http(url) => {
            let response = ureq::get(url)
                .set("User-Agent", USER_AGENT)
                .call()
                .map_err(|e| format!("Failed to fetch {}: {}", url, e))?;
            Ok(Box::new(BufReader::new(response.into_reader())))
        }
    }
}

/// Open every resource and concatenate them into one stream.
///
/// A newline separates consecutive documents so that juxtaposed objects
/// from different files never run together.
pub fn open_all(resources: &[Resource]) -> Result<Box<dyn Read>, String> {
    let mut combined: Box<dyn Read> = Box::new(std::io::empty());
    for resource in resources {
        debug!("Opening input {}", resource);
        let reader = open_resource(resource)?;
        combined = Box::new(combined.chain(Cursor::new(b"\n")).chain(reader));
    }
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_file_url_to_path() {
        assert_eq!(file_url_to_path("file:///tmp/run.json"), Some(PathBuf::from("/tmp/run.json")));
        assert_eq!(file_url_to_path("results/run.json"), Some(PathBuf::from("results/run.json")));
        assert_eq!(file_url_to_path("https://example.com/run.json"), None);
    }

    #[test]
    fn test_resolve_plain_and_http_resources() {
        let specs = vec!["a.json".to_string(), "https://ci.example.com/run.json".to_string()];
        let resources = resolve_resources(&specs).unwrap();
        assert_eq!(
            resources,
            vec![Resource::File(PathBuf::from("a.json")), Resource::Http("https://ci.example.com/run.json".to_string())]
        );
    }

    #[test]
    fn test_glob_expands_sorted_and_respects_separators() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("b.json"), "{}").unwrap();
        fs::write(dir.join("a.json"), "{}").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("c.json"), "{}").unwrap();

        let pattern = format!("file://{}/*.json", dir.display());
        let resources = resolve_resources(&[pattern]).unwrap();
        assert_eq!(resources, vec![Resource::File(dir.join("a.json")), Resource::File(dir.join("b.json"))]);

        let recursive = format!("{}/**/*.json", dir.display());
        assert_eq!(expand_glob(&recursive).unwrap().len(), 3);
    }

    #[test]
    fn test_glob_without_match_is_error() {
        let temp = TempDir::new().unwrap();
        let pattern = format!("{}/*.json", temp.path().display());
        let err = resolve_resources(&[pattern]).unwrap_err();
        assert!(err.contains("matched no files"));
    }

    #[test]
    fn test_open_all_concatenates_with_separator() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.json");
        let b = temp.path().join("b.json");
        fs::write(&a, "{\"x\":1}").unwrap();
        fs::write(&b, "{\"y\":2}").unwrap();

        let mut combined = String::new();
        open_all(&[Resource::File(a), Resource::File(b)]).unwrap().read_to_string(&mut combined).unwrap();
        assert_eq!(combined, "\n{\"x\":1}\n{\"y\":2}");
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = open_all(&[Resource::File(PathBuf::from("/nonexistent/run.json"))]).err().unwrap();
        assert!(err.contains("Failed to open /nonexistent/run.json"));
    }
}
