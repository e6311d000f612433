use crate::error::{ArchiveError, UnpackFailure};
use glob::{glob, Pattern};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Result of walking the source tree.
#[derive(Debug, Default)]
pub struct Discovered {
    /// Matching files, sorted.
    pub files: Vec<PathBuf>,
    /// Entries the walk could not read. Files below them are missing from
    /// `files`.
    pub unreadable: Vec<UnpackFailure>,
}

/// Find every file below `root` whose name ends in `.<extension>`, at any
/// depth. The root itself is escaped, so directories with glob
/// metacharacters in their names are searched literally. Fails only when
/// `extension` produces a malformed pattern; unreadable entries are logged
/// and collected in [`Discovered::unreadable`].
pub fn discover(root: &Path, extension: &str) -> Result<Discovered, ArchiveError> {
    let pattern = resolve_glob(root, extension);
    let entries = glob(&pattern).map_err(|e| ArchiveError::Glob {
        pattern: pattern.clone(),
        source: e,
    })?;

    let mut found = Discovered::default();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => found.files.push(path),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    path = %e.path().display(),
                    error = %e.error(),
                    "skipping unreadable entry during discovery"
                );
                found.unreadable.push(UnpackFailure::Discover {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                });
            }
        }
    }

    found.files.sort();
    Ok(found)
}

/// `<escaped root>/**/*.<extension>`
pub fn resolve_glob(root: &Path, extension: &str) -> String {
    let escaped = Pattern::escape(&root.to_string_lossy());
    Path::new(&escaped)
        .join("**")
        .join(format!("*.{extension}"))
        .to_string_lossy()
        .into_owned()
}

/// Output file name for an archive member: the path relative to `root` with
/// separators replaced by `_` and the compression extension dropped.
///
/// `root/2024/06/stream-1/000000.gz` → `2024_06_stream-1_000000`
pub fn flatten_name(root: &Path, file: &Path, extension: &str) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("_");

    let suffix = format!(".{extension}");
    match joined.strip_suffix(&suffix) {
        Some(stem) => stem.to_string(),
        None => joined,
    }
}

/// Flattened output names for `files`, in the same order. A name already
/// taken by an earlier file gets the first free `_<n>` suffix, so every
/// input lands in its own output file.
pub fn output_names(root: &Path, files: &[PathBuf], extension: &str) -> Vec<String> {
    let mut taken = HashSet::with_capacity(files.len());
    files
        .iter()
        .map(|file| {
            let base = flatten_name(root, file, extension);
            let mut name = base.clone();
            let mut n = 1;
            while !taken.insert(name.clone()) {
                name = format!("{base}_{n}");
                n += 1;
            }
            if name != base {
                tracing::warn!(
                    file = %file.display(),
                    name = %name,
                    "flattened name collides with an earlier file; renamed"
                );
            }
            name
        })
        .collect()
}
