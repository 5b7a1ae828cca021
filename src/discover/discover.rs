use log::{debug, info, warn};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::FileSet;
use crate::runtime;
use crate::utils::sample_stem;

pub const DEFAULT_INCLUDE_PATTERN: &str = ".*";

#[derive(Clone, Debug)]
pub struct DiscoverParams {
    pub root: PathBuf,

    /// Searched in the file name
    pub include: String,

    /// Also searched in the file name, when given
    pub extension: Option<String>,

    /// Searched in the full path; a match drops the file
    pub exclude: Vec<String>,

    /// Directories whose file stems mark inputs as done. Items may be comma-joined
    pub exclude_dirs: Vec<String>,
}

impl DiscoverParams {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DiscoverParams {
            root: root.into(),
            include: DEFAULT_INCLUDE_PATTERN.to_string(),
            extension: None,
            exclude: Vec::new(),
            exclude_dirs: Vec::new(),
        }
    }

    /// Exclusion directories with comma-joined items split out
    pub fn exclude_dir_paths(&self) -> Vec<PathBuf> {
        self.exclude_dirs
            .iter()
            .flat_map(|d| d.split(','))
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

fn compile(pattern: &str) -> runtime::Result<Regex> {
    Regex::new(pattern).map_err(|e| runtime::Error::invalid_pattern(pattern, e))
}

/// Walk the input root and return the files that still need processing.
/// Never writes to the filesystem.
pub fn discover(params: &DiscoverParams) -> runtime::Result<FileSet> {
    let include = compile(&params.include)?;
    let extension = params.extension.as_deref().map(compile).transpose()?;
    let exclude = params
        .exclude
        .iter()
        .map(|p| compile(p))
        .collect::<runtime::Result<Vec<_>>>()?;

    let root = std::fs::canonicalize(&params.root)
        .map_err(|e| runtime::Error::input_root_unavailable(&params.root, Some(e.to_string())))?;
    if !root.is_dir() {
        return Err(runtime::Error::input_root_unavailable(
            &params.root,
            Some("not a directory"),
        ));
    }
    // Surface permission problems on the root itself instead of an empty walk
    std::fs::read_dir(&root)
        .map_err(|e| runtime::Error::input_root_unavailable(&params.root, Some(e.to_string())))?;

    let done_stems = collect_stems(&params.exclude_dir_paths());

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();

        if !include.is_match(&name) {
            continue;
        }
        if let Some(extension) = &extension {
            if !extension.is_match(&name) {
                continue;
            }
        }
        let full = path.to_string_lossy();
        if let Some(re) = exclude.iter().find(|re| re.is_match(&full)) {
            debug!("Excluding {} (matches '{}')", path.display(), re.as_str());
            continue;
        }
        if done_stems.contains(&sample_stem(path)) {
            debug!("Excluding {} (output already present)", path.display());
            continue;
        }
        info!("Found {}", path.display());
        files.push(path.to_path_buf());
    }

    Ok(FileSet::new(root, files))
}

/// Stems of every file below the given directories. Missing directories contribute nothing.
fn collect_stems(dirs: &[PathBuf]) -> HashSet<String> {
    let mut stems = HashSet::new();
    for dir in dirs {
        if !dir.is_dir() {
            debug!("Exclusion directory {} does not exist yet", dir.display());
            continue;
        }
        for entry in WalkDir::new(dir).follow_links(true).into_iter().flatten() {
            if entry.file_type().is_file() {
                stems.insert(sample_stem(entry.path()));
            }
        }
    }
    stems
}

/// Every directory strictly below `root`, for mirroring into an output tree.
pub fn subdirectories(root: &Path) -> runtime::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(runtime::Error::input_root_unavailable(
            root,
            Some("not a directory"),
        ));
    }
    Ok(WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn names(set: &FileSet) -> Vec<String> {
        set.iter()
            .map(|p| p.strip_prefix(set.root()).unwrap().display().to_string())
            .collect()
    }

    #[test]
    fn include_and_extension_filters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        touch(&root.join("a/x.fq.gz"));
        touch(&root.join("a/y.fq.gz"));
        touch(&root.join("b/z.bam"));
        touch(&root.join("notes.txt"));

        let mut params = DiscoverParams::new(&root);
        params.extension = Some(r"\.fq\.gz$".to_string());
        let set = discover(&params).unwrap();
        assert_eq!(names(&set), vec!["a/x.fq.gz", "a/y.fq.gz"]);
        assert!(set.iter().all(|p| p.is_absolute()));

        params.include = "^y".to_string();
        assert_eq!(names(&discover(&params).unwrap()), vec!["a/y.fq.gz"]);
    }

    #[test]
    fn exclude_patterns_match_full_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        touch(&root.join("keep/x.fq"));
        touch(&root.join("scratch/y.fq"));
        touch(&root.join("keep/undetermined.fq"));

        let mut params = DiscoverParams::new(&root);
        params.exclude = vec!["/scratch/".to_string(), "undetermined".to_string()];
        assert_eq!(names(&discover(&params).unwrap()), vec!["keep/x.fq"]);
    }

    #[test]
    fn exclusion_directory_matches_stem() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        let out = dir.path().join("out");
        let other = dir.path().join("other");
        touch(&root.join("a/x.fq.gz"));
        touch(&root.join("a/w.fq.gz"));
        touch(&root.join("v.fq.gz"));
        touch(&out.join("a/x.bam"));
        touch(&other.join("v.vcf"));

        let mut params = DiscoverParams::new(&root);
        params.exclude_dirs = vec![format!("{},{}", out.display(), other.display())];
        assert_eq!(names(&discover(&params).unwrap()), vec!["a/w.fq.gz"]);

        // Missing exclusion directory is not an error
        params.exclude_dirs = vec![dir.path().join("nope").display().to_string()];
        assert_eq!(discover(&params).unwrap().len(), 3);
    }

    #[test]
    fn exclusion_keeps_sibling_reads() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        let out = dir.path().join("out");
        touch(&root.join("S1.R1.fq.gz"));
        touch(&root.join("S1.R2.fq.gz"));
        touch(&out.join("S1.R1.bam"));

        let mut params = DiscoverParams::new(&root);
        params.exclude_dirs = vec![out.display().to_string()];
        assert_eq!(names(&discover(&params).unwrap()), vec!["S1.R2.fq.gz"]);
    }

    #[test]
    fn missing_root_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&DiscoverParams::new(dir.path().join("missing"))).unwrap_err();
        assert!(matches!(err, runtime::Error::InputRootUnavailable { .. }));

        let file = dir.path().join("file.fq");
        touch(&file);
        let err = discover(&DiscoverParams::new(&file)).unwrap_err();
        assert!(matches!(err, runtime::Error::InputRootUnavailable { .. }));
    }

    #[test]
    fn empty_root_is_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(&DiscoverParams::new(dir.path())).unwrap().is_empty());
    }

    #[test]
    fn bad_pattern_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = DiscoverParams::new(dir.path());
        params.include = "(".to_string();
        assert!(matches!(
            discover(&params),
            Err(runtime::Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn lists_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a/b/x.fq"));
        touch(&dir.path().join("c/y.fq"));
        let dirs: Vec<_> = subdirectories(dir.path())
            .unwrap()
            .into_iter()
            .map(|d| d.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(dirs, vec!["a", "a/b", "c"]);
    }
}
