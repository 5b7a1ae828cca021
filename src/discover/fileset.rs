use std::path::{Path, PathBuf};

/// Absolute, de-duplicated input files of one run, plus the root they were found under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSet {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl FileSet {
    pub fn new<P: Into<PathBuf>>(root: P, files: Vec<PathBuf>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let files = files
            .into_iter()
            .filter(|f| seen.insert(f.clone()))
            .collect();
        FileSet {
            root: root.into(),
            files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_removed_order_kept() {
        let set = FileSet::new(
            "/in",
            vec![
                PathBuf::from("/in/b.fq"),
                PathBuf::from("/in/a.fq"),
                PathBuf::from("/in/b.fq"),
            ],
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.files()[0], PathBuf::from("/in/b.fq"));
        assert_eq!(set.root(), Path::new("/in"));
    }
}
