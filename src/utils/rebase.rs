use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::runtime;

/// Map `path` below `input_root` to the same relative location below `output_root`.
/// Purely lexical, no filesystem access.
pub fn rebase(
    path: impl AsRef<Path>,
    input_root: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
) -> runtime::Result<PathBuf> {
    let path = path.as_ref().to_path_buf().clean();
    let input_root = input_root.as_ref().to_path_buf().clean();
    let relative = path
        .strip_prefix(&input_root)
        .map_err(|_| runtime::Error::path_not_below_root(&path, &input_root))?;
    Ok(output_root.as_ref().join(relative).clean())
}

/// Suffixes dropped before the format extension
pub const COMPRESSION_EXTENSIONS: [&str; 6] = ["gz", "bgz", "bz2", "xz", "zst", "zip"];

/// Basename without its compression suffix and format extension:
/// `x.fq.gz` -> `x`, `S1.R1.fq.gz` -> `S1.R1`, `S1.R1.bam` -> `S1.R1`.
/// Dots inside the sample name are kept. So is a leading dot.
pub fn sample_stem(path: impl AsRef<Path>) -> String {
    let name = match path.as_ref().file_name() {
        Some(name) => name.to_string_lossy(),
        None => return String::new(),
    };
    let mut stem: &str = &name;
    if let Some((head, ext)) = split_extension(stem) {
        if COMPRESSION_EXTENSIONS
            .iter()
            .any(|c| c.eq_ignore_ascii_case(ext))
        {
            stem = head;
        }
    }
    if let Some((head, _)) = split_extension(stem) {
        stem = head;
    }
    stem.to_string()
}

fn split_extension(name: &str) -> Option<(&str, &str)> {
    let i = name.rfind('.')?;
    if name[..i].trim_start_matches('.').is_empty() {
        return None;
    }
    Some((&name[..i], &name[i + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebase_keeps_structure() {
        let out = rebase("/data/in/a/b/x.fq.gz", "/data/in", "/data/out").unwrap();
        assert_eq!(out, PathBuf::from("/data/out/a/b/x.fq.gz"));

        let out = rebase("/data/in/./a/../x.fq", "/data/in/", "/scratch").unwrap();
        assert_eq!(out, PathBuf::from("/scratch/x.fq"));
    }

    #[test]
    fn rebase_outside_root_fails() {
        let err = rebase("/elsewhere/x.fq", "/data/in", "/data/out").unwrap_err();
        assert!(matches!(err, runtime::Error::PathNotBelowRoot { .. }));
        // Sibling directory sharing a prefix is not below the root
        assert!(rebase("/data/input2/x.fq", "/data/in", "/data/out").is_err());
    }

    #[test]
    fn stems() {
        assert_eq!(sample_stem("/root/a/x.fq.gz"), "x");
        assert_eq!(sample_stem("out/a/x.bam"), "x");
        assert_eq!(sample_stem("sample1"), "sample1");
        assert_eq!(sample_stem(".hidden.txt"), ".hidden");
        assert_eq!(sample_stem(".bashrc"), ".bashrc");
        assert_eq!(sample_stem("reads.FQ.GZ"), "reads");
        assert_eq!(sample_stem("/"), "");
    }

    #[test]
    fn dotted_sample_names_stay_apart() {
        assert_eq!(sample_stem("/in/S1.R1.fq.gz"), "S1.R1");
        assert_eq!(sample_stem("/in/S1.R2.fq.gz"), "S1.R2");
        assert_eq!(sample_stem("/out/S1.R1.bam"), "S1.R1");
        assert_eq!(sample_stem("/in/S1.R1.fastq"), "S1.R1");
    }
}
