use anyhow::{anyhow, bail};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};

use super::core::FileCommand;
use crate::utils::{rebase, sample_stem, shell_quote};

pub const PLACEHOLDERS: [&str; 4] = ["input", "name", "output", "outdir"];

///////////////////////////////
/// Generic per-file command built from a template string.
///
/// `{input}` is the input path, `{name}` its stem, `{outdir}` the matching
/// directory below the output root and `{output}` that directory joined with
/// the stem (no extension, the tool adds its own). Values are shell-quoted.
#[derive(Clone, Debug)]
pub struct CommandTemplate {
    template: String,
    placeholder: Regex,
    input_root: PathBuf,
    output_root: Option<PathBuf>,
}

impl CommandTemplate {
    pub fn new(
        template: &str,
        input_root: &Path,
        output_root: Option<&Path>,
    ) -> anyhow::Result<CommandTemplate> {
        if template.trim().is_empty() {
            bail!("Command template is empty");
        }
        let placeholder = Regex::new(r"\{([A-Za-z_]+)\}")?;
        for cap in placeholder.captures_iter(template) {
            if !PLACEHOLDERS.contains(&&cap[1]) {
                bail!(
                    "Unknown placeholder {{{}}} in command template. Known: {}",
                    &cap[1],
                    PLACEHOLDERS.map(|p| format!("{{{}}}", p)).join(", ")
                );
            }
        }
        Ok(CommandTemplate {
            template: template.to_string(),
            placeholder,
            input_root: input_root.to_path_buf(),
            output_root: output_root.map(Path::to_path_buf),
        })
    }

    fn output_dir(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let output_root = self
            .output_root
            .as_ref()
            .ok_or_else(|| anyhow!("{{output}}/{{outdir}} need an output directory (-o)"))?;
        let rebased = rebase(path, &self.input_root, output_root)?;
        Ok(rebased
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| output_root.clone()))
    }
}

impl FileCommand for CommandTemplate {
    fn format(&self, path: &Path) -> anyhow::Result<String> {
        let mut error = None;
        let command = self.placeholder.replace_all(&self.template, |cap: &Captures| {
            let value = match &cap[1] {
                "input" => Ok(path.to_string_lossy().into_owned()),
                "name" => Ok(sample_stem(path)),
                "outdir" => self
                    .output_dir(path)
                    .map(|d| d.to_string_lossy().into_owned()),
                "output" => self
                    .output_dir(path)
                    .map(|d| d.join(sample_stem(path)).to_string_lossy().into_owned()),
                other => Err(anyhow!("Unknown placeholder {{{}}}", other)),
            };
            match value {
                Ok(v) => shell_quote(&v).into_owned(),
                Err(e) => {
                    error.get_or_insert(e);
                    String::new()
                }
            }
        });
        match error {
            Some(e) => Err(e),
            None => Ok(command.into_owned()),
        }
    }
}
