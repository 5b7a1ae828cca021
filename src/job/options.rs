use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use regex::Regex;
use serde::Deserialize;

use crate::runtime;

pub const DEFAULT_SHELL: &str = "#!/bin/sh";

/// Mail notification points understood by every backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MailEvent {
    Start,
    End,
    Fail,
}

impl MailEvent {
    /// Unknown tokens give None; callers drop them.
    pub fn from_token(token: &str) -> Option<MailEvent> {
        match token.trim().to_uppercase().as_str() {
            "START" | "BEGIN" => Some(MailEvent::Start),
            "END" => Some(MailEvent::End),
            "FAIL" | "ABORT" => Some(MailEvent::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for MailEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MailEvent::Start => "START",
            MailEvent::End => "END",
            MailEvent::Fail => "FAIL",
        };
        write!(f, "{}", s)
    }
}

///////////////////////////////
/// Backend-neutral description of one submission.
/// Every field is optional; unset fields produce no scheduler flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct JobOptions {
    /// Value and unit, e.g. "80G"
    pub memory: Option<String>,
    pub nodes: Option<u32>,
    /// CPUs per node
    pub cpus: Option<u32>,
    /// Slurm partition or Torque queue
    pub partition: Option<String>,
    /// Label and deduplication key. Required at submission time
    pub job_name: Option<String>,
    /// Upstream job ids that must finish successfully first
    pub depends_on: Vec<String>,
    pub mail_user: Option<String>,
    /// Subset of START, END, FAIL. Anything else is ignored
    pub mail_events: Vec<String>,
    pub time_limit: Option<String>,
    /// Interpreter line placed above the command
    pub shell: Option<String>,
    pub stdin: Option<PathBuf>,
    pub stdout: Option<PathBuf>,
    pub stderr: Option<PathBuf>,
}

fn memory_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[0-9]+(\.[0-9]+)?([kmgtp]i?b?|b)?$").expect("valid regex"))
}

impl JobOptions {
    pub fn from_yaml_str(s: &str) -> runtime::Result<JobOptions> {
        let options: JobOptions = serde_yaml::from_str(s)
            .map_err(|e| runtime::Error::invalid_job_options(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_yaml_file(path: &Path) -> anyhow::Result<JobOptions> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job options file {:?}", path))?;
        JobOptions::from_yaml_str(&text)
            .with_context(|| format!("Failed to load job options file {:?}", path))
    }

    pub fn validate(&self) -> runtime::Result<()> {
        if let Some(name) = &self.job_name {
            if name.trim().is_empty() {
                return Err(runtime::Error::invalid_job_options("job name is empty"));
            }
            if name.chars().any(|c| c.is_whitespace()) {
                return Err(runtime::Error::invalid_job_options(format!(
                    "job name '{}' contains whitespace",
                    name
                )));
            }
        }
        if let Some(memory) = &self.memory {
            if !memory_regex().is_match(memory) {
                return Err(runtime::Error::invalid_job_options(format!(
                    "memory '{}' is not of the form <amount><unit>, e.g. 80G",
                    memory
                )));
            }
        }
        if self.nodes == Some(0) {
            return Err(runtime::Error::invalid_job_options("node count must be at least 1"));
        }
        if self.cpus == Some(0) {
            return Err(runtime::Error::invalid_job_options("cpu count must be at least 1"));
        }
        if self.depends_on.iter().any(|d| d.trim().is_empty()) {
            return Err(runtime::Error::invalid_job_options("empty dependency id"));
        }
        Ok(())
    }

    /// Fields set in `other` replace ours. Lists replace when non-empty.
    pub fn overlay(mut self, other: JobOptions) -> JobOptions {
        macro_rules! take {
            ($($field:ident),*) => {
                $( if other.$field.is_some() { self.$field = other.$field; } )*
            };
        }
        take!(memory, nodes, cpus, partition, job_name, mail_user, time_limit, shell, stdin, stdout, stderr);
        if !other.depends_on.is_empty() {
            self.depends_on = other.depends_on;
        }
        if !other.mail_events.is_empty() {
            self.mail_events = other.mail_events;
        }
        self
    }

    pub fn with_job_name<S: Into<String>>(mut self, name: S) -> Self {
        self.job_name = Some(name.into());
        self
    }

    pub fn with_output_paths(mut self, stdout: PathBuf, stderr: PathBuf) -> Self {
        self.stdout = Some(stdout);
        self.stderr = Some(stderr);
        self
    }

    pub fn with_depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn shell_line(&self) -> &str {
        self.shell.as_deref().unwrap_or(DEFAULT_SHELL)
    }

    /// Recognised mail events, first occurrence order, duplicates removed
    pub fn parsed_mail_events(&self) -> Vec<MailEvent> {
        let mut events = Vec::new();
        for event in self.mail_events.iter().filter_map(|t| MailEvent::from_token(t)) {
            if !events.contains(&event) {
                events.push(event);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_rejects_unknown_keys() {
        let ok = JobOptions::from_yaml_str("memory: 80G\ncpus: 10\npartition: bigmemh\n").unwrap();
        assert_eq!(ok.memory.as_deref(), Some("80G"));
        assert_eq!(ok.cpus, Some(10));

        let err = JobOptions::from_yaml_str("memory: 80G\nthreads: 10\n").unwrap_err();
        assert!(matches!(err, runtime::Error::InvalidJobOptions { .. }));
    }

    #[test]
    fn validation() {
        for memory in ["80G", "4000M", "16gb", "1.5T", "512"] {
            let o = JobOptions {
                memory: Some(memory.to_string()),
                ..Default::default()
            };
            assert!(o.validate().is_ok(), "{}", memory);
        }
        for memory in ["eighty", "G80", "80 G", ""] {
            let o = JobOptions {
                memory: Some(memory.to_string()),
                ..Default::default()
            };
            assert!(o.validate().is_err(), "{}", memory);
        }
        assert!(JobOptions::default().with_job_name("").validate().is_err());
        assert!(JobOptions::default().with_job_name("Map x").validate().is_err());
        let o = JobOptions {
            cpus: Some(0),
            ..Default::default()
        };
        assert!(o.validate().is_err());
    }

    #[test]
    fn overlay_prefers_set_fields() {
        let base = JobOptions {
            memory: Some("8G".to_string()),
            partition: Some("low".to_string()),
            mail_events: vec!["END".to_string()],
            ..Default::default()
        };
        let cli = JobOptions {
            memory: Some("80G".to_string()),
            ..Default::default()
        };
        let merged = base.overlay(cli);
        assert_eq!(merged.memory.as_deref(), Some("80G"));
        assert_eq!(merged.partition.as_deref(), Some("low"));
        assert_eq!(merged.mail_events, vec!["END"]);
    }

    #[test]
    fn mail_events_drop_unknown() {
        let o = JobOptions {
            mail_events: vec!["end".into(), "LATER".into(), "START".into(), "END".into()],
            ..Default::default()
        };
        assert_eq!(o.parsed_mail_events(), vec![MailEvent::End, MailEvent::Start]);
        assert_eq!(o.shell_line(), DEFAULT_SHELL);
    }
}
