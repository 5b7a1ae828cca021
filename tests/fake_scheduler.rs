#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use clusterq::backend::{ClusterScheduler, Scheduler};
use clusterq::exec::ShellExecutor;
use clusterq::runtime;
use clusterq::{params, Backend, Dispatch, DispatchState, FileSet, JobOptions};

fn install(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    let script = format!("#!/bin/sh\ndir='{}'\n{}", dir.display(), body);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

const SBATCH: &str = r#"
for arg in "$@"; do
  case "$arg" in
    --job-name=*) echo "${arg#--job-name=}" >> "$dir/queue" ;;
  esac
done
cat >> "$dir/scripts"
n=$(wc -l < "$dir/queue" | tr -d ' ')
echo "Submitted batch job $((481212 + n))"
"#;

const SQUEUE: &str = r#"
[ -f "$dir/queue" ] && cat "$dir/queue"
exit 0
"#;

const QSUB: &str = r#"
cat >> "$dir/torque_scripts"
echo "77.headnode.cluster"
"#;

const QSTAT: &str = r#"
echo "<Data><Job><Job_Name>Call_sample1</Job_Name><Job_Owner>alice@login</Job_Owner><job_state>R</job_state></Job></Data>"
"#;

// Everything lives in one test: it rewrites PATH for the whole process
#[test]
fn talks_to_fake_scheduler_clients() {
    let bin = tempfile::tempdir().unwrap();
    install(bin.path(), "sbatch", SBATCH);
    install(bin.path(), "squeue", SQUEUE);
    install(bin.path(), "qsub", QSUB);
    install(bin.path(), "qstat", QSTAT);
    let old_path = std::env::var_os("PATH").unwrap_or_default();
    let mut paths = vec![bin.path().to_path_buf()];
    paths.extend(std::env::split_paths(&old_path));
    std::env::set_var("PATH", std::env::join_paths(paths).unwrap());

    let work = tempfile::tempdir().unwrap();
    let files = FileSet::new(
        "/data/reads",
        vec![
            "/data/reads/sample1.fq.gz".into(),
            "/data/reads/sample2.fq.gz".into(),
        ],
    );
    let params_io = params::IO {
        path_out: None,
        path_logs: work.path().join("logs"),
    };
    let params_runtime = params::Runtime {
        prefix: "Map_".to_string(),
        options: JobOptions {
            memory: Some("80G".to_string()),
            ..Default::default()
        },
        user: "alice".to_string(),
        dry_run: false,
    };
    let params_threading = params::Threading { threads_submit: 1 };
    let formatter = |p: &Path| -> anyhow::Result<String> { Ok(format!("bbmap.sh in={}", p.display())) };

    // Slurm: submit both, then a re-run finds them queued
    let slurm: Arc<dyn Scheduler> = Arc::new(ClusterScheduler::new(Backend::Slurm, ShellExecutor::new()));
    let first = Dispatch::run(
        &params_io,
        &params_runtime,
        &params_threading,
        &files,
        &formatter,
        Some(slurm.clone()),
    )
    .unwrap();
    let ids: Vec<_> = first
        .records()
        .iter()
        .map(|r| r.id().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["481213", "481214"]);
    let scripts = std::fs::read_to_string(bin.path().join("scripts")).unwrap();
    assert!(scripts.starts_with("#!/bin/sh\nbbmap.sh in=/data/reads/sample1.fq.gz\n"));

    let second = Dispatch::run(
        &params_io,
        &params_runtime,
        &params_threading,
        &files,
        &formatter,
        Some(slurm),
    )
    .unwrap();
    assert_eq!(second.count(|s| *s == DispatchState::Deduplicated), 2);

    // Torque: host-qualified ids, XML query filtered by owner
    let torque: Arc<dyn Scheduler> = Arc::new(ClusterScheduler::new(Backend::Torque, ShellExecutor::new()));
    let existing = torque.existing_jobs("alice").unwrap();
    assert!(existing.contains("Call_sample1"));
    assert!(torque.existing_jobs("bob").unwrap().is_empty());

    let options = JobOptions::default().with_job_name("Call_sample2");
    let record = torque.submit("gatk HaplotypeCaller", &options).unwrap();
    assert_eq!(record.id(), Some("77.headnode.cluster"));

    // No client programs at all: the query cannot run, which is not the same as failing
    let empty = tempfile::tempdir().unwrap();
    std::env::set_var("PATH", empty.path());
    let slurm = ClusterScheduler::new(Backend::Slurm, ShellExecutor::new());
    let err = slurm.existing_jobs("alice").unwrap_err();
    assert!(matches!(err, runtime::Error::CommandExecutionFailed { .. }));

    std::env::set_var("PATH", old_path);
}
