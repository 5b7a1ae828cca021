pub const RUN_DEFAULT_PATH_LOGS: &str = "clusterq_logs";
pub const RUN_DEFAULT_PREFIX: &str = "";
pub const RUN_DEFAULT_THREADS: usize = 1;
