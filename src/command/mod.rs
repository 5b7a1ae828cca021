pub mod backend;
pub mod discover;
pub mod job_args;
pub mod jobs;
pub mod run;
pub mod submit;

pub use backend::BackendCMD;
pub use discover::DiscoverArgs;
pub use discover::DiscoverCMD;
pub use jobs::JobsCMD;
pub use run::RunCMD;
pub use submit::SubmitCMD;

pub use run::{CommandTemplate, Dispatch, DispatchReport, DispatchState, FileCommand, FileOutcome};
