pub mod backend;
pub mod command;
pub mod discover;
pub mod exec;
pub mod job;
pub mod runtime;
pub mod utils;

pub use backend::Backend;
pub use command::run::params;
pub use command::{CommandTemplate, Dispatch, DispatchReport, DispatchState, FileCommand};
pub use discover::{discover, DiscoverParams, FileSet};
pub use job::{JobOptions, JobRecord};
