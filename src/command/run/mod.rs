pub mod command;
pub mod constants;
pub mod core;

pub use command::Command as RunCMD;
pub use core::core::{Dispatch, DispatchReport, DispatchState, FileCommand, FileOutcome};
pub use core::params;
pub use core::template::CommandTemplate;
