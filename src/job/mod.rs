mod options;
mod record;

pub use options::JobOptions;
pub use options::MailEvent;
pub use options::DEFAULT_SHELL;

pub use record::resolved_ids;
pub use record::JobRecord;
