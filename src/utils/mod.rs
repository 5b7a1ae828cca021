mod command_to_string;
mod detect_software;
mod expand_and_resolve_path;
mod rebase;

pub use command_to_string::args_to_string;
pub use command_to_string::command_to_string;
pub use command_to_string::shell_quote;

pub use detect_software::find_in_path;

pub use expand_and_resolve_path::expand_and_resolve_path;

pub use rebase::rebase;
pub use rebase::sample_stem;
