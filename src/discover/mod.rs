mod discover;
mod fileset;

pub use discover::discover;
pub use discover::subdirectories;
pub use discover::DiscoverParams;
pub use discover::DEFAULT_INCLUDE_PATTERN;

pub use fileset::FileSet;
