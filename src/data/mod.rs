mod catalog;
#[cfg(feature = "files")]
mod files;
mod join;
mod record;
mod source;

pub use catalog::AreaCatalog;
#[cfg(feature = "files")]
pub use files::{FileSource, ValueColumns};
pub use join::{JoinCoverage, JoinIndex, ValueRange};
pub use record::{ValueRecord, ValuesResponse};
pub use source::{DataSource, MemSource};
