pub mod editor;
pub mod error;
pub mod extractor;
pub mod interaction;
pub mod models;
pub mod source;
pub mod sync;
pub mod table;
pub mod translation;

pub use editor::CategorySheet;
pub use error::{Result, Rule1Error};
pub use extractor::{Extraction, MetricExtractor};
pub use sync::{RowSynchronizer, SyncOptions, SyncReport};
