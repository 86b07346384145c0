// Library management module
// This module handles music library scanning and indexing

pub mod indexer;
pub mod paths;
pub mod scanner;

pub use indexer::{LibraryIndexer, SyncProgress, SyncReport};
pub use scanner::DirectoryScanner;
