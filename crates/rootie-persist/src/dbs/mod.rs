pub mod memory;
pub mod sqlite;

pub use memory::MemoryClient;
pub use sqlite::SqliteClient;
