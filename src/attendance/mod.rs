pub mod file_store;
pub mod mysql_store;
pub mod resolver;
pub mod store;

pub use file_store::JsonFileStore;
pub use mysql_store::MySqlStore;
pub use resolver::{AttendanceResolver, NextEvent, next_event};
pub use store::{AttendanceStore, InMemoryStore, StoreBackend};
