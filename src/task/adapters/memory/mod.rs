//! In-memory adapters for the task store and student directory.

mod directory;
mod store;

pub use directory::InMemoryStudentDirectory;
pub use store::InMemoryTaskStore;
