mod store;
mod tables;

pub use store::InMemoryStore;
