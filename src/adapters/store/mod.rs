mod memory;

pub use memory::MemoryHistoryStore;
