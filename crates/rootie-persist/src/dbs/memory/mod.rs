mod client;

pub use client::MemoryClient;
