pub mod console;
pub mod filesystem;
pub mod memory;
pub mod network;
