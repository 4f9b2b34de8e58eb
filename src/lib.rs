// keybard - VIA/Vial keyboard configurator
// Front-end support: config file, persisted state, keycode names, .kbi files

pub mod config;
pub mod file;
pub mod keycodes;
pub mod storage;

pub use config::Config;
pub use file::FileError;
pub use storage::Storage;
