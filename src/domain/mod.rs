pub mod cccam;
pub mod config;
pub mod file_entry;
pub mod oscam;
pub mod ports;
pub mod transfer;
