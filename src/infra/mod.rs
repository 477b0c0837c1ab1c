pub mod config_store;
pub mod ftp;
pub mod local_fs;
pub mod webif;
