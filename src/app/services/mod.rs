pub mod convert_service;
pub mod settings_service;
pub mod transfer_service;
