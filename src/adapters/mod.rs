//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod json_export_adapter;
pub mod run_dir_adapter;
