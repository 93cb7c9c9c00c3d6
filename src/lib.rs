pub mod archive;
pub mod commands;
pub mod download;
pub mod http;
pub mod manifest;
pub mod metadata;
pub mod package_manager;
pub mod platform;
pub mod runtime;
