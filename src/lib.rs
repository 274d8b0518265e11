pub mod error;
pub mod fingerprint;
pub mod integrity;
pub mod package;
pub mod patch;
pub mod render;
pub mod runtime;
pub mod verify;
