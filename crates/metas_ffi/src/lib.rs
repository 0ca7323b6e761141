//! FFI crate exposing metas core use cases to the UI shell.

pub mod api;
