//! Palletview application library
//!
//! Configuration, input mapping and window management for the `palletview`
//! binary. Scene loading and rendering live in `palletview_core` and
//! `palletview_render`.

pub mod config;
pub mod input;
pub mod systems;
