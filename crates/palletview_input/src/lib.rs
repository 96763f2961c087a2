//! Orbit camera input handling
//!
//! This crate provides damped orbit controls that rotate, pan and zoom a
//! camera around a target point, driven by winit mouse input.

mod orbit_controls;

pub use orbit_controls::{OrbitControls, OrbitCamera};
