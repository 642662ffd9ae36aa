//! # Arm interface crate.
//!
//! Provides the interface types exchanged between the arm core and its
//! collaborators: the object detector (pixel points), the command interpreter
//! (table targets and commands) and the actuator transport (servo commands).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Pixel and table coordinate types
pub mod geom;

/// Telecommands accepted by the arm core
pub mod tc;

/// Command definitions for equipment (the arm servos)
pub mod eqpt;
