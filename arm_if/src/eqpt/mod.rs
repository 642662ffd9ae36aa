//! # Equipment Interface
//!
//! This module defines the interface structures which will be sent to the actuator transport.

/// Arm joint identifiers, joint angles and servo commands
pub mod arm;
