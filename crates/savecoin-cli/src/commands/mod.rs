//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod amount_utils;
pub mod hexdump;
pub mod scan;
pub mod set;
