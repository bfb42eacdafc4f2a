//! Pack and unpack command implementations

pub mod pack;
pub mod unpack;
