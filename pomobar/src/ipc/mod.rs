//! In-process side of the control-signal bridge.

pub mod receiver;
