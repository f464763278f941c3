//! Host-side stand-ins for the hardware a sensor node talks to.

#[cfg(feature = "std")]
pub mod sim;
