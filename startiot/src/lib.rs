//! Cellular bring-up for battery powered sensor nodes on LTE-M or NB-IoT.
//!
//! A node wakes up, resets its modem, checks that the modem firmware matches
//! the radio technology it is going to use, configures the radio with a short
//! sequence of AT commands and then waits, with bounded time, for network
//! attach and for the data session. Each wait ends with a distinct error when
//! it runs out, so the caller can fail the cycle instead of hanging.
//!
//! The AT transport itself is provided by the modem driver through the
//! [`Modem`] trait. Waiting happens through any
//! [`embedded_hal::delay::DelayNs`], e.g. `embassy_time::Delay`.
//!
//! # Example
//!
//! ```ignore
//! use startiot::{Config, Connection, NetworkTechnology};
//!
//! let mut conn = Connection::new(modem, embassy_time::Delay, Config::new(NetworkTechnology::CategoryM))?;
//! conn.connect()?;
//! // ... use the link ...
//! conn.disconnect()?;
//! conn.detach()?;
//! ```
//!
//! A complete wake cycle, from bring-up to deep sleep, is available as
//! [`cycle::WakeCycle`].
//!
//! # Optional Cargo Features
//!
//! - **`log`** *(disabled by default)* — Log through the `log` crate,
//!   including every AT command and its response on the `INFO` level.
//! - **`defmt`** *(disabled by default)* — Log through `defmt` instead.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod commands;
mod config;
mod connection;
pub mod cycle;
mod error;
pub mod firmware;
mod state;
pub mod timer;
mod traits;

#[cfg(test)]
mod mock;

pub use self::config::{Config, NetworkTechnology, RadioConfig, Scan};
pub use self::connection::{response_lines, Connection};
pub use self::error::Error;
pub use self::firmware::FirmwareFamily;
pub use self::state::ConnectionState;
pub use self::traits::{AtCmd, Modem, MAX_CMD_LEN};

pub use embassy_time::Duration;
