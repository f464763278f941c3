use crate::config::NetworkTechnology;
use crate::firmware::FirmwareFamily;
use crate::state::ConnectionState;

/// Errors returned by the crate
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The installed modem firmware does not support the requested technology.
    /// Only re-flashing the modem (or asking for the other technology) helps.
    WrongNetwork {
        requested: NetworkTechnology,
        detected: FirmwareFamily,
    },
    /// The modem did not answer the identification query. No further AT
    /// command can be trusted to reach it, so the device has to reboot.
    Unresponsive,
    /// Timed out while waiting for network attach
    AttachTimeout,
    /// Timed out while waiting for the data session
    ConnectTimeout,
    /// The modem driver failed a lifecycle or link request
    Driver,
    /// Operation not allowed in the current connection state
    InvalidState(ConnectionState),
    /// Formatted command or payload does not fit its buffer
    Overflow,
    /// Reading the sensors failed
    Sensor,
    /// The message broker rejected a request
    Broker,
}

impl Error {
    /// The terminal connection state this failure leaves the orchestrator in,
    /// if it is one of the bring-up failures.
    pub const fn terminal_state(&self) -> Option<ConnectionState> {
        match self {
            Self::WrongNetwork { .. } => Some(ConnectionState::FirmwareMismatch),
            Self::AttachTimeout => Some(ConnectionState::AttachTimedOut),
            Self::ConnectTimeout => Some(ConnectionState::ConnectTimedOut),
            _ => None,
        }
    }

    /// Whether recovering from this error requires a full device reboot.
    pub const fn requires_reboot(&self) -> bool {
        matches!(self, Self::Unresponsive)
    }
}
