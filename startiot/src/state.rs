/// Progress of the modem bring-up.
///
/// Transitions are strictly forward. The three failure states are terminal:
/// once reached, the sequence is over and the caller decides how to recover.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    Initializing,
    FirmwareChecked,
    Configuring,
    Attaching,
    Attached,
    Connecting,
    Connected,
    FirmwareMismatch,
    AttachTimedOut,
    ConnectTimedOut,
}

impl ConnectionState {
    pub const fn is_failed(self) -> bool {
        matches!(
            self,
            Self::FirmwareMismatch | Self::AttachTimedOut | Self::ConnectTimedOut
        )
    }

    pub const fn is_terminal(self) -> bool {
        self.is_failed() || matches!(self, Self::Connected)
    }
}
