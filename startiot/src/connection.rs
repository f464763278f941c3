use embassy_time::Duration;
use embedded_hal::delay::DelayNs;

use crate::commands::{configuration_sequence, Identify};
use crate::config::{Config, NetworkTechnology};
use crate::firmware::{assure_firmware, FirmwareFamily};
use crate::state::ConnectionState;
use crate::timer::{self, PollTimer};
use crate::traits::{AtCmd, Modem};
use crate::Error;

/// Non-blank lines of a raw modem response.
pub fn response_lines(response: &str) -> impl Iterator<Item = &str> {
    response
        .split("\r\n")
        .filter(|line| !line.trim().is_empty())
}

/// Owner of the modem for the duration of a wake cycle.
///
/// Construction resets the modem and verifies its firmware; [`connect`] then
/// configures the radio and waits, with bounded time, for attach and for the
/// data session. Every wait happens on the calling thread through `D`.
///
/// [`connect`]: Connection::connect
pub struct Connection<M, D>
where
    M: Modem,
    D: DelayNs,
{
    modem: M,
    delay: D,
    config: Config,
    state: ConnectionState,
    firmware: Option<FirmwareFamily>,
}

impl<M, D> Connection<M, D>
where
    M: Modem,
    D: DelayNs,
{
    /// Reset and initialise the modem, then check that its firmware supports
    /// the configured technology.
    ///
    /// Fails with [`Error::WrongNetwork`] on a firmware mismatch and with
    /// [`Error::Unresponsive`] if the modem does not identify itself. The
    /// latter can only be recovered by rebooting the device.
    pub fn new(modem: M, delay: D, config: Config) -> Result<Self, Error> {
        let mut conn = Self {
            modem,
            delay,
            config,
            state: ConnectionState::Initializing,
            firmware: None,
        };

        conn.restart()?;

        let requested = conn.config.technology;
        let family = {
            let cmd = Identify.as_string()?;
            let response = conn.send_at_cmd_logged(&cmd);
            assure_firmware(requested, response)?
        };

        conn.firmware = Some(family);
        conn.state = ConnectionState::FirmwareChecked;
        Ok(conn)
    }

    fn restart(&mut self) -> Result<(), Error> {
        // The modem may never have been initialised, so a failing deinit or
        // reset is expected here and only logged.
        if self.modem.deinit().is_err() {
            debug!("Modem deinit failed, ignoring");
        }
        if self.modem.reset().is_err() {
            debug!("Modem reset failed, ignoring");
        }
        timer::sleep(&mut self.delay, self.config.settle_delay);

        self.modem.init().map_err(|_| {
            error!("Modem init failed");
            Error::Driver
        })?;
        timer::sleep(&mut self.delay, self.config.settle_delay);
        Ok(())
    }

    /// Send a raw AT command, logging the command and every non-blank line of
    /// the response. The response is returned as is; a missing response is
    /// logged but not retried.
    pub fn send_at_cmd_logged(&mut self, cmd: &str) -> Option<&str> {
        info!("> {}", cmd);
        let response = self.modem.send_at_cmd(cmd);
        match response {
            Some(response) => {
                for line in response_lines(response) {
                    info!(">> {}", line);
                }
            }
            None => warn!(">> No response."),
        }
        response
    }

    /// Format and send `cmd`, see [`send_at_cmd_logged`].
    ///
    /// [`send_at_cmd_logged`]: Connection::send_at_cmd_logged
    pub fn send<C: AtCmd>(&mut self, cmd: &C) -> Result<Option<&str>, Error> {
        let cmd = cmd.as_string()?;
        Ok(self.send_at_cmd_logged(&cmd))
    }

    /// Configure the radio, then wait for attach and for the data session.
    ///
    /// The link-level connect is only requested once attach succeeded. Either
    /// timeout ends the sequence for good; there is no internal retry.
    ///
    /// If the driver rejects the connect request, [`Error::Driver`] is
    /// returned and the state stays [`ConnectionState::Attached`]; the caller
    /// may still [`detach`](Connection::detach) or shut down.
    pub fn connect(&mut self) -> Result<(), Error> {
        if self.state != ConnectionState::FirmwareChecked {
            error!("Cannot connect from state {:?}", self.state);
            return Err(Error::InvalidState(self.state));
        }

        self.state = ConnectionState::Configuring;
        let radio = self.config.radio;
        for cmd in configuration_sequence(self.config.technology, radio) {
            self.send(&cmd)?;
        }

        info!("Attaching...");
        self.state = ConnectionState::Attaching;
        match self.wait(self.config.attach_timeout, M::is_attached) {
            Ok(elapsed) => info!("Attached! ({} ms)", elapsed.as_millis()),
            Err(_) => {
                error!("Failed to attach to LTE (timeout)!");
                self.state = ConnectionState::AttachTimedOut;
                return Err(Error::AttachTimeout);
            }
        }
        self.state = ConnectionState::Attached;

        self.modem.connect().map_err(|_| {
            error!("Modem rejected the connect request");
            Error::Driver
        })?;

        info!("Connecting...");
        self.state = ConnectionState::Connecting;
        match self.wait(self.config.connect_timeout, M::is_connected) {
            Ok(elapsed) => info!("Connected! ({} ms)", elapsed.as_millis()),
            Err(_) => {
                error!("Failed to connect to LTE (timeout)!");
                self.state = ConnectionState::ConnectTimedOut;
                return Err(Error::ConnectTimeout);
            }
        }
        self.state = ConnectionState::Connected;
        Ok(())
    }

    fn wait(
        &mut self,
        timeout: Duration,
        query: fn(&mut M) -> bool,
    ) -> Result<Duration, timer::TimeoutError> {
        let modem = &mut self.modem;
        PollTimer::new(self.config.poll_interval, timeout)
            .wait_until(&mut self.delay, || query(modem))
    }

    /// Tear down the data session, if there is one.
    pub fn disconnect(&mut self) -> Result<(), Error> {
        if self.modem.is_connected() {
            debug!("Disconnecting");
            self.modem.disconnect().map_err(|_| Error::Driver)?;
        }
        Ok(())
    }

    /// Detach from the network, if attached.
    pub fn detach(&mut self) -> Result<(), Error> {
        if self.modem.is_attached() {
            debug!("Detaching");
            self.modem.detach().map_err(|_| Error::Driver)?;
        }
        Ok(())
    }

    /// Disconnect, detach and power the modem down before sleeping, then hand
    /// the modem back. Every step is attempted even if an earlier one failed.
    pub fn shutdown(mut self) -> M {
        if self.disconnect().is_err() {
            warn!("Disconnect failed during shutdown");
        }
        if self.detach().is_err() {
            warn!("Detach failed during shutdown");
        }
        if self.modem.deinit().is_err() {
            warn!("Modem deinit failed during shutdown");
        }
        self.modem
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn technology(&self) -> NetworkTechnology {
        self.config.technology
    }

    /// Firmware family reported by the modem during construction.
    pub fn firmware(&self) -> Option<FirmwareFamily> {
        self.firmware
    }

    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }
}
