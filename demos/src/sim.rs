use std::string::String;
use std::time::Instant;

use embassy_time::Duration;
use startiot::cycle::{Board, Broker, Readings, Sensors};
use startiot::Modem;

#[derive(Debug)]
pub struct SimError;

/// Modem that attaches and connects after fixed wall-clock delays.
pub struct SimModem {
    firmware: &'static str,
    attach_after: std::time::Duration,
    connect_after: std::time::Duration,
    initialized: bool,
    radio_on_at: Option<Instant>,
    connect_at: Option<Instant>,
    detached: bool,
    response: String,
}

impl SimModem {
    /// `firmware` is the identifier line reported by `ATI1`, e.g. `UE5.0.0.0d`
    /// for LTE-M or `UE6.0.0.0` for NB-IoT.
    pub fn new(
        firmware: &'static str,
        attach_after: std::time::Duration,
        connect_after: std::time::Duration,
    ) -> Self {
        Self {
            firmware,
            attach_after,
            connect_after,
            initialized: false,
            radio_on_at: None,
            connect_at: None,
            detached: false,
            response: String::new(),
        }
    }
}

impl Modem for SimModem {
    type Error = SimError;

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.radio_on_at = None;
        self.connect_at = None;
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        if !self.initialized {
            return Err(SimError);
        }
        self.initialized = false;
        self.radio_on_at = None;
        self.connect_at = None;
        Ok(())
    }

    fn init(&mut self) -> Result<(), Self::Error> {
        self.initialized = true;
        self.detached = false;
        Ok(())
    }

    fn send_at_cmd(&mut self, cmd: &str) -> Option<&str> {
        if !self.initialized {
            return None;
        }
        self.response = match cmd {
            "ATI1" => format!("\r\n{}\r\nLR5.1.1.0-41019\r\n\r\nOK\r\n", self.firmware),
            "AT+CSQ" => String::from("\r\n+CSQ: 17,99\r\n\r\nOK\r\n"),
            "AT+CEMODE?" => String::from("\r\n+CEMODE: 0\r\n\r\nOK\r\n"),
            "AT+CFUN=1" => {
                self.radio_on_at = Some(Instant::now());
                String::from("\r\nOK\r\n")
            }
            "AT+CFUN=0" => {
                self.radio_on_at = None;
                String::from("\r\nOK\r\n")
            }
            _ => String::from("\r\nOK\r\n"),
        };
        Some(self.response.as_str())
    }

    fn is_attached(&mut self) -> bool {
        !self.detached
            && self
                .radio_on_at
                .is_some_and(|at| at.elapsed() >= self.attach_after)
    }

    fn is_connected(&mut self) -> bool {
        self.is_attached()
            && self
                .connect_at
                .is_some_and(|at| at.elapsed() >= self.connect_after)
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        self.connect_at = Some(Instant::now());
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), Self::Error> {
        self.connect_at = None;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), Self::Error> {
        self.detached = true;
        self.connect_at = None;
        Ok(())
    }
}

/// Fixed greenhouse readings.
pub struct SimSensors;

impl Sensors for SimSensors {
    type Error = SimError;

    fn read(&mut self) -> Result<Readings, Self::Error> {
        Ok(Readings::from_raw(&[212, 187], 23.4, 61.2, 101_020.0))
    }
}

/// Broker that only logs what it is asked to publish.
#[derive(Default)]
pub struct LogBroker {
    connected: bool,
}

impl Broker for LogBroker {
    type Error = SimError;

    fn connect(&mut self) -> Result<(), Self::Error> {
        log::info!("Broker connected");
        self.connected = true;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error> {
        if !self.connected {
            return Err(SimError);
        }
        log::info!("{} <- {}", topic, String::from_utf8_lossy(payload));
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), Self::Error> {
        self.connected = false;
        Ok(())
    }
}

/// Host process standing in for the board. Deep sleep and reboot end the
/// process, since a real wake starts the program from the top.
pub struct HostBoard {
    booted: Instant,
}

impl HostBoard {
    pub fn new() -> Self {
        Self {
            booted: Instant::now(),
        }
    }
}

impl Default for HostBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Board for HostBoard {
    fn uptime(&mut self) -> Duration {
        let elapsed = self.booted.elapsed();
        Duration::from_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }

    fn reboot(&mut self) -> ! {
        log::warn!("Rebooting");
        std::process::exit(1)
    }

    fn deep_sleep(&mut self, duration: Duration) -> ! {
        log::info!("Deep sleep for {} ms, exiting", duration.as_millis());
        std::process::exit(0)
    }
}
