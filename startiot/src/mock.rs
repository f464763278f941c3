//! Recording test doubles for the modem driver and the wake-cycle collaborators.

use std::string::{String, ToString};
use std::vec::Vec;

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use env_logger::Env;

use crate::cycle::{Board, Broker, Readings, Sensors};
use crate::traits::Modem;

pub const LTE_M_IDENTIFICATION: &str = "OK\r\nL2-1-2\r\n1.0.0";
pub const NB_IOT_IDENTIFICATION: &str = "\r\nUE6.0.0.0\r\nLR6.0.0.0-37781\r\n\r\nOK\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Reset,
    Deinit,
    Init,
    Connect,
    Disconnect,
    Detach,
}

/// Scripted modem.
///
/// Once the radio is switched on with `AT+CFUN=1`, the attached flag turns true
/// on the query following `attach_after` false answers. The connected flag
/// does the same with `connect_after`, counted from the connect request.
#[derive(Debug)]
pub struct MockModem {
    pub identification: Option<String>,
    pub ok_response: Option<String>,
    pub attach_after: Option<usize>,
    pub connect_after: Option<usize>,
    pub fail_reset: bool,
    pub fail_init: bool,
    pub fail_connect: bool,

    pub sent: Vec<String>,
    pub calls: Vec<Call>,
    pub attach_queries: usize,
    pub connect_queries: usize,
    radio_on: bool,
    attached: bool,
    connected: bool,
    connect_requested: bool,
}

impl MockModem {
    pub fn new(identification: Option<&str>) -> Self {
        Self {
            identification: identification.map(ToString::to_string),
            ok_response: Some("\r\nOK\r\n".to_string()),
            attach_after: Some(0),
            connect_after: Some(0),
            fail_reset: false,
            fail_init: false,
            fail_connect: false,
            sent: Vec::new(),
            calls: Vec::new(),
            attach_queries: 0,
            connect_queries: 0,
            radio_on: false,
            attached: false,
            connected: false,
            connect_requested: false,
        }
    }

    pub fn lte_m() -> Self {
        Self::new(Some(LTE_M_IDENTIFICATION))
    }

    pub fn nb_iot() -> Self {
        Self::new(Some(NB_IOT_IDENTIFICATION))
    }

    /// Commands sent after the identification query.
    pub fn configuration(&self) -> Vec<&str> {
        self.sent
            .iter()
            .skip_while(|c| c.as_str() != "ATI1")
            .skip(1)
            .map(String::as_str)
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    fn drop_link(&mut self) {
        self.radio_on = false;
        self.attached = false;
        self.connected = false;
        self.connect_requested = false;
    }
}

impl Modem for MockModem {
    type Error = DriverError;

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.calls.push(Call::Reset);
        if self.fail_reset {
            return Err(DriverError);
        }
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        self.calls.push(Call::Deinit);
        if self.fail_reset {
            return Err(DriverError);
        }
        self.drop_link();
        Ok(())
    }

    fn init(&mut self) -> Result<(), Self::Error> {
        self.calls.push(Call::Init);
        if self.fail_init {
            return Err(DriverError);
        }
        Ok(())
    }

    fn send_at_cmd(&mut self, cmd: &str) -> Option<&str> {
        self.sent.push(cmd.to_string());
        match cmd {
            "ATI1" => return self.identification.as_deref(),
            "AT+CFUN=1" => self.radio_on = true,
            "AT+CFUN=0" => self.drop_link(),
            _ => {}
        }
        self.ok_response.as_deref()
    }

    fn is_attached(&mut self) -> bool {
        if !self.attached && self.radio_on {
            self.attach_queries += 1;
            if matches!(self.attach_after, Some(n) if self.attach_queries > n) {
                self.attached = true;
            }
        }
        self.attached
    }

    fn is_connected(&mut self) -> bool {
        if !self.connected && self.connect_requested {
            self.connect_queries += 1;
            if matches!(self.connect_after, Some(n) if self.connect_queries > n) {
                self.connected = true;
            }
        }
        self.connected
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        self.calls.push(Call::Connect);
        if self.fail_connect {
            return Err(DriverError);
        }
        self.connect_requested = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), Self::Error> {
        self.calls.push(Call::Disconnect);
        self.connected = false;
        self.connect_requested = false;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), Self::Error> {
        self.calls.push(Call::Detach);
        self.drop_link();
        Ok(())
    }
}

/// Delay that only records what was asked of it.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub delays_ms: Vec<u32>,
}

impl MockDelay {
    pub fn calls(&self) -> usize {
        self.delays_ms.len()
    }

    pub fn total_ms(&self) -> u64 {
        self.delays_ms.iter().map(|&ms| u64::from(ms)).sum()
    }

    /// Number of delays of exactly `ms`.
    pub fn count(&self, ms: u32) -> usize {
        self.delays_ms.iter().filter(|&&d| d == ms).count()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

#[derive(Debug, Default)]
pub struct MockSensors {
    pub fail: bool,
}

impl Sensors for MockSensors {
    type Error = ();

    fn read(&mut self) -> Result<Readings, Self::Error> {
        if self.fail {
            return Err(());
        }
        Ok(Readings::from_raw(&[120, 81], 21.46, 40.04, 101_330.0))
    }
}

#[derive(Debug, Default)]
pub struct MockBroker {
    pub fail_connect: bool,
    pub connected: bool,
    pub published: Vec<(String, String)>,
    pub disconnects: usize,
}

impl Broker for MockBroker {
    type Error = ();

    fn connect(&mut self) -> Result<(), Self::Error> {
        if self.fail_connect {
            return Err(());
        }
        self.connected = true;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error> {
        let payload = core::str::from_utf8(payload).map_err(|_| ())?;
        self.published.push((topic.to_string(), payload.to_string()));
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), Self::Error> {
        self.connected = false;
        self.disconnects += 1;
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockBoard {
    pub uptime: Duration,
}

impl MockBoard {
    pub fn at(uptime: Duration) -> Self {
        Self { uptime }
    }
}

impl Board for MockBoard {
    fn uptime(&mut self) -> Duration {
        self.uptime
    }

    fn reboot(&mut self) -> ! {
        panic!("reboot requested")
    }

    fn deep_sleep(&mut self, duration: Duration) -> ! {
        panic!("deep sleep for {} ms", duration.as_millis())
    }
}

pub fn setup_log() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}
