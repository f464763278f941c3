//! One wake cycle of a sensor node: bring the link up, publish a set of
//! readings, shut everything down and work out how long to sleep.
//!
//! Retry across cycles is not handled here. A failed cycle simply sleeps
//! until the next one, or reboots if the modem stopped answering.

use core::fmt::Write;

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::config::Config;
use crate::connection::Connection;
use crate::timer;
use crate::traits::Modem;
use crate::Error;

pub const MAX_TOPIC_LEN: usize = 64;
pub const MAX_PAYLOAD_LEN: usize = 160;

/// One set of sensor values, already converted to the units that get
/// published.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readings {
    /// Mean of the ambient light channels, in lux
    pub light: f32,
    /// Degrees Celsius
    pub temperature: f32,
    /// Relative humidity in percent
    pub humidity: f32,
    /// Hectopascal
    pub pressure: f32,
}

impl Readings {
    /// Build readings from raw sensor output. `pressure_pa` is in pascal.
    pub fn from_raw(
        light_channels: &[u16],
        temperature: f32,
        humidity: f32,
        pressure_pa: f32,
    ) -> Self {
        let light = if light_channels.is_empty() {
            0.0
        } else {
            let sum: u32 = light_channels.iter().map(|&c| u32::from(c)).sum();
            sum as f32 / light_channels.len() as f32
        };
        Self {
            light,
            temperature,
            humidity,
            pressure: pressure_pa / 100.0,
        }
    }

    /// Write the readings as a JSON object with one decimal per value.
    pub fn write_json<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        write!(
            w,
            "{{\"light\": {{\"value\": {:.1}}}, \"temperature\": {{\"value\": {:.1}}}, \
             \"humidity\": {{\"value\": {:.1}}}, \"pressure\": {{\"value\": {:.1}}}}}",
            self.light, self.temperature, self.humidity, self.pressure
        )
    }

    pub fn payload(&self) -> Result<String<MAX_PAYLOAD_LEN>, Error> {
        let mut buf = String::new();
        self.write_json(&mut buf).map_err(|_| Error::Overflow)?;
        Ok(buf)
    }
}

pub trait Sensors {
    type Error;

    fn read(&mut self) -> Result<Readings, Self::Error>;
}

/// Message broker session carried over the cellular link.
pub trait Broker {
    type Error;

    fn connect(&mut self) -> Result<(), Self::Error>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error>;

    fn disconnect(&mut self) -> Result<(), Self::Error>;
}

/// Board level services. `reboot` and `deep_sleep` do not return on
/// hardware: waking from deep sleep starts the program from the top.
pub trait Board {
    /// Time since the device booted, which is also when the cycle started.
    fn uptime(&mut self) -> Duration;

    fn reboot(&mut self) -> !;

    fn deep_sleep(&mut self, duration: Duration) -> !;
}

/// What the device does once a cycle is over.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Sleep(Duration),
    Reboot,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CycleConfig {
    pub(crate) period: Duration,
    pub(crate) publish_hold: Duration,
    pub(crate) client_id: &'static str,
    pub(crate) topic_prefix: &'static str,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(300),
            publish_hold: Duration::from_secs(5),
            client_id: "fipy-pycom",
            topic_prefix: "/v1.6/devices/",
        }
    }
}

impl CycleConfig {
    /// Wake-to-wake period.
    #[must_use]
    pub const fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// How long to keep the link up after publishing, so the broker client
    /// can flush.
    #[must_use]
    pub const fn publish_hold(mut self, hold: Duration) -> Self {
        self.publish_hold = hold;
        self
    }

    #[must_use]
    pub const fn client_id(mut self, client_id: &'static str) -> Self {
        self.client_id = client_id;
        self
    }

    #[must_use]
    pub const fn topic_prefix(mut self, prefix: &'static str) -> Self {
        self.topic_prefix = prefix;
        self
    }

    pub fn topic(&self) -> Result<String<MAX_TOPIC_LEN>, Error> {
        let mut topic = String::new();
        topic
            .push_str(self.topic_prefix)
            .map_err(|_| Error::Overflow)?;
        topic.push_str(self.client_id).map_err(|_| Error::Overflow)?;
        Ok(topic)
    }

    /// Sleep time left in this period, zero if the cycle overran it.
    pub fn sleep_time(&self, elapsed: Duration) -> Duration {
        self.period
            .checked_sub(elapsed)
            .unwrap_or(Duration::from_ticks(0))
    }
}

/// Everything one wake cycle needs, owned in one place.
pub struct WakeCycle<M, D, S, B> {
    modem: M,
    delay: D,
    sensors: S,
    broker: B,
    config: Config,
    cycle: CycleConfig,
}

impl<M, D, S, B> WakeCycle<M, D, S, B>
where
    M: Modem,
    D: DelayNs,
    S: Sensors,
    B: Broker,
{
    pub fn new(
        modem: M,
        delay: D,
        sensors: S,
        broker: B,
        config: Config,
        cycle: CycleConfig,
    ) -> Self {
        Self {
            modem,
            delay,
            sensors,
            broker,
            config,
            cycle,
        }
    }

    /// Run the cycle and decide what the device does next.
    pub fn run<Bd: Board>(&mut self, board: &mut Bd) -> Outcome {
        info!("Started connecting to the network...");
        match self.transmit() {
            Ok(()) => info!("Cycle complete"),
            Err(e) if e.requires_reboot() => {
                error!("Modem unresponsive, rebooting device...");
                return Outcome::Reboot;
            }
            Err(e) => error!("Cycle failed: {:?}", e),
        }

        let sleep = self.cycle.sleep_time(board.uptime());
        info!("Going to sleep for {} ms", sleep.as_millis());
        Outcome::Sleep(sleep)
    }

    fn transmit(&mut self) -> Result<(), Error> {
        let mut conn = match Connection::new(&mut self.modem, &mut self.delay, self.config) {
            Ok(conn) => conn,
            Err(e) => {
                if !e.requires_reboot() && self.modem.deinit().is_err() {
                    warn!("Modem deinit failed");
                }
                return Err(e);
            }
        };

        let result = conn
            .connect()
            .and_then(|()| publish(&mut self.sensors, &mut self.broker, &self.cycle, conn.delay_mut()));

        conn.shutdown();
        result
    }

    /// Give the collaborators back, e.g. to inspect them after a cycle.
    pub fn release(self) -> (M, D, S, B) {
        (self.modem, self.delay, self.sensors, self.broker)
    }
}

fn publish<S, B, D>(
    sensors: &mut S,
    broker: &mut B,
    cycle: &CycleConfig,
    delay: &mut D,
) -> Result<(), Error>
where
    S: Sensors,
    B: Broker,
    D: DelayNs,
{
    broker.connect().map_err(|_| Error::Broker)?;

    let result = sensors
        .read()
        .map_err(|_| Error::Sensor)
        .and_then(|readings| {
            let topic = cycle.topic()?;
            let payload = readings.payload()?;
            info!("Publishing {} to {}", payload.as_str(), topic.as_str());
            broker
                .publish(&topic, payload.as_bytes())
                .map_err(|_| Error::Broker)?;
            timer::sleep(delay, cycle.publish_hold);
            Ok(())
        });

    if broker.disconnect().is_err() {
        warn!("Broker disconnect failed");
    } else {
        info!("Disconnected from broker");
    }
    result
}

/// Hand the outcome of a cycle to the board. Never returns.
pub fn finish<Bd: Board>(board: &mut Bd, outcome: Outcome) -> ! {
    match outcome {
        Outcome::Sleep(duration) => board.deep_sleep(duration),
        Outcome::Reboot => board.reboot(),
    }
}
