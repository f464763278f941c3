use embassy_time::Duration;

use crate::firmware::FirmwareFamily;

/// Radio access technology the modem should attach with.
///
/// The modem firmware only supports one of these at a time, so the choice has
/// to match what has been flashed on the radio.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkTechnology {
    /// LTE Cat-M1
    #[default]
    CategoryM,
    /// NB-IoT
    NarrowBand,
}

impl NetworkTechnology {
    /// The firmware family required to operate with this technology.
    pub const fn firmware_family(self) -> FirmwareFamily {
        match self {
            Self::CategoryM => FirmwareFamily::LteM,
            Self::NarrowBand => FirmwareFamily::NbIot,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::CategoryM => "LTE-M",
            Self::NarrowBand => "NB-IoT",
        }
    }
}

/// Which downlink frequencies the modem scans when searching for a cell.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scan {
    /// A single E-UTRA channel (EARFCN).
    Channel(u32),
    /// Every channel between `min` and `max`, inclusive.
    Range { min: u32, max: u32 },
}

/// Operator specific radio parameters.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    /// LTE frequency band
    pub band: u8,
    /// Access point name of the carrier data service
    pub apn: &'static str,
    pub scan: Scan,
    /// Numeric MCC-MNC operator code, used to lock NB-IoT onto one network
    pub operator: u32,
}

impl RadioConfig {
    /// Telenor Start IoT, Norway.
    ///
    /// Use band 28 when close to the Russian border in Finnmark.
    pub const TELENOR: RadioConfig = RadioConfig {
        band: 20,
        apn: "services.telenor.se",
        scan: Scan::Channel(6352),
        operator: 24201,
    };

    #[must_use]
    pub const fn with_band(mut self, band: u8) -> Self {
        self.band = band;
        self
    }

    #[must_use]
    pub const fn with_scan(mut self, scan: Scan) -> Self {
        self.scan = scan;
        self
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self::TELENOR
    }
}

static DEFAULT_RADIO: RadioConfig = RadioConfig::TELENOR;

/// Configuration of the connection orchestrator. All values are fixed at
/// build time; none of them change while a [`Connection`] is alive.
///
/// [`Connection`]: crate::Connection
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    pub(crate) technology: NetworkTechnology,
    pub(crate) radio: &'static RadioConfig,
    pub(crate) attach_timeout: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) poll_interval: Duration,
    pub(crate) settle_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            technology: NetworkTechnology::CategoryM,
            radio: &DEFAULT_RADIO,
            attach_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(250),
            settle_delay: Duration::from_secs(5),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new(technology: NetworkTechnology) -> Self {
        Self {
            technology,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn radio(mut self, radio: &'static RadioConfig) -> Self {
        self.radio = radio;
        self
    }

    #[must_use]
    pub const fn attach_timeout(mut self, timeout: Duration) -> Self {
        self.attach_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub const fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub const fn technology(&self) -> NetworkTechnology {
        self.technology
    }

    pub const fn radio_config(&self) -> &'static RadioConfig {
        self.radio
    }
}
