use crate::config::NetworkTechnology;
use crate::Error;

/// Identifier prefix reported by NB-IoT modem firmware.
pub const NB_IOT_FIRMWARE_PREFIX: &str = "UE6";

/// Line of the `ATI1` response holding the firmware identifier. The version
/// follows on the next line.
const IDENTIFIER_LINE: usize = 1;

/// The two mutually exclusive modem firmware builds.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirmwareFamily {
    LteM,
    NbIot,
}

impl FirmwareFamily {
    pub const fn name(self) -> &'static str {
        match self {
            Self::LteM => "LTE-M",
            Self::NbIot => "NB-IoT",
        }
    }
}

/// Firmware details read from the identification response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareInfo<'a> {
    pub identifier: &'a str,
    pub version: &'a str,
    pub family: FirmwareFamily,
}

impl<'a> FirmwareInfo<'a> {
    /// Parse the raw `ATI1` response.
    ///
    /// Returns `None` when the response is too short to carry an identifier
    /// line. A missing version line is reported as an empty version.
    pub fn parse(response: &'a str) -> Option<Self> {
        let mut lines = response.split("\r\n").skip(IDENTIFIER_LINE);
        let identifier = lines.next()?;
        let version = lines.next().unwrap_or("");
        let family = if identifier.starts_with(NB_IOT_FIRMWARE_PREFIX) {
            FirmwareFamily::NbIot
        } else {
            FirmwareFamily::LteM
        };
        Some(Self {
            identifier,
            version,
            family,
        })
    }
}

/// Check that the modem firmware supports `requested`.
///
/// `response` is the answer to the identification query, `None` if the modem
/// did not answer. An unreadable response is reported as
/// [`Error::Unresponsive`], never as a mismatch.
pub fn assure_firmware(
    requested: NetworkTechnology,
    response: Option<&str>,
) -> Result<FirmwareFamily, Error> {
    let Some(firmware) = response.and_then(FirmwareInfo::parse) else {
        error!("Failed to determine modem firmware");
        return Err(Error::Unresponsive);
    };

    info!(
        "Modem is using {} firmware ({}/{})",
        firmware.family.name(),
        firmware.identifier,
        firmware.version
    );

    if firmware.family != requested.firmware_family() {
        error!(
            "Cannot connect using {} with {} firmware! Re-flash the modem with the correct firmware.",
            requested.name(),
            firmware.family.name()
        );
        return Err(Error::WrongNetwork {
            requested,
            detected: firmware.family,
        });
    }

    Ok(firmware.family)
}
