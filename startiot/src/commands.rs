//! AT commands issued during modem bring-up.
//!
//! The `AT!="..."` commands are Sequans vendor extensions for scan
//! configuration.

use core::fmt::Write;

use heapless::Vec;

use crate::config::{NetworkTechnology, RadioConfig, Scan};
use crate::traits::AtCmd;

/// Request manufacturer identification (firmware family and version).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identify;

impl AtCmd for Identify {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        w.write_str("ATI1")
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Functionality {
    /// Radio off
    Minimum = 0,
    Full = 1,
}

/// `AT+CFUN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetFunctionality {
    pub fun: Functionality,
}

impl AtCmd for SetFunctionality {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        write!(w, "AT+CFUN={}", self.fun as u8)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EpsMode {
    /// PS mode 2, data only
    Ps2 = 0,
    Cs1 = 1,
    Cs2 = 2,
    Ps1 = 3,
}

/// `AT+CEMODE=<mode>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetEpsMode {
    pub mode: EpsMode,
}

impl AtCmd for SetEpsMode {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        write!(w, "AT+CEMODE={}", self.mode as u8)
    }
}

/// `AT+CEMODE?`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEpsMode;

impl AtCmd for GetEpsMode {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        w.write_str("AT+CEMODE?")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearScanConfig;

impl AtCmd for ClearScanConfig {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        w.write_str("AT!=\"clearscanconfig\"")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddScanFreq {
    pub band: u8,
    pub earfcn: u32,
}

impl AtCmd for AddScanFreq {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        write!(
            w,
            "AT!=\"addscanfreq band={} dl-earfcn={}\"",
            self.band, self.earfcn
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddScanFreqRange {
    pub band: u8,
    pub min: u32,
    pub max: u32,
}

impl AtCmd for AddScanFreqRange {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        write!(
            w,
            "AT!=\"addscanfreqrange band={} dl-earfcn-min={} dl-earfcn-max={}\"",
            self.band, self.min, self.max
        )
    }
}

/// `AT+CGDCONT`, always PDP context 1 with an IP bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinePdpContext<'a> {
    pub apn: &'a str,
}

impl AtCmd for DefinePdpContext<'_> {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        write!(w, "AT+CGDCONT=1,\"IP\",\"{}\"", self.apn)
    }
}

/// `AT+COPS`, manual selection using the numeric operator format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOperator {
    pub operator: u32,
}

impl AtCmd for SelectOperator {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        write!(w, "AT+COPS=1,2,\"{}\"", self.operator)
    }
}

/// `AT+CSQ`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalQuality;

impl AtCmd for SignalQuality {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        w.write_str("AT+CSQ")
    }
}

/// One step of the radio configuration sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCmd<'a> {
    SetFunctionality(SetFunctionality),
    SetEpsMode(SetEpsMode),
    GetEpsMode(GetEpsMode),
    ClearScanConfig(ClearScanConfig),
    AddScanFreq(AddScanFreq),
    AddScanFreqRange(AddScanFreqRange),
    DefinePdpContext(DefinePdpContext<'a>),
    SelectOperator(SelectOperator),
    SignalQuality(SignalQuality),
}

impl AtCmd for ConfigCmd<'_> {
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result {
        match self {
            Self::SetFunctionality(c) => c.write(w),
            Self::SetEpsMode(c) => c.write(w),
            Self::GetEpsMode(c) => c.write(w),
            Self::ClearScanConfig(c) => c.write(w),
            Self::AddScanFreq(c) => c.write(w),
            Self::AddScanFreqRange(c) => c.write(w),
            Self::DefinePdpContext(c) => c.write(w),
            Self::SelectOperator(c) => c.write(w),
            Self::SignalQuality(c) => c.write(w),
        }
    }
}

pub const MAX_SEQUENCE_LEN: usize = 8;

/// The ordered commands that prepare the radio for `technology`.
///
/// NB-IoT additionally switches to data-only EPS mode and locks onto the
/// configured operator. Cat-M ends with a signal quality query for the logs.
pub fn configuration_sequence(
    technology: NetworkTechnology,
    radio: &RadioConfig,
) -> Vec<ConfigCmd<'_>, MAX_SEQUENCE_LEN> {
    let radio_off = ConfigCmd::SetFunctionality(SetFunctionality {
        fun: Functionality::Minimum,
    });
    let radio_on = ConfigCmd::SetFunctionality(SetFunctionality {
        fun: Functionality::Full,
    });
    let scan = match radio.scan {
        Scan::Channel(earfcn) => ConfigCmd::AddScanFreq(AddScanFreq {
            band: radio.band,
            earfcn,
        }),
        Scan::Range { min, max } => ConfigCmd::AddScanFreqRange(AddScanFreqRange {
            band: radio.band,
            min,
            max,
        }),
    };
    let pdp = ConfigCmd::DefinePdpContext(DefinePdpContext { apn: radio.apn });

    let mut seq = Vec::new();
    let mut push = |cmd| {
        let pushed = seq.push(cmd).is_ok();
        debug_assert!(pushed, "configuration sequence exceeds MAX_SEQUENCE_LEN");
    };
    match technology {
        NetworkTechnology::NarrowBand => {
            push(radio_off);
            push(ConfigCmd::SetEpsMode(SetEpsMode { mode: EpsMode::Ps2 }));
            push(ConfigCmd::GetEpsMode(GetEpsMode));
            push(ConfigCmd::ClearScanConfig(ClearScanConfig));
            push(scan);
            push(pdp);
            push(ConfigCmd::SelectOperator(SelectOperator {
                operator: radio.operator,
            }));
            push(radio_on);
        }
        NetworkTechnology::CategoryM => {
            push(radio_off);
            push(ConfigCmd::ClearScanConfig(ClearScanConfig));
            push(scan);
            push(pdp);
            push(radio_on);
            push(ConfigCmd::SignalQuality(SignalQuality));
        }
    }
    seq
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(seq: &[ConfigCmd<'_>]) -> std::vec::Vec<std::string::String> {
        seq.iter()
            .map(|c| c.as_string().unwrap().as_str().to_owned())
            .collect()
    }

    #[test]
    fn format_commands() {
        assert_eq!(Identify.as_string().unwrap(), "ATI1");
        assert_eq!(
            SetFunctionality {
                fun: Functionality::Minimum
            }
            .as_string()
            .unwrap(),
            "AT+CFUN=0"
        );
        assert_eq!(
            AddScanFreq {
                band: 20,
                earfcn: 6352
            }
            .as_string()
            .unwrap(),
            "AT!=\"addscanfreq band=20 dl-earfcn=6352\""
        );
        assert_eq!(
            AddScanFreqRange {
                band: 20,
                min: 3450,
                max: 6352
            }
            .as_string()
            .unwrap(),
            "AT!=\"addscanfreqrange band=20 dl-earfcn-min=3450 dl-earfcn-max=6352\""
        );
        assert_eq!(
            DefinePdpContext {
                apn: "services.telenor.se"
            }
            .as_string()
            .unwrap(),
            "AT+CGDCONT=1,\"IP\",\"services.telenor.se\""
        );
        assert_eq!(
            SelectOperator { operator: 24201 }.as_string().unwrap(),
            "AT+COPS=1,2,\"24201\""
        );
    }

    #[test]
    fn overlong_command_overflows() {
        let apn = "a".repeat(200);
        let cmd = DefinePdpContext { apn: &apn };
        assert_eq!(cmd.as_string(), Err(crate::Error::Overflow));
    }

    #[test]
    fn nb_iot_sequence() {
        let seq = configuration_sequence(NetworkTechnology::NarrowBand, &RadioConfig::TELENOR);
        assert_eq!(
            strings(&seq),
            [
                "AT+CFUN=0",
                "AT+CEMODE=0",
                "AT+CEMODE?",
                "AT!=\"clearscanconfig\"",
                "AT!=\"addscanfreq band=20 dl-earfcn=6352\"",
                "AT+CGDCONT=1,\"IP\",\"services.telenor.se\"",
                "AT+COPS=1,2,\"24201\"",
                "AT+CFUN=1",
            ]
        );
    }

    #[test]
    fn lte_m_sequence() {
        let seq = configuration_sequence(NetworkTechnology::CategoryM, &RadioConfig::TELENOR);
        assert_eq!(
            strings(&seq),
            [
                "AT+CFUN=0",
                "AT!=\"clearscanconfig\"",
                "AT!=\"addscanfreq band=20 dl-earfcn=6352\"",
                "AT+CGDCONT=1,\"IP\",\"services.telenor.se\"",
                "AT+CFUN=1",
                "AT+CSQ",
            ]
        );
    }

    #[test]
    fn range_scan_replaces_single_channel() {
        let radio = RadioConfig::TELENOR.with_scan(Scan::Range {
            min: 3450,
            max: 6352,
        });
        let seq = configuration_sequence(NetworkTechnology::CategoryM, &radio);
        assert_eq!(seq.len(), 6);
        assert_eq!(
            seq[2],
            ConfigCmd::AddScanFreqRange(AddScanFreqRange {
                band: 20,
                min: 3450,
                max: 6352
            })
        );
    }
}
