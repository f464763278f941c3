use core::fmt::Write;

use heapless::String;

use crate::Error;

/// Longest AT command the crate formats, including quoted arguments.
pub const MAX_CMD_LEN: usize = 128;

/// This trait needs to be implemented for every command type.
pub trait AtCmd {
    /// Write the full command, including the `AT` prefix and without line
    /// termination, into `w`.
    fn write<W: Write>(&self, w: &mut W) -> core::fmt::Result;

    /// Return the command as a heapless `String`.
    fn as_string(&self) -> Result<String<MAX_CMD_LEN>, Error> {
        let mut buf = String::new();
        self.write(&mut buf).map_err(|_| Error::Overflow)?;
        Ok(buf)
    }
}

/// Handle to the cellular radio, supplied by the modem driver.
///
/// Framing, echo handling and serial timing of the AT transport are the
/// driver's business; this crate only sees whole commands and whole responses.
pub trait Modem {
    type Error;

    fn reset(&mut self) -> Result<(), Self::Error>;

    fn deinit(&mut self) -> Result<(), Self::Error>;

    fn init(&mut self) -> Result<(), Self::Error>;

    /// Send an AT command and block until the modem answers.
    ///
    /// The response is the raw text, with lines separated by `\r\n`. `None`
    /// means the modem did not answer at all.
    fn send_at_cmd(&mut self, cmd: &str) -> Option<&str>;

    fn is_attached(&mut self) -> bool;

    fn is_connected(&mut self) -> bool;

    /// Request the data session. Does not wait for it to come up.
    fn connect(&mut self) -> Result<(), Self::Error>;

    fn disconnect(&mut self) -> Result<(), Self::Error>;

    fn detach(&mut self) -> Result<(), Self::Error>;
}

impl<M: Modem + ?Sized> Modem for &mut M {
    type Error = M::Error;

    fn reset(&mut self) -> Result<(), Self::Error> {
        (**self).reset()
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        (**self).deinit()
    }

    fn init(&mut self) -> Result<(), Self::Error> {
        (**self).init()
    }

    fn send_at_cmd(&mut self, cmd: &str) -> Option<&str> {
        (**self).send_at_cmd(cmd)
    }

    fn is_attached(&mut self) -> bool {
        (**self).is_attached()
    }

    fn is_connected(&mut self) -> bool {
        (**self).is_connected()
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> Result<(), Self::Error> {
        (**self).disconnect()
    }

    fn detach(&mut self) -> Result<(), Self::Error> {
        (**self).detach()
    }
}
