use embassy_time::Duration;
use embedded_hal::delay::DelayNs;

/// Returned when a [`PollTimer`] runs out before its condition holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeoutError;

/// Bounded busy-poll: evaluate a condition every `interval` until it holds or
/// `timeout` has accumulated.
///
/// Elapsed time is the sum of the delays performed, not a clock reading, so
/// time spent inside the condition itself is not counted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PollTimer {
    interval: Duration,
    timeout: Duration,
}

impl PollTimer {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Returns the elapsed time once `ready` reports true.
    ///
    /// `ready` is checked once before every delay and once more when the
    /// timeout is reached. A zero `interval` never accumulates time, so it
    /// gets a single check.
    pub fn wait_until<D: DelayNs>(
        &self,
        delay: &mut D,
        mut ready: impl FnMut() -> bool,
    ) -> Result<Duration, TimeoutError> {
        let mut elapsed = Duration::from_ticks(0);

        loop {
            if ready() {
                return Ok(elapsed);
            }
            if elapsed >= self.timeout || self.interval.as_ticks() == 0 {
                return Err(TimeoutError);
            }
            sleep(delay, self.interval);
            elapsed += self.interval;
        }
    }
}

/// Block for `duration`.
pub fn sleep<D: DelayNs>(delay: &mut D, duration: Duration) {
    let ms = duration.as_millis();
    delay.delay_ms(u32::try_from(ms).unwrap_or(u32::MAX));
}
