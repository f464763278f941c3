use embassy_time::{Delay, Duration};
use startiot::cycle::{self, CycleConfig, WakeCycle};
use startiot::{Config, NetworkTechnology};
use startiot_demos::sim::{HostBoard, LogBroker, SimModem, SimSensors};

fn main() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut board = HostBoard::new();

    let technology = match std::env::args().nth(1).as_deref() {
        Some("nb-iot") => NetworkTechnology::NarrowBand,
        _ => NetworkTechnology::CategoryM,
    };
    let firmware = match technology {
        NetworkTechnology::NarrowBand => "UE6.0.0.0",
        NetworkTechnology::CategoryM => "UE5.0.0.0d",
    };
    let modem = SimModem::new(
        firmware,
        std::time::Duration::from_millis(2500),
        std::time::Duration::from_millis(1000),
    );

    let config = Config::new(technology).settle_delay(Duration::from_millis(500));
    let mut wake = WakeCycle::new(
        modem,
        Delay,
        SimSensors,
        LogBroker::default(),
        config,
        CycleConfig::default().publish_hold(Duration::from_secs(1)),
    );

    let outcome = wake.run(&mut board);
    cycle::finish(&mut board, outcome)
}
