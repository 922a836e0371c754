use f75111_gpio::{DevPort, DisplayUpdate, F75111, PollConfig, Poller, Result};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    env_logger::init();
    let device = Arc::new(F75111::open(DevPort::load_default())?);

    // The poller pushes updates through a channel; print them here
    let (tx, rx) = mpsc::channel::<DisplayUpdate>();
    let poller = Poller::spawn(Arc::clone(&device), PollConfig::default(), tx)?;

    let deadline = Instant::now() + Duration::from_secs(5);
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match rx.recv_timeout(remaining) {
            Ok(DisplayUpdate::Level {
                pin,
                level: Some(level),
            }) => println!("{}: {}", pin, level),
            Ok(_) => {}
            Err(_) => break,
        }
    }

    poller.stop();
    if let Ok(device) = Arc::try_unwrap(device) {
        device.close();
    }
    Ok(())
}
