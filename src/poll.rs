//! Periodic input sampling.

use crate::config::PollConfig;
use crate::device::F75111;
use crate::error::Result;
use crate::port::PortIo;
use crate::ui::{DisplaySink, DisplayUpdate};
use log::{debug, warn};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Runs one polling cycle: in input mode, reads both input registers and
/// reports all eight pin levels to `sink`. In output mode nothing is read or
/// reported. Returns whether a sample was taken.
pub fn poll_once<P: PortIo>(device: &F75111<P>, sink: &mut dyn DisplaySink) -> Result<bool> {
    match device.sample_inputs()? {
        Some(snapshot) => {
            for (pin, level) in snapshot.levels() {
                sink.show(DisplayUpdate::Level {
                    pin,
                    level: Some(level),
                });
            }
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Background thread that calls [`poll_once`] every `interval`.
///
/// Cycles never overlap, and each one runs under the device lock, so a
/// sample never splits a user-triggered transaction. Stop the poller before
/// closing the device; dropping it stops it too.
#[derive(Debug)]
pub struct Poller {
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn spawn<P, S>(device: Arc<F75111<P>>, config: PollConfig, mut sink: S) -> Result<Self>
    where
        P: PortIo + Send + 'static,
        S: DisplaySink + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = config.interval;
        let handle = thread::Builder::new()
            .name("f75111-poll".to_string())
            .spawn(move || {
                debug!("Input poller started ({:?} interval)", interval);
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    if let Err(e) = poll_once(&device, &mut sink) {
                        warn!("Input polling failed: {}", e);
                    }
                }
                debug!("Input poller stopped");
            })?;
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for a running cycle to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Input poller thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
