//! Hardware device sink: a bounded hand-off to a dedicated output thread.

use crate::error::{Error, Result};
use crate::router::MidiSink;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use segue_midi::MidiEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, warn};

pub const DEFAULT_HARDWARE_QUEUE: usize = 1024;

/// Byte-level device connection, used only on the output thread.
pub trait MidiWriter {
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

enum HardwareCommand {
    Event(MidiEvent),
    Shutdown,
}

/// [`MidiSink`] that never blocks: events go through a bounded channel to
/// `midi-output-thread`, which writes them in the order they were routed.
///
/// Event times are not re-sorted here: immediate sends carry time 0 while
/// scheduled ones carry absolute frames, and the router already releases
/// each cycle in time order.
pub struct HardwareOutput {
    sender: Sender<HardwareCommand>,
    handle: Mutex<Option<JoinHandle<()>>>,
    dropped: AtomicU64,
}

impl HardwareOutput {
    /// Spawn the output thread around an already open writer.
    pub fn spawn<W>(writer: W, capacity: usize) -> Result<Self>
    where
        W: MidiWriter + Send + 'static,
    {
        Self::spawn_with(capacity, move || Ok(writer))
    }

    /// Spawn the output thread and open the writer on it.
    ///
    /// Connection errors from `open` are returned here.
    pub fn spawn_with<W, F>(capacity: usize, open: F) -> Result<Self>
    where
        W: MidiWriter + 'static,
        F: FnOnce() -> Result<W> + Send + 'static,
    {
        let (sender, receiver) = bounded(capacity.max(1));
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let handle = thread::Builder::new()
            .name("midi-output-thread".to_string())
            .spawn(move || match open() {
                Ok(writer) => {
                    let _ = ready_tx.send(Ok(()));
                    Self::output_thread(receiver, writer);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => {
                return Err(Error::MidiDevice(
                    "MIDI output thread exited during startup".to_string(),
                ))
            }
        }

        debug!("MIDI output thread started");
        Ok(Self {
            sender,
            handle: Mutex::new(Some(handle)),
            dropped: AtomicU64::new(0),
        })
    }

    fn output_thread<W: MidiWriter>(receiver: Receiver<HardwareCommand>, mut writer: W) {
        let mut batch: Vec<MidiEvent> = Vec::with_capacity(64);
        loop {
            let first = match receiver.recv_timeout(Duration::from_millis(100)) {
                Ok(command) => command,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let mut shutdown = false;
            for command in std::iter::once(first).chain(receiver.try_iter()) {
                match command {
                    HardwareCommand::Event(event) => batch.push(event),
                    HardwareCommand::Shutdown => shutdown = true,
                }
            }

            for event in batch.drain(..) {
                let Some(bytes) = event.to_bytes() else {
                    warn!(?event, "event has no wire form, dropped");
                    continue;
                };
                if let Err(e) = writer.write(&bytes) {
                    error!("MIDI write failed: {}", e);
                }
            }

            if shutdown {
                break;
            }
        }
        debug!("MIDI output thread stopped");
    }

    /// Events dropped because the queue was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Flush what is queued and join the thread.
    pub fn shutdown(&self) {
        if let Some(handle) = self.handle.lock().take() {
            let _ = self.sender.send(HardwareCommand::Shutdown);
            if handle.join().is_err() {
                error!("MIDI output thread panicked");
            }
        }
    }
}

impl MidiSink for HardwareOutput {
    fn put_event(&self, event: MidiEvent) {
        match self.sender.try_send(HardwareCommand::Event(event)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("MIDI hardware queue full, dropping event");
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                error!("MIDI output thread not running");
            }
        }
    }
}

impl Drop for HardwareOutput {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(feature = "midi-io")]
pub use self::midir_writer::{list_output_devices, MidirWriter};

#[cfg(feature = "midi-io")]
mod midir_writer {
    use super::MidiWriter;
    use crate::error::{Error, Result};
    use midir::{MidiOutput, MidiOutputConnection};

    /// Open connection to a system MIDI output port.
    pub struct MidirWriter {
        connection: MidiOutputConnection,
        name: String,
    }

    impl MidirWriter {
        /// Connect to the first device whose name contains `name`
        /// (case-insensitive).
        pub fn connect_by_name(name: &str) -> Result<Self> {
            let midi_output = MidiOutput::new("segue-midi-output")?;
            let wanted = name.to_lowercase();
            let port = midi_output
                .ports()
                .into_iter()
                .find(|p| {
                    midi_output
                        .port_name(p)
                        .map(|n| n.to_lowercase().contains(&wanted))
                        .unwrap_or(false)
                })
                .ok_or_else(|| {
                    Error::MidiDevice(format!("No MIDI output device found matching '{}'", name))
                })?;
            let port_name = midi_output
                .port_name(&port)
                .unwrap_or_else(|_| name.to_string());
            let connection = midi_output.connect(&port, "segue-output")?;
            Ok(Self {
                connection,
                name: port_name,
            })
        }

        pub fn name(&self) -> &str {
            &self.name
        }
    }

    impl MidiWriter for MidirWriter {
        fn write(&mut self, bytes: &[u8]) -> Result<()> {
            self.connection.send(bytes)?;
            Ok(())
        }
    }

    pub fn list_output_devices() -> Vec<String> {
        let Ok(midi_output) = MidiOutput::new("segue-device-list") else {
            return Vec::new();
        };
        midi_output
            .ports()
            .iter()
            .enumerate()
            .map(|(index, port)| {
                midi_output
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index))
            })
            .collect()
    }
}

#[cfg(feature = "midi-io")]
impl HardwareOutput {
    /// Open a system MIDI output by name on the output thread.
    pub fn connect(device_name: &str, capacity: usize) -> Result<Self> {
        let name = device_name.to_string();
        Self::spawn_with(capacity, move || MidirWriter::connect_by_name(&name))
    }
}
