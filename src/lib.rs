//! Client-side error reporting to [Bugsnag](https://www.bugsnag.com).
//!
//! Builds error payloads in the Bugsnag payload v2 wire format and
//! delivers them with a fire-and-forget HTTP POST from a background
//! worker, so reporting never blocks the calling thread.
//!
//! ```no_run
//! # fn main() -> Result<(), bugsnag_notify::Error> {
//! use bugsnag_notify::{Client, Config};
//!
//! let client = Client::new(Config::new("0123456789abcdef0123456789abcdef"))?;
//! client.notify("RuntimeError", "disk full", "saveFile", None);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod panic_hook;
mod payload;
mod transport;

pub use client::Client;
pub use config::{Config, NOTIFY_HOST};
pub use error::Error;
pub use panic_hook::install_panic_hook;
pub use payload::{
    App, Device, Event, Exception, MetaData, Notifier, Payload, Severity, StackFrame, User,
    PAYLOAD_VERSION,
};
pub use transport::{DefaultTransportFactory, HttpTransport, Report, Transport, TransportFactory};
