use crate::{config::Config, error::Error};
use parking_lot::{Condvar, Mutex};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// One queued delivery: the target URL and the serialized payload body.
#[derive(Debug, Clone)]
pub struct Report {
    pub url: String,
    pub body: Vec<u8>,
}

/// Delivers serialized reports without blocking the notifying thread.
pub trait Transport: Send + Sync {
    /// Enqueues one report, best effort. Implementations must not block
    /// the caller on network I/O.
    fn send_report(&self, report: Report);

    /// Waits until in-flight reports have completed or the timeout
    /// elapses. Returns `true` if everything drained.
    fn flush(&self, timeout: Duration) -> bool;

    /// Stops accepting reports, drains what is already queued and lets
    /// the worker exit.
    fn shutdown(&self, timeout: Duration) -> bool;
}

/// Creates the transport a [`Client`](crate::Client) delivers through,
/// letting tests substitute a recording implementation.
pub trait TransportFactory: Send + Sync {
    fn create_transport(&self, config: &Config) -> Result<Arc<dyn Transport>, Error>;
}

/// Factory for the production [`HttpTransport`].
#[derive(Default)]
pub struct DefaultTransportFactory;

impl TransportFactory for DefaultTransportFactory {
    fn create_transport(&self, config: &Config) -> Result<Arc<dyn Transport>, Error> {
        Ok(Arc::new(HttpTransport::new(config)?))
    }
}

/// Fire-and-forget HTTP delivery: a bounded queue feeding one worker
/// thread that POSTs each report and logs the outcome. Failed sends are
/// logged and dropped, never retried or requeued.
pub struct HttpTransport {
    in_flight: Arc<Mutex<usize>>,
    drained: Arc<Condvar>,
    sender: crossbeam::channel::Sender<Option<Report>>,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let url = config.endpoint_url();
        if reqwest::Url::parse(&url).is_err() {
            return Err(Error::InvalidEndpoint(url));
        }

        // No timeout is configured; the stack default applies.
        let http = reqwest::blocking::Client::builder().build()?;

        let in_flight = Arc::new(Mutex::new(0usize));
        let drained = Arc::new(Condvar::new());
        let (sender, receiver) = crossbeam::channel::bounded::<Option<Report>>(30);

        let pending = in_flight.clone();
        let signal = drained.clone();

        std::thread::Builder::new()
            .name("bugsnag-transport".to_owned())
            .spawn(move || {
                // `None` is the shutdown sentinel; it queues behind any
                // outstanding reports, so those still drain first.
                while let Ok(Some(report)) = receiver.recv() {
                    deliver(&http, report);

                    let mut count = pending.lock();
                    *count -= 1;
                    if *count == 0 {
                        signal.notify_all();
                    }
                }
            })?;

        Ok(Self {
            in_flight,
            drained,
            sender,
        })
    }

    fn finish_one(&self) {
        let mut count = self.in_flight.lock();
        *count -= 1;
        if *count == 0 {
            self.drained.notify_all();
        }
    }
}

impl Transport for HttpTransport {
    fn send_report(&self, report: Report) {
        *self.in_flight.lock() += 1;

        if let Err(err) = self.sender.try_send(Some(report)) {
            // Queue full or worker gone; reports are best effort.
            tracing::warn!(error = %err, "dropping report, transport queue unavailable");
            self.finish_one();
        }
    }

    fn flush(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.in_flight.lock();

        while *count > 0 {
            if self.drained.wait_until(&mut count, deadline).timed_out() {
                break;
            }
        }

        *count == 0
    }

    fn shutdown(&self, timeout: Duration) -> bool {
        if self.sender.send_timeout(None, timeout).is_err() {
            return false;
        }

        self.flush(timeout)
    }
}

fn deliver(http: &reqwest::blocking::Client, report: Report) {
    let response = http
        .post(&report.url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(report.body)
        .send();

    match response {
        Err(err) => {
            tracing::warn!(error = %err, "report delivery failed");
        }
        Ok(response) => {
            let status = response.status();
            let body = response.text().unwrap_or_default();

            if status.is_success() {
                tracing::debug!(status = %status, body = %body, "report delivered");
            } else {
                tracing::warn!(status = %status, body = %body, "report rejected");
            }
        }
    }
}
