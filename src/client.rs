use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    error::Error,
    payload::{Event, Exception, MetaData, Notifier, Payload, Severity, StackFrame},
    transport::{DefaultTransportFactory, Report, Transport, TransportFactory},
};

/// Entry point for reporting: owns the configuration and the transport
/// worker that delivers payloads to the notify endpoint.
pub struct Client {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Creates a client delivering over HTTP(S).
    pub fn new(config: Config) -> Result<Self, Error> {
        Self::with_transport_factory(config, &DefaultTransportFactory)
    }

    /// Creates a client with a custom transport, e.g. a recording one in
    /// tests.
    pub fn with_transport_factory(
        config: Config,
        factory: &dyn TransportFactory,
    ) -> Result<Self, Error> {
        let transport = factory.create_transport(&config)?;

        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reports one error occurrence.
    ///
    /// Builds a payload with a single event carrying one exception, the
    /// configured user/app/device defaults and the given metadata, then
    /// hands it to the transport and returns. The `true` return value
    /// means the report was dispatched, never that it was delivered.
    pub fn notify(
        &self,
        error_class: &str,
        message: &str,
        context: &str,
        metadata: Option<MetaData>,
    ) -> bool {
        tracing::debug!(context, "notify: {}", message);

        let mut exception = Exception::new(error_class, message);

        // The notify endpoint rejects reports without a stack trace, so
        // send the fixed frame to get the report accepted.
        exception.stacktrace.push(StackFrame::placeholder());

        let mut event = Event::new();
        event.exceptions.push(exception);
        event.severity = Some(Severity::default());

        if !context.is_empty() {
            event.context = Some(context.to_owned());
        }
        if !self.config.user.is_empty() {
            event.user = Some(self.config.user.clone());
        }
        if !self.config.app.is_empty() {
            event.app = Some(self.config.app.clone());
        }
        if !self.config.device.is_empty() {
            event.device = Some(self.config.device.clone());
        }
        event.meta_data = metadata.filter(|meta| !meta.is_empty());

        self.notify_event(event)
    }

    /// Dispatches an already-built event, for callers that assemble their
    /// own (the panic hook does). Fire and forget, like [`notify`][Self::notify].
    pub fn notify_event(&self, event: Event) -> bool {
        let payload = Payload {
            api_key: self.config.api_key.clone(),
            notifier: Notifier::default(),
            events: vec![event],
        };

        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize report payload");
                return true;
            }
        };

        tracing::trace!(payload = %String::from_utf8_lossy(&body), "dispatching report");

        self.transport.send_report(Report {
            url: self.config.endpoint_url(),
            body,
        });

        true
    }

    /// Waits for in-flight reports to finish delivering.
    pub fn flush(&self, timeout: Duration) -> bool {
        self.transport.flush(timeout)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        // Give queued reports a brief window to leave before the worker
        // is torn down.
        self.transport.shutdown(Duration::from_secs(2));
    }
}
