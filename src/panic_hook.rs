use std::{any::Any, panic, sync::Arc, time::Duration};

use crate::{
    client::Client,
    payload::{Event, Exception, Severity, StackFrame},
};

/// Reports unhandled panics through the given client.
///
/// The hook only reports when the client's `auto_notify` flag is set and
/// its release stage passes [`Config::should_notify`](crate::Config::should_notify).
/// The previously installed hook still runs afterwards. Install at most
/// once per process.
pub fn install_panic_hook(client: Arc<Client>) {
    let previous = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let config = client.config();

        if config.auto_notify && config.should_notify() {
            let mut exception = Exception::new("panic", panic_message(info.payload()));

            let context = match info.location() {
                Some(location) => {
                    exception.stacktrace.push(StackFrame {
                        file: location.file().to_owned(),
                        line_number: location.line() as i32,
                        column_number: location.column() as i32,
                        method: "panic".to_owned(),
                        in_project: true,
                    });

                    Some(format!("{}:{}", location.file(), location.line()))
                }
                None => {
                    exception.stacktrace.push(StackFrame::placeholder());
                    None
                }
            };

            let mut event = Event::new();
            event.exceptions.push(exception);
            event.severity = Some(Severity::Error);
            event.context = context;

            if !config.user.is_empty() {
                event.user = Some(config.user.clone());
            }
            if !config.app.is_empty() {
                event.app = Some(config.app.clone());
            }
            if !config.device.is_empty() {
                event.device = Some(config.device.clone());
            }

            client.notify_event(event);

            // The process is usually about to die; give the report a
            // short window to leave.
            client.flush(Duration::from_secs(2));
        }

        previous(info);
    }));
}

/// Renders the panic payload the way the panic machinery itself would.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
