//! Input listener
//!
//! A background thread polls an [`EventSource`] with a short timeout and
//! pushes events into a bounded channel. The run loop is the only consumer.
//! A source error stops the thread and is kept for the run loop to collect
//! with [`InputListener::take_error`].
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ EventSource  │ ──▶ │   Listener   │ ──▶ │   Channel    │ ──▶ Runner
//! │  (terminal)  │     │   (thread)   │     │  (bounded)   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use tracing::{debug, warn};

use crate::event::Event;

/// Blocking producer of terminal events
pub trait EventSource: Send {
    /// Wait up to `timeout` for the next event
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        (**self).poll_event(timeout)
    }
}

/// Handle to a running listener thread
pub struct InputListener {
    running: Arc<AtomicBool>,
    failure: Arc<Mutex<Option<io::Error>>>,
    handle: Option<JoinHandle<Box<dyn EventSource>>>,
}

impl InputListener {
    /// Start polling `source` on a new thread.
    ///
    /// The thread checks the stop flag at least every `poll_interval`. When
    /// the queue is full it keeps retrying, so no event is dropped.
    pub fn spawn(
        source: Box<dyn EventSource>,
        sender: Sender<Event>,
        poll_interval: Duration,
    ) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let failure = Arc::new(Mutex::new(None));
        let flag = Arc::clone(&running);
        let slot = Arc::clone(&failure);
        let handle = thread::Builder::new()
            .name("tamboui-input".to_string())
            .spawn(move || listen(source, sender, flag, slot, poll_interval))?;

        debug!("input listener started");
        Ok(Self {
            running,
            failure,
            handle: Some(handle),
        })
    }

    /// Whether the thread is still polling
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// The error that stopped the thread, if any. Returned once.
    pub fn take_error(&self) -> Option<io::Error> {
        match self.failure.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    /// Stop the thread and hand the source back.
    ///
    /// Returns `None` if the thread panicked and took the source with it.
    pub fn stop(mut self) -> Option<Box<dyn EventSource>> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<Box<dyn EventSource>> {
        self.running.store(false, Ordering::SeqCst);
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(source) => {
                debug!("input listener stopped");
                Some(source)
            },
            Err(_) => {
                warn!("input listener panicked");
                None
            },
        }
    }
}

impl Drop for InputListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn listen(
    mut source: Box<dyn EventSource>,
    sender: Sender<Event>,
    running: Arc<AtomicBool>,
    failure: Arc<Mutex<Option<io::Error>>>,
    poll_interval: Duration,
) -> Box<dyn EventSource> {
    while running.load(Ordering::Relaxed) {
        let mut event = match source.poll_event(poll_interval) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                warn!("input source failed: {}", e);
                match failure.lock() {
                    Ok(mut slot) => *slot = Some(e),
                    Err(poisoned) => *poisoned.into_inner() = Some(e),
                }
                break;
            },
        };

        loop {
            match sender.send_timeout(event, poll_interval) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(pending)) => {
                    if !running.load(Ordering::Relaxed) {
                        return source;
                    }
                    event = pending;
                },
                Err(SendTimeoutError::Disconnected(_)) => {
                    running.store(false, Ordering::SeqCst);
                    return source;
                },
            }
        }
    }
    running.store(false, Ordering::SeqCst);
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyCode, KeyEvent};
    use crossbeam_channel::bounded;
    use std::collections::VecDeque;

    struct Queue(VecDeque<Event>);

    impl EventSource for Queue {
        fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
            match self.0.pop_front() {
                Some(event) => Ok(Some(event)),
                None => {
                    thread::sleep(timeout);
                    Ok(None)
                },
            }
        }
    }

    struct Broken;

    impl EventSource for Broken {
        fn poll_event(&mut self, _timeout: Duration) -> io::Result<Option<Event>> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::plain(KeyCode::Char(c)))
    }

    #[test]
    fn test_events_arrive_in_order() {
        let (tx, rx) = bounded(8);
        let source = Queue(VecDeque::from(vec![key('a'), key('b'), key('c')]));
        let listener = InputListener::spawn(Box::new(source), tx, Duration::from_millis(1)).unwrap();

        let received: Vec<Event> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap())
            .collect();
        assert_eq!(received, vec![key('a'), key('b'), key('c')]);
        assert!(listener.take_error().is_none());
        assert!(listener.stop().is_some());
    }

    #[test]
    fn test_full_queue_keeps_events() {
        let (tx, rx) = bounded(1);
        let source = Queue(VecDeque::from(vec![key('a'), key('b'), key('c')]));
        let listener = InputListener::spawn(Box::new(source), tx, Duration::from_millis(1)).unwrap();

        thread::sleep(Duration::from_millis(20));
        let received: Vec<Event> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap())
            .collect();
        assert_eq!(received, vec![key('a'), key('b'), key('c')]);
        drop(listener);
    }

    #[test]
    fn test_source_error_stops_listener() {
        let (tx, _rx) = bounded(1);
        let listener = InputListener::spawn(Box::new(Broken), tx, Duration::from_millis(1)).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(!listener.is_running());

        let err = listener.take_error().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(listener.take_error().is_none());
        assert!(listener.stop().is_some());
    }
}
