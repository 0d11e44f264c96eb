//! Application run loop
//!
//! [`Runner`] owns the terminal, the previous frame's grid, the effects
//! timeline and the input listener. Each frame it drains input, advances the
//! timeline, asks the application for a fresh widget tree, paints it, diffs
//! against the previous frame and writes the difference.
//!
//! ```text
//!  Idle ──start──▶ Running ──suspend──▶ Suspended
//!                    │  ▲                   │
//!                    │  └──────resume───────┘
//!                    ▼
//!               Terminated  (quit, terminate, or terminal error)
//! ```

use std::io;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::config::Config;
use crate::core::{Grid, Rect, Region, Size};
use crate::diff::diff;
use crate::effects::{Animation, AnimationId, AnimationTarget, Overlay, Timeline};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::input::{EventSource, InputListener};
use crate::terminal::Terminal;
use crate::widget::Widget;

/// Lifecycle of a [`Runner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopState {
    Idle,
    Running,
    Suspended,
    Terminated,
}

/// What the application wants after handling an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Flow {
    #[default]
    Continue,
    Quit,
    Suspend,
}

/// An application driven by [`Runner`]
pub trait Application {
    /// Build the widget tree for the next frame
    fn view(&self) -> Box<dyn Widget + '_>;

    /// The properties animations write into
    fn animated(&mut self) -> &mut dyn AnimationTarget;

    fn on_event(&mut self, event: &Event, ctx: &mut Context<'_>) -> Flow {
        let _ = (event, ctx);
        Flow::Continue
    }

    /// Effects applied after painting, in order
    fn overlays(&self, area: Rect) -> Vec<Overlay> {
        let _ = area;
        Vec::new()
    }

    /// Called once the terminal is back in cooperative mode
    fn on_suspend(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run loop services available while handling an event
pub struct Context<'a> {
    timeline: &'a mut Timeline,
    size: Size,
    frame: u64,
}

impl Context<'_> {
    pub fn animate(&mut self, animation: Animation) -> AnimationId {
        self.timeline.register(animation)
    }

    pub fn cancel(&mut self, id: AnimationId) -> bool {
        self.timeline.cancel(id)
    }

    /// Size of the frame being built
    pub fn size(&self) -> Size {
        self.size
    }

    /// Number of frames rendered so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Drives an [`Application`] on a [`Terminal`]
pub struct Runner<T: Terminal> {
    terminal: T,
    config: Config,
    state: LoopState,
    raw: bool,
    size: Size,
    previous: Grid,
    timeline: Timeline,
    frame_count: u64,
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    source: Option<Box<dyn EventSource>>,
    listener: Option<InputListener>,
    last_tick: Instant,
    deadline: Instant,
}

impl<T: Terminal> Runner<T> {
    /// Create an idle runner. Invalid configuration is rejected here, before
    /// the terminal is touched.
    pub fn new(terminal: T, config: Config) -> Result<Self> {
        config.validate()?;
        let (sender, receiver) = bounded(config.event_queue_capacity);
        let now = Instant::now();
        Ok(Self {
            terminal,
            config,
            state: LoopState::Idle,
            raw: false,
            size: Size::default(),
            previous: Grid::new(Size::default()),
            timeline: Timeline::new(),
            frame_count: 0,
            sender,
            receiver,
            source: None,
            listener: None,
            last_tick: now,
            deadline: now,
        })
    }

    /// Read input from `source` on a listener thread while running
    pub fn with_input(mut self, source: impl EventSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Handle for injecting events into the queue
    pub fn event_sender(&self) -> Sender<Event> {
        self.sender.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Acquire the terminal and start the input listener
    pub fn start(&mut self) -> Result<()> {
        self.expect_state("start", LoopState::Idle)?;
        self.acquire()?;
        info!(size = %self.size, "run loop started");
        Ok(())
    }

    /// Release the input listener and the terminal, then call the
    /// application's suspend hook
    pub fn suspend<A: Application>(&mut self, app: &mut A) -> Result<()> {
        self.expect_state("suspend", LoopState::Running)?;
        self.stop_listener();
        if let Err(e) = self.terminal.leave_raw_mode() {
            return Err(self.fail(Error::LeaveRawMode(e)));
        }
        self.raw = false;
        self.state = LoopState::Suspended;
        info!("run loop suspended");

        app.on_suspend().map_err(Error::Suspend)
    }

    /// Reacquire the terminal; the next frame is a full redraw
    pub fn resume(&mut self) -> Result<()> {
        self.expect_state("resume", LoopState::Suspended)?;
        self.acquire()?;
        info!(size = %self.size, "run loop resumed");
        Ok(())
    }

    /// Stop the listener and restore cooperative mode. Does nothing when
    /// already terminated.
    pub fn terminate(&mut self) -> Result<()> {
        if self.state == LoopState::Terminated {
            return Ok(());
        }
        self.state = LoopState::Terminated;
        self.stop_listener();
        if self.raw {
            self.raw = false;
            self.terminal.leave_raw_mode().map_err(Error::LeaveRawMode)?;
        }
        info!(frames = self.frame_count, "run loop terminated");
        Ok(())
    }

    /// Render frames until the application quits or suspends.
    ///
    /// Starts an idle runner and resumes a suspended one first.
    pub fn run<A: Application>(&mut self, app: &mut A) -> Result<Flow> {
        match self.state {
            LoopState::Idle => self.start()?,
            LoopState::Suspended => self.resume()?,
            _ => {},
        }
        loop {
            match self.frame(app)? {
                Flow::Continue => {},
                flow => return Ok(flow),
            }
        }
    }

    /// Run one frame: wait for input up to the remaining frame budget,
    /// dispatch it, then render.
    ///
    /// Returns [`Flow::Quit`] once terminated and [`Flow::Suspend`] once
    /// suspended. Events drained in the same frame after the one that
    /// stopped the loop are dropped.
    pub fn frame<A: Application>(&mut self, app: &mut A) -> Result<Flow> {
        self.expect_state("render a frame", LoopState::Running)?;

        let events = self.collect_events();
        if let Some(e) = self.listener.as_ref().and_then(InputListener::take_error) {
            return Err(self.fail(Error::Input(e)));
        }

        for event in events {
            if let Event::Resize { width, height } = event {
                self.resize(Size::new(width, height))?;
            }

            let mut ctx = Context {
                timeline: &mut self.timeline,
                size: self.size,
                frame: self.frame_count,
            };
            match app.on_event(&event, &mut ctx) {
                Flow::Continue => {},
                Flow::Quit => {
                    self.terminate()?;
                    return Ok(Flow::Quit);
                },
                Flow::Suspend => {
                    self.suspend(app)?;
                    return Ok(Flow::Suspend);
                },
            }
        }

        self.render(app)?;
        Ok(Flow::Continue)
    }

    /// Block until the frame deadline or the first event, then drain the
    /// queue
    fn collect_events(&mut self) -> Vec<Event> {
        let budget = self.deadline.saturating_duration_since(Instant::now());
        let mut events = Vec::new();
        match self.receiver.recv_timeout(budget) {
            Ok(event) => events.push(event),
            Err(RecvTimeoutError::Timeout) => return events,
            // The runner holds a sender, so this never happens
            Err(RecvTimeoutError::Disconnected) => return events,
        }
        events.extend(self.receiver.try_iter());
        events
    }

    fn render<A: Application>(&mut self, app: &mut A) -> Result<()> {
        let started = Instant::now();
        let elapsed = started.duration_since(self.last_tick);
        self.last_tick = started;
        // Overrun frames start the next one right away
        self.deadline = started
            .checked_add(self.config.frame_interval())
            .unwrap_or(started);

        let changed = self.timeline.tick(elapsed, app.animated());

        let mut next = Grid::new(self.size).with_generation(self.previous.generation() + 1);
        let area = next.area();
        {
            let view = app.view();
            let mut region = Region::new(&mut next, area);
            view.paint(area, &mut region);
        }
        for overlay in app.overlays(area) {
            overlay.apply(&mut next);
        }

        let commands = match diff(&self.previous, &next) {
            Ok(commands) => commands,
            Err(e) => return Err(self.fail(e)),
        };

        if !commands.is_empty() {
            if let Err(e) = self.terminal.write(&commands) {
                return Err(self.fail(Error::Write(e)));
            }
            if let Err(e) = self.terminal.flush() {
                warn!("flush failed, retrying: {}", e);
                if let Err(e) = self.terminal.flush() {
                    return Err(self.fail(Error::Flush(e)));
                }
            }
        }

        self.previous = next;
        self.frame_count += 1;
        debug!(
            frame = self.frame_count,
            commands = commands.len(),
            animated = changed.len(),
            active = self.timeline.len(),
            elapsed_us = elapsed.as_micros() as u64,
            render_us = started.elapsed().as_micros() as u64,
            "frame rendered"
        );
        Ok(())
    }

    /// Reset the previous frame so the next one is drawn in full
    fn resize(&mut self, size: Size) -> Result<()> {
        debug!(from = %self.size, to = %size, "resize");
        self.size = size;
        self.previous = Grid::new(size).with_generation(self.previous.generation());
        if let Err(e) = self.terminal.clear() {
            return Err(self.fail(Error::Clear(e)));
        }
        Ok(())
    }

    /// Enter raw mode, read the size, clear the display and start the
    /// listener
    fn acquire(&mut self) -> Result<()> {
        if let Err(e) = self.terminal.enter_raw_mode() {
            return Err(self.fail(Error::EnterRawMode(e)));
        }
        self.raw = true;

        let size = match self.terminal.query_size() {
            Ok(size) => size,
            Err(e) => return Err(self.fail(Error::QuerySize(e))),
        };
        self.resize(size)?;

        if let Some(source) = self.source.take() {
            match InputListener::spawn(source, self.sender.clone(), self.config.poll_interval()) {
                Ok(listener) => self.listener = Some(listener),
                Err(e) => return Err(self.fail(Error::SpawnListener(e))),
            }
        }

        let now = Instant::now();
        self.last_tick = now;
        self.deadline = now;
        self.state = LoopState::Running;
        Ok(())
    }

    fn stop_listener(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.source = listener.stop();
        }
    }

    /// Terminate after an unrecoverable error and hand the error back
    fn fail(&mut self, err: Error) -> Error {
        error!("run loop failed: {}", err);
        if let Err(e) = self.terminate() {
            warn!("cleanup after failure also failed: {}", e);
        }
        err
    }

    fn expect_state(&self, action: &'static str, expected: LoopState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                action,
                state: self.state,
            })
        }
    }

    /// Time left until the next frame is due
    pub fn remaining_budget(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

impl<T: Terminal> Drop for Runner<T> {
    fn drop(&mut self) {
        self.stop_listener();
        if self.raw {
            self.raw = false;
            if let Err(e) = self.terminal.leave_raw_mode() {
                warn!("failed to restore terminal on drop: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Style;
    use crate::effects::{AnimValue, PropertyStore, TargetRef};
    use crate::event::{KeyCode, KeyEvent};
    use crate::headless::HeadlessTerminal;
    use crate::input::EventSource;
    use crate::widget::Text;
    use std::thread;

    struct BrokenInput;

    impl EventSource for BrokenInput {
        fn poll_event(&mut self, _timeout: Duration) -> io::Result<Option<Event>> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"))
        }
    }

    struct Label {
        text: String,
        props: PropertyStore,
    }

    impl Label {
        fn new(text: &str) -> Self {
            let mut props = PropertyStore::new();
            props.declare("x", AnimValue::Scalar(0.0));
            Self {
                text: text.to_string(),
                props,
            }
        }
    }

    impl Application for Label {
        fn view(&self) -> Box<dyn Widget + '_> {
            Box::new(Text::new(self.text.as_str()).style(Style::new().bold()))
        }

        fn animated(&mut self) -> &mut dyn AnimationTarget {
            &mut self.props
        }

        fn on_event(&mut self, event: &Event, ctx: &mut Context<'_>) -> Flow {
            match event.as_key().map(|k| k.code) {
                Some(KeyCode::Char('q')) => Flow::Quit,
                Some(KeyCode::Char('z')) => Flow::Suspend,
                Some(KeyCode::Char('a')) => {
                    ctx.animate(Animation::scalar("x", 0.0, 1.0, Duration::ZERO));
                    Flow::Continue
                },
                _ => Flow::Continue,
            }
        }
    }

    fn config() -> Config {
        Config {
            frame_interval_ms: 1,
            ..Config::default()
        }
    }

    fn runner(width: u16, height: u16) -> Runner<HeadlessTerminal> {
        Runner::new(HeadlessTerminal::new(Size::new(width, height)), config()).unwrap()
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::plain(KeyCode::Char(c)))
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = Config {
            event_queue_capacity: 0,
            ..Config::default()
        };
        let err = Runner::new(HeadlessTerminal::new(Size::new(1, 1)), config).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_frame_requires_running() {
        let mut runner = runner(4, 1);
        let mut app = Label::new("hi");
        assert!(matches!(
            runner.frame(&mut app),
            Err(Error::InvalidState {
                state: LoopState::Idle,
                ..
            })
        ));
    }

    #[test]
    fn test_first_frame_draws() {
        let mut runner = runner(4, 1);
        let mut app = Label::new("hi");
        runner.start().unwrap();
        assert!(runner.terminal().is_raw());
        assert_eq!(runner.frame(&mut app).unwrap(), Flow::Continue);
        assert_eq!(runner.terminal().screen().row_text(0), "hi  ");
        assert_eq!(runner.frame_count(), 1);

        // Unchanged frames write nothing
        runner.frame(&mut app).unwrap();
        assert_eq!(runner.terminal().frames().len(), 1);
    }

    #[test]
    fn test_quit_terminates() {
        let mut runner = runner(4, 1);
        let mut app = Label::new("hi");
        runner.event_sender().send(key('q')).unwrap();
        assert_eq!(runner.run(&mut app).unwrap(), Flow::Quit);
        assert_eq!(runner.state(), LoopState::Terminated);
        assert!(!runner.terminal().is_raw());
        assert!(runner.terminate().is_ok());
    }

    #[test]
    fn test_context_animate() {
        let mut runner = runner(4, 1);
        let mut app = Label::new("hi");
        runner.start().unwrap();
        runner.event_sender().send(key('a')).unwrap();
        runner.frame(&mut app).unwrap();
        assert_eq!(app.props.scalar(&TargetRef::new("x")), Some(1.0));
        assert!(runner.timeline().is_empty());
    }

    #[test]
    fn test_write_failure_terminates() {
        let mut runner = runner(4, 1);
        let mut app = Label::new("hi");
        runner.start().unwrap();
        runner.terminal_mut().fail_writes(true);
        assert!(matches!(runner.frame(&mut app), Err(Error::Write(_))));
        assert_eq!(runner.state(), LoopState::Terminated);
        assert!(!runner.terminal().is_raw());
    }

    #[test]
    fn test_suspend_resume() {
        let mut runner = runner(4, 1);
        let mut app = Label::new("hi");
        runner.start().unwrap();
        runner.frame(&mut app).unwrap();

        runner.event_sender().send(key('z')).unwrap();
        assert_eq!(runner.frame(&mut app).unwrap(), Flow::Suspend);
        assert_eq!(runner.state(), LoopState::Suspended);
        assert!(!runner.terminal().is_raw());
        assert!(runner.frame(&mut app).is_err());

        runner.resume().unwrap();
        assert!(runner.terminal().is_raw());
        runner.frame(&mut app).unwrap();
        assert_eq!(runner.terminal().screen().row_text(0), "hi  ");
        assert_eq!(runner.terminal().clears(), 2);
    }

    #[test]
    fn test_input_failure_terminates() {
        let mut runner = runner(4, 1).with_input(BrokenInput);
        let mut app = Label::new("hi");
        runner.start().unwrap();
        thread::sleep(Duration::from_millis(50));

        let err = runner.frame(&mut app).unwrap_err();
        assert!(matches!(err, Error::Input(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
        assert_eq!(runner.state(), LoopState::Terminated);
        assert!(!runner.terminal().is_raw());
        assert!(runner.frame(&mut app).is_err());
    }

    #[test]
    fn test_new_rejects_unbounded_frame_interval() {
        let config = Config {
            frame_interval_ms: u64::MAX,
            ..Config::default()
        };
        assert!(Runner::new(HeadlessTerminal::new(Size::new(2, 1)), config).is_err());
    }

    #[test]
    fn test_drop_restores_cooperative_mode() {
        let mut terminal = HeadlessTerminal::new(Size::new(2, 1));
        {
            let mut runner = Runner::new(&mut terminal, config()).unwrap();
            runner.start().unwrap();
        }
        assert!(!terminal.is_raw());
    }
}
