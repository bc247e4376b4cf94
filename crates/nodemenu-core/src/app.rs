//! The application loop: [`Model`], [`Driver`], [`Effect`], [`App`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::messages::Msg;
use crate::scene::Scene;

// ---------------------------------------------------------------------------
// Context (cancellation token)
// ---------------------------------------------------------------------------

/// A simple cooperative-cancellation token backed by an [`AtomicBool`].
#[derive(Clone, Debug)]
pub struct Context {
    done: Arc<AtomicBool>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn cancel(&self) {
        self.done.store(true, Ordering::Relaxed);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

/// A side-effect returned by [`Model::update`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Signal the application loop to stop.
    End,
}

// ---------------------------------------------------------------------------
// Model / Driver
// ---------------------------------------------------------------------------

/// The application model.
pub trait Model {
    /// Process a message, optionally returning a side-effect.
    fn update(&mut self, msg: Msg) -> Option<Effect>;

    /// Paint the current state into `scene` (already cleared).
    fn draw(&self, scene: &mut Scene);
}

/// Back-end driver (e.g. a terminal).
pub trait Driver {
    fn init(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Poll for input messages, sending them through `tx`.
    /// Implementations should return promptly once `ctx.is_done()`.
    fn poll_msgs(
        &mut self,
        ctx: &Context,
        tx: Sender<Msg>,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Show a full frame.
    fn flush(&mut self, scene: &Scene) -> Result<(), Box<dyn std::error::Error>>;

    /// Clean up / restore the terminal.
    fn close(&mut self);
}

// ---------------------------------------------------------------------------
// AppConfig / App
// ---------------------------------------------------------------------------

/// Configuration for creating an [`App`].
pub struct AppConfig<M: Model, D: Driver> {
    pub model: M,
    pub driver: D,
    pub width: i32,
    pub height: i32,
}

/// The main application runner.
pub struct App<M: Model, D: Driver> {
    model: M,
    driver: D,
    scene: Scene,
}

impl<M: Model, D: Driver> App<M, D> {
    pub fn new(config: AppConfig<M, D>) -> Self {
        Self {
            model: config.model,
            driver: config.driver,
            scene: Scene::new(config.width, config.height),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run the loop: poll → update → draw → flush, until the model returns
    /// [`Effect::End`] or polling fails. The driver is closed on every exit
    /// path.
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.driver.init()?;

        let ctx = Context::new();
        let (tx, rx): (Sender<Msg>, Receiver<Msg>) = mpsc::channel();
        tx.send(Msg::Init).ok();

        let result = self.run_loop(&ctx, &tx, &rx);
        if let Err(e) = &result {
            log::error!("app loop stopped: {e}");
        }
        self.driver.close();
        result
    }

    fn run_loop(
        &mut self,
        ctx: &Context,
        tx: &Sender<Msg>,
        rx: &Receiver<Msg>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.process_pending(rx, ctx)?;
        while !ctx.is_done() {
            if let Err(e) = self.driver.poll_msgs(ctx, tx.clone()) {
                ctx.cancel();
                return Err(e);
            }
            if ctx.is_done() {
                break;
            }
            self.process_pending(rx, ctx)?;
        }
        Ok(())
    }

    /// Drain queued messages, update the model, then draw and flush once.
    fn process_pending(
        &mut self,
        rx: &Receiver<Msg>,
        ctx: &Context,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut needs_draw = false;
        while let Ok(msg) = rx.try_recv() {
            if let Msg::Screen { width, height, .. } = msg {
                log::debug!("screen resized to {width}x{height}");
                self.scene.resize(width, height);
            }
            if let Some(Effect::End) = self.model.update(msg) {
                ctx.cancel();
                return Ok(());
            }
            needs_draw = true;
        }

        if needs_draw {
            self.scene.clear();
            self.model.draw(&mut self.scene);
            self.driver.flush(&self.scene)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::messages::Key;
    use crate::scene::Tone;

    struct Counter {
        keys: usize,
    }

    impl Model for Counter {
        fn update(&mut self, msg: Msg) -> Option<Effect> {
            match msg {
                Msg::KeyDown { key: Key::Char('q'), .. } => Some(Effect::End),
                Msg::KeyDown { .. } => {
                    self.keys += 1;
                    None
                }
                _ => None,
            }
        }

        fn draw(&self, scene: &mut Scene) {
            scene.print(Point::ZERO, &self.keys.to_string(), Tone::Normal);
        }
    }

    /// Replays a fixed script, one batch per poll.
    struct Scripted {
        batches: Vec<Vec<Msg>>,
        frames: Vec<String>,
        closed: bool,
    }

    impl Driver for Scripted {
        fn init(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }

        fn poll_msgs(
            &mut self,
            _ctx: &Context,
            tx: Sender<Msg>,
        ) -> Result<(), Box<dyn std::error::Error>> {
            if self.batches.is_empty() {
                return Err("script exhausted".into());
            }
            for msg in self.batches.remove(0) {
                tx.send(msg).ok();
            }
            Ok(())
        }

        fn flush(&mut self, scene: &Scene) -> Result<(), Box<dyn std::error::Error>> {
            let text = scene.runs().iter().map(|r| r.text.as_str()).collect();
            self.frames.push(text);
            Ok(())
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn runs_until_end_effect() {
        let driver = Scripted {
            batches: vec![
                vec![Msg::key(Key::Char('a')), Msg::key(Key::Char('b'))],
                vec![Msg::key(Key::Char('q'))],
            ],
            frames: Vec::new(),
            closed: false,
        };
        let mut app = App::new(AppConfig {
            model: Counter { keys: 0 },
            driver,
            width: 10,
            height: 1,
        });
        app.run().unwrap();
        assert_eq!(app.model().keys, 2);
        assert_eq!(app.driver.frames, vec!["0".to_string(), "2".to_string()]);
        assert!(app.driver.closed);
    }

    #[test]
    fn driver_error_closes_and_propagates() {
        let driver = Scripted {
            batches: Vec::new(),
            frames: Vec::new(),
            closed: false,
        };
        let mut app = App::new(AppConfig {
            model: Counter { keys: 0 },
            driver,
            width: 10,
            height: 1,
        });
        assert!(app.run().is_err());
        assert!(app.driver.closed);
    }
}
