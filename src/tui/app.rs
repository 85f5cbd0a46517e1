//! Terminal setup and the event loop.
//!
//! The loop runs on a current-thread tokio runtime. Subprocess jobs and
//! timers are spawned tasks that report back through one unbounded channel;
//! terminal input is read by a dedicated thread feeding the same channel.

use std::collections::HashMap;
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context as _, Result};
use crossterm::cursor;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use super::navigator::Navigator;
use super::page::{Effect, Msg, Page, Ticket};
use crate::extensions::Registry;
use crate::platform::Platform;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

const INPUT_POLL: Duration = Duration::from_millis(50);

fn init_terminal() -> Result<TuiTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("failed to create terminal")
}

fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)
        .context("failed to leave alternate screen")?;
    Ok(())
}

/// Reads terminal events on its own thread. Pausing it lets another
/// process own the terminal.
struct InputPump {
    paused: Arc<AtomicBool>,
    idle: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputPump {
    fn spawn(tx: UnboundedSender<Msg>) -> Self {
        let paused = Arc::new(AtomicBool::new(false));
        let idle = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let (paused, idle, stop) = (paused.clone(), idle.clone(), stop.clone());
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    if paused.load(Ordering::Acquire) {
                        idle.store(true, Ordering::Release);
                        thread::sleep(INPUT_POLL);
                        continue;
                    }
                    idle.store(false, Ordering::Release);

                    let msg = match event::poll(INPUT_POLL).and_then(|ready| {
                        if ready {
                            event::read().map(Some)
                        } else {
                            Ok(None)
                        }
                    }) {
                        Ok(Some(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            Msg::Key(key)
                        }
                        Ok(Some(Event::Resize(width, height))) => Msg::Resize { width, height },
                        Ok(_) => continue,
                        Err(e) => {
                            warn!(error = %e, "terminal input failed");
                            break;
                        }
                    };
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
            })
        };

        Self {
            paused,
            idle,
            stop,
            handle: Some(handle),
        }
    }

    /// Stop reading and wait until the thread has let go of the terminal.
    fn pause(&self) {
        self.idle.store(false, Ordering::Release);
        self.paused.store(true, Ordering::Release);
        while !self.idle.load(Ordering::Acquire) {
            if self.handle.as_ref().map_or(true, |h| h.is_finished()) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// What the loop does after an effect.
enum Flow {
    Continue,
    Exit,
}

/// Owns the terminal session.
pub struct App {
    registry: Arc<Registry>,
    platform: Box<dyn Platform>,
    /// Rows to use; 0 takes the whole terminal
    height: u16,
}

impl App {
    pub fn new(registry: Registry, platform: Box<dyn Platform>, height: u16) -> Self {
        Self {
            registry: Arc::new(registry),
            platform,
            height,
        }
    }

    fn clamp_height(&self, height: u16) -> u16 {
        if self.height == 0 {
            height
        } else {
            self.height.min(height)
        }
    }

    /// Run until the root page is popped or an action exits.
    pub fn run(self, root: Box<dyn Page>) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start runtime")?;

        let mut terminal = init_terminal()?;
        let result = runtime.block_on(self.event_loop(&mut terminal, root));
        let restored = restore_terminal(&mut terminal);
        result.and(restored)
    }

    async fn event_loop(&self, terminal: &mut TuiTerminal, root: Box<dyn Page>) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let input = InputPump::spawn(tx.clone());
        let mut jobs: HashMap<Ticket, AbortHandle> = HashMap::new();

        let size = terminal.size().context("failed to read terminal size")?;
        let mut nav = Navigator::new(size.width, self.clamp_height(size.height));
        let effects = nav.push(root);
        let mut pending = nav.process(effects);
        info!("event loop started");

        let result = loop {
            let mut exit = false;
            for effect in pending.drain(..) {
                match self.apply(effect, terminal, &input, &tx, &mut jobs) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Exit) => {
                        exit = true;
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
            if exit {
                break Ok(());
            }

            terminal
                .draw(|frame| nav.render(frame))
                .context("failed to draw")?;

            let Some(msg) = rx.recv().await else {
                break Ok(());
            };
            let msg = match msg {
                Msg::Invoked { ticket, result } => {
                    jobs.remove(&ticket);
                    Msg::Invoked { ticket, result }
                }
                Msg::Resize { width, height } => Msg::Resize {
                    width,
                    height: self.clamp_height(height),
                },
                msg => msg,
            };
            let effects = nav.update(msg);
            pending = nav.process(effects);
        };

        for (_, job) in jobs.drain() {
            job.abort();
        }
        info!("event loop stopped");
        result
    }

    fn apply(
        &self,
        effect: Effect,
        terminal: &mut TuiTerminal,
        input: &InputPump,
        tx: &UnboundedSender<Msg>,
        jobs: &mut HashMap<Ticket, AbortHandle>,
    ) -> Result<Flow> {
        match effect {
            Effect::Exit => return Ok(Flow::Exit),
            Effect::Invoke(job) => {
                let tx = tx.clone();
                let ticket = job.ticket;
                let handle = tokio::spawn(async move {
                    let result = job.invocation.output().await;
                    let _ = tx.send(Msg::Invoked { ticket, result });
                });
                if let Some(previous) = jobs.insert(ticket, handle.abort_handle()) {
                    previous.abort();
                }
            }
            Effect::Cancel(ticket) => {
                if let Some(job) = jobs.remove(&ticket) {
                    debug!(
                        runner = ticket.runner,
                        generation = ticket.generation,
                        "cancelling job"
                    );
                    job.abort();
                }
            }
            Effect::Copy(text) => match self.platform.copy(&text) {
                Ok(()) => return Ok(Flow::Exit),
                Err(e) => {
                    error!(error = %e, "copy failed");
                    let _ = tx.send(Msg::Error(e.to_string()));
                }
            },
            Effect::Open { target, app } => match self.platform.open(&target, app.as_deref()) {
                Ok(()) => return Ok(Flow::Exit),
                Err(e) => {
                    error!(error = %e, "open failed");
                    let _ = tx.send(Msg::Error(e.to_string()));
                }
            },
            Effect::Edit {
                runner,
                extension,
                entrypoint,
            } => {
                input.pause();
                restore_terminal(terminal)?;
                let edited = self.platform.edit(&entrypoint);
                *terminal = init_terminal()?;
                terminal.clear().context("failed to clear terminal")?;
                input.resume();

                if let Err(e) = edited {
                    error!(error = %e, "editor failed");
                    let _ = tx.send(Msg::Error(e.to_string()));
                    return Ok(Flow::Continue);
                }

                let registry = Arc::clone(&self.registry);
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let result = registry.load_as(&extension, &entrypoint, true);
                    let _ = tx.send(Msg::ManifestReloaded { runner, result });
                });
            }
            Effect::Schedule { after, msg } => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(msg);
                });
            }
            Effect::Push(_) | Effect::Pop | Effect::Replace(_) | Effect::Send(_) => {
                warn!("stack effect reached the event loop");
            }
        }
        Ok(Flow::Continue)
    }
}
