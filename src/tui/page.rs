//! Pages, messages and effects.
//!
//! Pages never perform I/O. They react to a [`Msg`] by mutating their own
//! state and returning [`Effect`]s, which the navigator and the event loop
//! carry out.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;

use super::style::Theme;
use crate::extensions::{Action, Catalog, Extension, ExtensionResult, Invocation};
use crate::services::History;

/// Identifies a runner for the lifetime of the process.
pub type RunnerId = u64;

/// Identifies one invocation started by one runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub runner: RunnerId,
    pub generation: u64,
}

/// Input delivered to pages.
#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Resize {
        width: u16,
        height: u16,
    },
    /// A command invocation finished
    Invoked {
        ticket: Ticket,
        result: ExtensionResult<Vec<u8>>,
    },
    /// An action to dispatch, e.g. re-issued by a submitted form
    Action(Action),
    /// A forced manifest reload finished after editing
    ManifestReloaded {
        runner: RunnerId,
        result: ExtensionResult<Extension>,
    },
    /// Auto-refresh timer for the invocation that scheduled it
    Refresh(Ticket),
    /// A side effect failed
    Error(String),
}

/// A command invocation to run in the background.
#[derive(Debug, Clone)]
pub struct Job {
    pub ticket: Ticket,
    pub invocation: Invocation,
}

/// Work requested by a page.
pub enum Effect {
    Push(Box<dyn Page>),
    Pop,
    /// Swap the top page for another
    Replace(Box<dyn Page>),
    Exit,
    Invoke(Job),
    Cancel(Ticket),
    Copy(String),
    Open {
        target: String,
        app: Option<String>,
    },
    /// Hand the terminal to the editor, then force-reload the manifest
    Edit {
        runner: RunnerId,
        extension: String,
        entrypoint: PathBuf,
    },
    /// Deliver `msg` after a delay
    Schedule {
        after: Duration,
        msg: Msg,
    },
    /// Deliver `msg` to the focused page
    Send(Msg),
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(_) => f.write_str("Push(..)"),
            Self::Pop => f.write_str("Pop"),
            Self::Replace(_) => f.write_str("Replace(..)"),
            Self::Exit => f.write_str("Exit"),
            Self::Invoke(job) => f.debug_tuple("Invoke").field(job).finish(),
            Self::Cancel(ticket) => f.debug_tuple("Cancel").field(ticket).finish(),
            Self::Copy(text) => f.debug_tuple("Copy").field(text).finish(),
            Self::Open { target, app } => f
                .debug_struct("Open")
                .field("target", target)
                .field("app", app)
                .finish(),
            Self::Edit {
                runner,
                extension,
                entrypoint,
            } => f
                .debug_struct("Edit")
                .field("runner", runner)
                .field("extension", extension)
                .field("entrypoint", entrypoint)
                .finish(),
            Self::Schedule { after, msg } => f
                .debug_struct("Schedule")
                .field("after", after)
                .field("msg", msg)
                .finish(),
            Self::Send(msg) => f.debug_tuple("Send").field(msg).finish(),
        }
    }
}

/// A view on the navigator stack.
pub trait Page {
    /// Called once, after the page is pushed and sized.
    fn init(&mut self) -> Vec<Effect> {
        Vec::new()
    }

    /// The page became the top of the stack.
    fn focus(&mut self) -> Vec<Effect> {
        Vec::new()
    }

    /// Another page was pushed on top of this one.
    fn blur(&mut self) -> Vec<Effect> {
        Vec::new()
    }

    /// The page was popped.
    fn dispose(&mut self) -> Vec<Effect> {
        self.blur()
    }

    fn set_size(&mut self, width: u16, height: u16);

    fn update(&mut self, msg: Msg) -> Vec<Effect>;

    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Handles shared by every page of one session.
#[derive(Clone)]
pub struct Context {
    pub catalog: Rc<RefCell<Catalog>>,
    pub history: Rc<RefCell<History>>,
    pub theme: Theme,
    next_id: Rc<Cell<RunnerId>>,
}

impl Context {
    pub fn new(catalog: Catalog, history: History, theme: Theme) -> Self {
        Self {
            catalog: Rc::new(RefCell::new(catalog)),
            history: Rc::new(RefCell::new(history)),
            theme,
            next_id: Rc::new(Cell::new(1)),
        }
    }

    /// Allocate a runner id.
    pub fn next_runner_id(&self) -> RunnerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}
