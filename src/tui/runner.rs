//! Runner: the live controller of one command view.
//!
//! A runner owns the embedded list or detail view, the params of its command
//! and at most one in-flight invocation. Every invocation carries a
//! [`Ticket`]; completions whose ticket is not the current one are dropped.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, warn};

use super::detail::DetailView;
use super::dispatch::{dispatch, Decision, DispatchContext};
use super::form::Form;
use super::list::ListView;
use super::page::{Context, Effect, Job, Msg, Page, RunnerId, Ticket};
use super::style::{render_footer, render_header, Chrome};
use super::ViewEvent;
use crate::extensions::schema::{decode_action, decode_detail, decode_list};
use crate::extensions::{
    Action, Catalog, CommandSpec, Extension, ExtensionResult, Invocation, List, ListItem, Mode,
    Params,
};
use crate::services::History;

/// Longest chain of `action`-mode hops started by one user action.
pub const MAX_ACTION_DEPTH: usize = 16;

/// Where the runner's items come from.
pub enum Source {
    Command {
        extension: Arc<Extension>,
        command: CommandSpec,
    },
    /// Root actions of the catalog, or of one extension
    Root { only: Option<String> },
}

enum Embed {
    Empty,
    List(ListView),
    Detail(DetailView),
    Error(String),
}

enum Purpose {
    Reload,
    Execute {
        mode: Mode,
        reload: bool,
        exit: bool,
        depth: usize,
    },
}

pub struct Runner {
    id: RunnerId,
    ctx: Context,
    source: Source,
    params: Params,
    embed: Embed,
    generation: u64,
    in_flight: Option<(Ticket, Purpose)>,
    stale: bool,
    /// An auto-refresh timer is pending for the current generation
    refresh_due: bool,
    height: u16,
}

impl Runner {
    pub fn new(
        ctx: Context,
        extension: Arc<Extension>,
        command: CommandSpec,
        params: Params,
    ) -> Self {
        Self::with_source(ctx, Source::Command { extension, command }, params)
    }

    /// Runner over the root items of the catalog.
    pub fn root(ctx: Context, only: Option<String>) -> Self {
        Self::with_source(ctx, Source::Root { only }, Params::new())
    }

    fn with_source(ctx: Context, source: Source, params: Params) -> Self {
        Self {
            id: ctx.next_runner_id(),
            ctx,
            source,
            params,
            embed: Embed::Empty,
            generation: 0,
            in_flight: None,
            stale: false,
            refresh_due: false,
            height: 0,
        }
    }

    pub fn id(&self) -> RunnerId {
        self.id
    }

    pub fn title(&self) -> String {
        match &self.source {
            Source::Command { command, .. } => command.display_title().to_string(),
            Source::Root { only: Some(name) } => self
                .ctx
                .catalog
                .borrow()
                .get(name)
                .map(|ext| ext.title().to_string())
                .unwrap_or_else(|_| name.clone()),
            Source::Root { only: None } => "Sunbeam".to_string(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Message of the error view, if one is shown.
    pub fn error(&self) -> Option<&str> {
        match &self.embed {
            Embed::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn list(&self) -> Option<&ListView> {
        match &self.embed {
            Embed::List(view) => Some(view),
            _ => None,
        }
    }

    fn mode(&self) -> Option<Mode> {
        match &self.source {
            Source::Command { command, .. } => Some(command.mode),
            Source::Root { .. } => None,
        }
    }

    fn extension_name(&self) -> Option<&str> {
        match &self.source {
            Source::Command { extension, .. } => Some(&extension.name),
            Source::Root { .. } => None,
        }
    }

    fn next_ticket(&mut self) -> Ticket {
        self.generation += 1;
        Ticket {
            runner: self.id,
            generation: self.generation,
        }
    }

    fn cancel(&mut self) -> Vec<Effect> {
        match self.in_flight.take() {
            Some((ticket, _)) => vec![Effect::Cancel(ticket)],
            None => Vec::new(),
        }
    }

    fn fail(&mut self, message: impl Into<String>) -> Vec<Effect> {
        let message = message.into();
        debug!(runner = self.id, error = %message, "showing error view");
        self.embed = Embed::Error(message);
        Vec::new()
    }

    /// Query exported to the command, for lists it cannot filter locally.
    fn live_query(&self) -> Option<String> {
        let dynamic = match &self.embed {
            Embed::List(view) => view.is_dynamic(),
            _ => false,
        };
        if self.mode() != Some(Mode::Search) && !dynamic {
            return None;
        }
        Some(match &self.embed {
            Embed::List(view) => view.query().to_string(),
            _ => String::new(),
        })
    }

    /// Supersede any in-flight invocation and load the view again.
    pub fn reload(&mut self) -> Vec<Effect> {
        let mut effects = self.cancel();
        self.refresh_due = false;

        let Source::Command { extension, command } = &self.source else {
            let list = match &self.source {
                Source::Root { only } => root_list(
                    &self.ctx.catalog.borrow(),
                    &self.ctx.history.borrow(),
                    only.as_deref(),
                ),
                Source::Command { .. } => List::default(),
            };
            self.show_list(list);
            return effects;
        };

        let invocation = match Invocation::new(extension, command, &self.params) {
            Ok(invocation) => invocation.with_query(self.live_query()),
            Err(e) => {
                effects.extend(self.fail(e.to_string()));
                return effects;
            }
        };

        let ticket = self.next_ticket();
        self.in_flight = Some((ticket, Purpose::Reload));
        effects.push(Effect::Invoke(Job { ticket, invocation }));
        effects
    }

    fn execute(
        &mut self,
        invocation: Invocation,
        mode: Mode,
        reload: bool,
        exit: bool,
        depth: usize,
    ) -> Vec<Effect> {
        let mut effects = self.cancel();
        let ticket = self.next_ticket();
        self.in_flight = Some((
            ticket,
            Purpose::Execute {
                mode,
                reload,
                exit,
                depth,
            },
        ));
        effects.push(Effect::Invoke(Job { ticket, invocation }));
        effects
    }

    fn show_list(&mut self, mut list: List) {
        if self.mode() == Some(Mode::Search) {
            list.dynamic = true;
        }
        if let Embed::List(view) = &mut self.embed {
            view.set_list(list);
            return;
        }

        let mut view = ListView::new(list);
        if matches!(self.source, Source::Root { .. }) {
            let history = self.ctx.history.clone();
            view = view.with_order(Box::new(move |a: &ListItem, b: &ListItem| {
                history.borrow().compare(a.id(), b.id())
            }));
        }
        view.set_height(self.height);
        self.embed = Embed::List(view);
    }

    fn show_output(&mut self, ticket: Ticket, bytes: &[u8]) -> Vec<Effect> {
        match self.mode() {
            Some(Mode::Detail) => match decode_detail(bytes) {
                Ok(detail) => {
                    if let Embed::Detail(view) = &mut self.embed {
                        view.set_detail(detail);
                    } else {
                        let mut view = DetailView::new(detail);
                        view.set_height(self.height);
                        self.embed = Embed::Detail(view);
                    }
                    Vec::new()
                }
                Err(e) => self.fail(e.to_string()),
            },
            Some(Mode::Search) | Some(Mode::Filter) => match decode_list(bytes) {
                Ok(list) => {
                    let refresh = list.auto_refresh_seconds;
                    self.show_list(list);
                    self.refresh_due = refresh > 0;
                    if refresh > 0 {
                        vec![Effect::Schedule {
                            after: Duration::from_secs(refresh),
                            msg: Msg::Refresh(ticket),
                        }]
                    } else {
                        Vec::new()
                    }
                }
                Err(e) => self.fail(e.to_string()),
            },
            Some(mode) => self.fail(format!("{} commands have no view", mode)),
            None => Vec::new(),
        }
    }

    fn on_invoked(&mut self, ticket: Ticket, result: ExtensionResult<Vec<u8>>) -> Vec<Effect> {
        let current = self.in_flight.as_ref().map(|(t, _)| *t);
        if current != Some(ticket) {
            debug!(runner = self.id, generation = ticket.generation, "dropping stale result");
            return Vec::new();
        }
        let Some((_, purpose)) = self.in_flight.take() else {
            return Vec::new();
        };

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => return self.fail(e.to_string()),
        };

        match purpose {
            Purpose::Reload => self.show_output(ticket, &bytes),
            Purpose::Execute {
                mode: Mode::Action,
                depth,
                ..
            } => {
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return self.reload();
                }
                match decode_action(&bytes) {
                    Ok(action) => self.dispatch_action(action, depth + 1),
                    Err(e) => self.fail(e.to_string()),
                }
            }
            Purpose::Execute { reload, exit, .. } => {
                if reload && !exit {
                    self.reload()
                } else {
                    vec![Effect::Exit]
                }
            }
        }
    }

    fn dispatch_action(&mut self, action: Action, depth: usize) -> Vec<Effect> {
        if depth > MAX_ACTION_DEPTH {
            warn!(runner = self.id, "action chain too long");
            return self.fail(format!(
                "action chain exceeded {} steps",
                MAX_ACTION_DEPTH
            ));
        }

        let decision = {
            let catalog = self.ctx.catalog.borrow();
            let ctx = DispatchContext {
                catalog: &catalog,
                current: self.extension_name(),
            };
            dispatch(&action, &ctx)
        };

        match decision {
            Decision::Push {
                extension,
                command,
                params,
            } => vec![Effect::Push(Box::new(Runner::new(
                self.ctx.clone(),
                extension,
                command,
                params,
            )))],
            Decision::RequestParams {
                action,
                title,
                missing,
            } => vec![Effect::Push(Box::new(Form::new(
                title,
                action,
                missing,
                self.ctx.theme,
            )))],
            Decision::Execute {
                invocation,
                mode,
                reload,
                exit,
            } => self.execute(invocation, mode, reload, exit, depth),
            Decision::Open { target, app } => vec![Effect::Open { target, app }],
            Decision::Copy { text } => vec![Effect::Copy(text)],
            Decision::Reload { params } => {
                self.params.extend(params);
                self.reload()
            }
            Decision::Exit => vec![Effect::Exit],
            Decision::Error(message) => self.fail(message),
        }
    }

    fn on_manifest_reloaded(&mut self, result: ExtensionResult<Extension>) -> Vec<Effect> {
        let extension = match result {
            Ok(extension) => self.ctx.catalog.borrow_mut().insert(extension),
            Err(e) => return self.fail(e.to_string()),
        };

        if let Source::Command {
            extension: current,
            command,
        } = &mut self.source
        {
            if current.name == extension.name {
                match extension.command(&command.name) {
                    Ok(spec) => *command = spec.clone(),
                    Err(e) => return self.fail(e.to_string()),
                }
                *current = extension;
            }
        }
        self.reload()
    }

    /// Extension whose source ctrl+e opens.
    fn edit_target(&self) -> Option<Arc<Extension>> {
        match &self.source {
            Source::Command { extension, .. } => Some(Arc::clone(extension)),
            Source::Root { .. } => {
                let item = self.list()?.selection()?;
                let name = item.accessories.first()?;
                self.ctx.catalog.borrow().get(name).ok()
            }
        }
    }

    fn on_view_event(&mut self, event: ViewEvent) -> Vec<Effect> {
        match event {
            ViewEvent::None => Vec::new(),
            ViewEvent::Back => vec![Effect::Pop],
            ViewEvent::QueryChanged(_) => {
                if self.live_query().is_some() {
                    self.reload()
                } else {
                    Vec::new()
                }
            }
            ViewEvent::Action(action) => {
                if matches!(self.source, Source::Root { .. }) {
                    let selected = self
                        .list()
                        .and_then(|v| v.selection())
                        .map(|i| i.id().to_string());
                    if let Some(id) = selected {
                        self.ctx.history.borrow_mut().touch(&id);
                    }
                }
                self.dispatch_action(action, 0)
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('r') => return self.reload(),
                KeyCode::Char('e') => {
                    return match self.edit_target() {
                        Some(extension) => vec![Effect::Edit {
                            runner: self.id,
                            extension: extension.name.clone(),
                            entrypoint: extension.entrypoint.clone(),
                        }],
                        None => Vec::new(),
                    };
                }
                _ => {}
            }
        }

        let event = match &mut self.embed {
            Embed::List(view) => view.handle_key(key),
            Embed::Detail(view) => view.handle_key(key),
            Embed::Empty | Embed::Error(_) => match key.code {
                KeyCode::Esc => ViewEvent::Back,
                _ => ViewEvent::None,
            },
        };
        self.on_view_event(event)
    }
}

/// Root items of the catalog, most recently used first.
pub fn root_list(catalog: &Catalog, history: &History, only: Option<&str>) -> List {
    let mut items: Vec<ListItem> = catalog
        .root_entries(only)
        .into_iter()
        .map(|entry| ListItem {
            title: entry.action.display_title().to_string(),
            subtitle: Some(entry.extension_title),
            id: Some(entry.id),
            accessories: vec![entry.extension],
            actions: vec![entry.action],
            detail: None,
        })
        .collect();
    items.sort_by(|a, b| history.compare(a.id(), b.id()));

    List {
        items,
        empty_text: Some("No root items".to_string()),
        ..List::default()
    }
}

impl Page for Runner {
    fn init(&mut self) -> Vec<Effect> {
        self.reload()
    }

    fn focus(&mut self) -> Vec<Effect> {
        if self.stale {
            self.stale = false;
            return self.reload();
        }
        Vec::new()
    }

    fn blur(&mut self) -> Vec<Effect> {
        // Timers only reach the top page, so a covered runner refreshes on focus.
        if self.in_flight.is_some() || self.refresh_due {
            self.stale = true;
        }
        self.cancel()
    }

    fn set_size(&mut self, _width: u16, height: u16) {
        self.height = height;
        match &mut self.embed {
            Embed::List(view) => view.set_height(height),
            Embed::Detail(view) => view.set_height(height),
            Embed::Empty | Embed::Error(_) => {}
        }
    }

    fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Invoked { ticket, result } => self.on_invoked(ticket, result),
            Msg::Action(action) => self.dispatch_action(action, 0),
            Msg::ManifestReloaded { runner, result } => {
                if runner != self.id {
                    return Vec::new();
                }
                self.on_manifest_reloaded(result)
            }
            Msg::Refresh(ticket) => {
                if ticket.runner != self.id
                    || ticket.generation != self.generation
                    || self.in_flight.is_some()
                {
                    return Vec::new();
                }
                self.reload()
            }
            Msg::Error(message) => self.fail(message),
            Msg::Resize { .. } => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = self.title();
        let loading = self.is_loading();
        let theme = self.ctx.theme;

        match &mut self.embed {
            Embed::List(view) => view.render(frame, area, &theme, &title, loading),
            Embed::Detail(view) => view.render(frame, area, &theme, &title, loading),
            Embed::Empty => {
                let chrome = Chrome::split(area);
                render_header(frame, chrome.header, &theme, &title, loading);
                render_footer(frame, chrome.footer, &theme, None, "esc back");
            }
            Embed::Error(message) => {
                let chrome = Chrome::split(area);
                render_header(frame, chrome.header, &theme, &title, loading);
                let lines: Vec<Line> = std::iter::once(Line::styled("Error", theme.error()))
                    .chain(message.lines().map(Line::raw))
                    .collect();
                frame.render_widget(
                    Paragraph::new(lines).wrap(Wrap { trim: false }),
                    Rect {
                        y: chrome.input.y,
                        height: chrome.body.height + 2,
                        ..chrome.body
                    },
                );
                render_footer(
                    frame,
                    chrome.footer,
                    &theme,
                    None,
                    "ctrl+r reload · esc back",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{ExtensionError, ParamValue};
    use crate::tui::navigator::Navigator;
    use crate::tui::style::Theme;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    const MANIFEST: &str = r#"{
        "title": "Demo",
        "root": [{"type": "run", "title": "Browse", "command": "browse"}],
        "commands": [
            {"name": "browse", "title": "Browse", "mode": "filter"},
            {"name": "greet", "title": "Greet", "mode": "detail",
             "params": [{"name": "name", "type": "string"}]},
            {"name": "find", "mode": "search"},
            {"name": "step", "mode": "action"},
            {"name": "touch", "mode": "silent"}
        ]
    }"#;

    fn context() -> Context {
        let extension = Extension {
            name: "demo".into(),
            entrypoint: "/ext/demo".into(),
            manifest: serde_json::from_str(MANIFEST).unwrap(),
        };
        let catalog: Catalog = vec![extension].into_iter().collect();
        Context::new(catalog, History::new(), Theme::default())
    }

    fn runner(ctx: &Context, command: &str) -> Runner {
        let extension = ctx.catalog.borrow().get("demo").unwrap();
        let spec = extension.command(command).unwrap().clone();
        Runner::new(ctx.clone(), extension, spec, Params::new())
    }

    fn job(effects: &[Effect]) -> Job {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Invoke(job) => Some(job.clone()),
                _ => None,
            })
            .expect("an invoke effect")
    }

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn invoked(job: &Job, output: &str) -> Msg {
        Msg::Invoked {
            ticket: job.ticket,
            result: Ok(output.as_bytes().to_vec()),
        }
    }

    fn screen(nav: &mut Navigator) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|frame| nav.render(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_second_reload_supersedes_first() {
        let ctx = context();
        let mut runner = runner(&ctx, "browse");
        let first = job(&runner.init());

        let effects = runner.reload();
        assert!(matches!(effects[0], Effect::Cancel(t) if t == first.ticket));
        let second = job(&effects);

        runner.update(invoked(&second, r#"{"items": [{"title": "New"}]}"#));
        runner.update(invoked(&first, r#"{"items": [{"title": "Old"}]}"#));

        let items = runner.list().unwrap().filter().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "New");
        assert!(!runner.is_loading());
    }

    #[test]
    fn test_invalid_output_shows_error() {
        let ctx = context();
        let mut runner = runner(&ctx, "browse");
        let job = job(&runner.init());
        runner.update(invoked(&job, r#"{"items": [{"subtitle": "no title"}]}"#));
        assert!(runner.error().unwrap().contains("is not valid"));
    }

    #[test]
    fn test_command_failure_shows_error() {
        let ctx = context();
        let mut runner = runner(&ctx, "browse");
        let job = job(&runner.init());
        runner.update(Msg::Invoked {
            ticket: job.ticket,
            result: Err(ExtensionError::CommandFailed("boom".into())),
        });
        assert_eq!(runner.error(), Some("Command failed: boom"));
    }

    #[test]
    fn test_blur_cancels_and_focus_restarts() {
        let ctx = context();
        let mut runner = runner(&ctx, "browse");
        let first = job(&runner.init());

        let effects = runner.blur();
        assert!(matches!(effects.as_slice(), [Effect::Cancel(t)] if *t == first.ticket));
        assert!(!runner.is_loading());

        let second = job(&runner.focus());
        assert_ne!(second.ticket, first.ticket);
        assert!(runner.focus().is_empty());
    }

    #[test]
    fn test_search_mode_passes_query() {
        let ctx = context();
        let mut runner = runner(&ctx, "find");
        let first = job(&runner.init());
        assert_eq!(first.invocation.query.as_deref(), Some(""));
        runner.update(invoked(&first, r#"{"items": [{"title": "one"}]}"#));

        let effects = runner.update(key(KeyCode::Char('q')));
        let second = job(&effects);
        assert_eq!(second.invocation.query.as_deref(), Some("q"));
        assert_eq!(runner.list().unwrap().filter().len(), 1);
    }

    #[test]
    fn test_auto_refresh_scheduled_and_stale_timer_dropped() {
        let ctx = context();
        let mut runner = runner(&ctx, "browse");
        let first = job(&runner.init());
        let effects = runner.update(invoked(
            &first,
            r#"{"items": [], "autoRefreshSeconds": 5}"#,
        ));
        let ticket = match effects.as_slice() {
            [Effect::Schedule {
                after,
                msg: Msg::Refresh(ticket),
            }] => {
                assert_eq!(*after, Duration::from_secs(5));
                *ticket
            }
            other => panic!("unexpected effects: {:?}", other),
        };

        job(&runner.update(Msg::Refresh(ticket)));
        assert!(runner.update(Msg::Refresh(ticket)).is_empty());
    }

    #[test]
    fn test_auto_refresh_resumes_after_covering_page_pops() {
        let ctx = context();
        let mut nav = Navigator::new(80, 24);
        let first = job(&nav.push(Box::new(runner(&ctx, "browse"))));
        let effects = nav.update(invoked(
            &first,
            r#"{"items": [{"title": "A"}], "autoRefreshSeconds": 1}"#,
        ));
        let ticket = match effects.as_slice() {
            [Effect::Schedule {
                msg: Msg::Refresh(ticket),
                ..
            }] => *ticket,
            other => panic!("unexpected effects: {:?}", other),
        };

        nav.process(vec![Effect::Push(Box::new(runner(&ctx, "browse")))]);
        assert_eq!(nav.len(), 2);

        // The timer fires while the runner is covered.
        assert!(nav.process(vec![Effect::Send(Msg::Refresh(ticket))]).is_empty());

        let effects = nav.process(vec![Effect::Pop]);
        assert!(effects.iter().any(|e| matches!(e, Effect::Invoke(_))));
    }

    #[test]
    fn test_action_mode_chain_is_bounded() {
        let ctx = context();
        let mut runner = runner(&ctx, "browse");
        runner.init();

        let mut effects = runner.update(Msg::Action(Action::run("step")));
        for _ in 0..MAX_ACTION_DEPTH {
            let next = job(&effects);
            assert_eq!(next.invocation.command, "step");
            effects = runner.update(invoked(&next, r#"{"type": "run", "command": "step"}"#));
        }
        let last = job(&effects);
        let effects = runner.update(invoked(&last, r#"{"type": "run", "command": "step"}"#));
        assert!(effects.is_empty());
        assert!(runner.error().unwrap().contains("action chain"));
    }

    #[test]
    fn test_action_mode_empty_output_reloads() {
        let ctx = context();
        let mut runner = runner(&ctx, "browse");
        runner.init();
        let step = job(&runner.update(Msg::Action(Action::run("step"))));
        let reload = job(&runner.update(invoked(&step, "\n")));
        assert_eq!(reload.invocation.command, "browse");
    }

    #[test]
    fn test_silent_mode_exits() {
        let ctx = context();
        let mut runner = runner(&ctx, "browse");
        runner.init();
        let touch = job(&runner.update(Msg::Action(Action::run("touch"))));
        let effects = runner.update(invoked(&touch, ""));
        assert!(matches!(effects.as_slice(), [Effect::Exit]));
    }

    #[test]
    fn test_reload_action_merges_params() {
        let ctx = context();
        let mut runner = runner(&ctx, "browse");
        runner.init();
        let action: Action =
            serde_json::from_str(r#"{"type": "reload", "params": {"page": 2}}"#).unwrap();
        let job = job(&runner.update(Msg::Action(action)));
        assert_eq!(job.invocation.params["page"], ParamValue::from(2));
    }

    #[test]
    fn test_root_lists_catalog_and_records_history() {
        let ctx = context();
        let mut root = Runner::root(ctx.clone(), None);
        assert!(root.init().is_empty());

        let item = root.list().unwrap().selection().unwrap().clone();
        assert_eq!(item.title, "Browse");
        assert_eq!(item.id(), "demo:0");

        let effects = root.update(key(KeyCode::Enter));
        assert!(matches!(effects.as_slice(), [Effect::Push(_)]));
        assert!(ctx.history.borrow().last_used("demo:0").is_some());
    }

    #[test]
    fn test_edit_shortcut() {
        let ctx = context();
        let mut runner = runner(&ctx, "browse");
        runner.init();
        let effects = runner.update(Msg::Key(KeyEvent::new(
            KeyCode::Char('e'),
            KeyModifiers::CONTROL,
        )));
        match effects.as_slice() {
            [Effect::Edit {
                extension,
                entrypoint,
                ..
            }] => {
                assert_eq!(extension, "demo");
                assert_eq!(entrypoint, &std::path::PathBuf::from("/ext/demo"));
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_list_renders_filters_and_requests_missing_params() {
        let ctx = context();
        let mut nav = Navigator::new(60, 12);
        let effects = nav.push(Box::new(runner(&ctx, "browse")));
        let first = job(&nav.process(effects));

        let output = r#"{"items": [{"title": "A", "id": "a",
            "actions": [{"type": "run", "command": "greet"}]}]}"#;
        let effects = nav.update(invoked(&first, output));
        assert!(nav.process(effects).is_empty());
        assert!(screen(&mut nav).contains("▸ A"));

        for c in "zzz".chars() {
            let effects = nav.update(key(KeyCode::Char(c)));
            nav.process(effects);
        }
        assert!(screen(&mut nav).contains("No matches"));

        for _ in 0..3 {
            let effects = nav.update(key(KeyCode::Backspace));
            nav.process(effects);
        }
        let effects = nav.update(key(KeyCode::Enter));
        let remaining = nav.process(effects);
        assert!(!remaining.iter().any(|e| matches!(e, Effect::Invoke(_))));
        assert_eq!(nav.len(), 2);
        assert!(screen(&mut nav).contains("name"));
    }
}
