//! Per-extension subcommands.
//!
//! Each extension becomes a clap command built from its manifest: one
//! subcommand per command, one `--flag` per declared param.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{bail, Context as _};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::debug;

use super::Session;
use crate::extensions::schema::decode_action;
use crate::extensions::{CommandSpec, Extension, Invocation, Mode, ParamKind, ParamValue, Params};
use crate::platform::{Platform, SystemPlatform};
use crate::tui::dispatch::{dispatch, Decision, DispatchContext};
use crate::tui::runner::MAX_ACTION_DEPTH;
use crate::tui::Runner;

fn parse_number(value: &str) -> Result<serde_json::Number, String> {
    value
        .parse::<serde_json::Number>()
        .map_err(|_| format!("'{}' is not a number", value))
}

/// Clap command for an extension.
pub fn command(extension: &Extension) -> Command {
    let about = match extension.manifest.description.as_str() {
        "" => extension.title().to_string(),
        description => description.to_string(),
    };

    extension.manifest.commands.iter().fold(
        Command::new(extension.name.clone())
            .about(about)
            .disable_help_subcommand(true),
        |cmd, spec| cmd.subcommand(subcommand(spec)),
    )
}

fn subcommand(spec: &CommandSpec) -> Command {
    let about = spec
        .description
        .clone()
        .unwrap_or_else(|| spec.display_title().to_string());

    spec.params.iter().fold(
        Command::new(spec.name.clone()).about(about),
        |cmd, param| {
            let mut arg = Arg::new(param.name.clone())
                .long(param.name.clone())
                .help(
                    param
                        .description
                        .clone()
                        .unwrap_or_else(|| param.display_title().to_string()),
                )
                .required(param.is_required());
            arg = match param.kind {
                ParamKind::Boolean => arg.action(ArgAction::SetTrue),
                ParamKind::Number => arg.value_parser(parse_number),
                ParamKind::String => arg,
            };
            cmd.arg(arg)
        },
    )
}

/// Params given on the command line. Absent flags stay absent so their
/// defaults apply.
pub fn params_from_matches(spec: &CommandSpec, matches: &ArgMatches) -> Params {
    let mut params = Params::new();
    for param in &spec.params {
        let name = param.name.as_str();
        if matches.value_source(name) != Some(ValueSource::CommandLine) {
            continue;
        }
        let value = match param.kind {
            ParamKind::Boolean => Some(ParamValue::Bool(matches.get_flag(name))),
            ParamKind::Number => matches
                .get_one::<serde_json::Number>(name)
                .cloned()
                .map(ParamValue::Number),
            ParamKind::String => matches
                .get_one::<String>(name)
                .cloned()
                .map(ParamValue::String),
        };
        if let Some(value) = value {
            params.insert(param.name.clone(), value);
        }
    }
    params
}

/// `sunbeam <extension> [command] [flags]`.
pub fn run(session: Session, args: Vec<String>) -> anyhow::Result<()> {
    let Some(name) = args.first() else {
        bail!("missing extension name");
    };
    let extension = session.catalog.get(name)?;
    let mut cli = command(&extension);
    let matches = cli.clone().get_matches_from(&args);

    let Some((command_name, sub)) = matches.subcommand() else {
        if !io::stdout().is_terminal() {
            println!("{}", serde_json::to_string_pretty(&extension.manifest)?);
            return Ok(());
        }
        if extension.manifest.root.is_empty() {
            cli.print_help()?;
            return Ok(());
        }
        return session.run_root(Some(extension.name.clone()));
    };

    let spec = extension.command(command_name)?.clone();
    let params = params_from_matches(&spec, sub);
    run_command(session, extension, spec, params)
}

fn run_command(
    session: Session,
    extension: Arc<Extension>,
    spec: CommandSpec,
    params: Params,
) -> anyhow::Result<()> {
    let invocation = Invocation::new(&extension, &spec, &params)?;

    if !io::stdout().is_terminal() {
        debug!(command = %spec.name, "streaming command output");
        return Ok(invocation.run_inherited()?);
    }

    match spec.mode {
        Mode::Search | Mode::Filter | Mode::Detail => {
            session.run_tui(|ctx| Box::new(Runner::new(ctx, extension, spec, params)))
        }
        Mode::Silent => {
            block_on(invocation.output())??;
            Ok(())
        }
        Mode::Action => run_action_chain(session, &extension, invocation),
    }
}

fn block_on<F: std::future::Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    Ok(runtime.block_on(future))
}

/// Execute an `action` command and the actions it returns, without a UI
/// until one of them needs a view.
fn run_action_chain(
    session: Session,
    extension: &Extension,
    mut invocation: Invocation,
) -> anyhow::Result<()> {
    let platform = SystemPlatform::new(&session.config);

    for _ in 0..=MAX_ACTION_DEPTH {
        let output = block_on(invocation.output())??;
        if output.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let action = decode_action(&output)?;

        let decision = dispatch(
            &action,
            &DispatchContext {
                catalog: &session.catalog,
                current: Some(&extension.name),
            },
        );
        match decision {
            Decision::Execute {
                invocation: next,
                mode: Mode::Action,
                ..
            } => invocation = next,
            Decision::Execute {
                invocation: next, ..
            } => {
                block_on(next.output())??;
                return Ok(());
            }
            Decision::Push {
                extension,
                command,
                params,
            } => {
                return session
                    .run_tui(|ctx| Box::new(Runner::new(ctx, extension, command, params)));
            }
            Decision::RequestParams { title, missing, .. } => {
                let names: Vec<&str> = missing.iter().map(|p| p.name.as_str()).collect();
                bail!("{} requires {}", title, names.join(", "));
            }
            Decision::Open { target, app } => {
                platform.open(&target, app.as_deref())?;
                return Ok(());
            }
            Decision::Copy { text } => {
                platform.copy(&text)?;
                return Ok(());
            }
            Decision::Reload { .. } | Decision::Exit => return Ok(()),
            Decision::Error(message) => bail!(message),
        }
    }

    bail!("action chain exceeded {} steps", MAX_ACTION_DEPTH)
}
