//! Action dispatch.
//!
//! [`dispatch`] is a pure decision: it looks the target command up in the
//! catalog, checks its params and tells the runner what to do. Nothing is
//! spawned here.

use std::sync::Arc;

use crate::extensions::invoke::missing_params;
use crate::extensions::{
    Action, ActionKind, Catalog, CommandSpec, Extension, Invocation, Mode, ParamSpec, Params,
};

/// What the dispatching runner knows about itself.
pub struct DispatchContext<'a> {
    pub catalog: &'a Catalog,
    /// Extension of the current runner; the default target of `run` actions
    pub current: Option<&'a str>,
}

#[derive(Debug)]
pub enum Decision {
    /// Show the command in a new runner
    Push {
        extension: Arc<Extension>,
        command: CommandSpec,
        params: Params,
    },
    /// Collect `missing` with a form, then dispatch `action` again
    RequestParams {
        action: Action,
        title: String,
        missing: Vec<ParamSpec>,
    },
    /// Run a `silent` or `action` command in place
    Execute {
        invocation: Invocation,
        mode: Mode,
        reload: bool,
        exit: bool,
    },
    Open {
        target: String,
        app: Option<String>,
    },
    Copy {
        text: String,
    },
    Reload {
        params: Params,
    },
    Exit,
    Error(String),
}

pub fn dispatch(action: &Action, ctx: &DispatchContext<'_>) -> Decision {
    match &action.kind {
        ActionKind::Run {
            extension,
            command,
            params,
            reload,
            exit,
        } => {
            let Some(name) = extension.as_deref().or(ctx.current) else {
                return Decision::Error(format!("no extension to run {} with", command));
            };
            let extension = match ctx.catalog.get(name) {
                Ok(extension) => extension,
                Err(e) => return Decision::Error(e.to_string()),
            };
            let spec = match extension.command(command) {
                Ok(spec) => spec.clone(),
                Err(e) => return Decision::Error(e.to_string()),
            };

            let missing: Vec<ParamSpec> = missing_params(&spec, params)
                .into_iter()
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Decision::RequestParams {
                    action: action.clone().bind_extension(&extension.name),
                    title: spec.display_title().to_string(),
                    missing,
                };
            }

            if spec.mode.is_view() {
                return Decision::Push {
                    extension,
                    command: spec,
                    params: params.clone(),
                };
            }

            match Invocation::new(&extension, &spec, params) {
                Ok(invocation) => Decision::Execute {
                    invocation,
                    mode: spec.mode,
                    reload: *reload,
                    exit: *exit,
                },
                Err(e) => Decision::Error(e.to_string()),
            }
        }
        ActionKind::Open { target, app } => Decision::Open {
            target: target.clone(),
            app: app.clone(),
        },
        ActionKind::Copy { text } => Decision::Copy { text: text.clone() },
        ActionKind::Reload { params } => Decision::Reload {
            params: params.clone(),
        },
        ActionKind::Exit => Decision::Exit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ParamValue;

    fn catalog() -> Catalog {
        let manifest = serde_json::from_str(
            r#"{
                "title": "Demo",
                "commands": [
                    {"name": "list", "mode": "filter"},
                    {"name": "greet", "mode": "detail",
                     "params": [{"name": "name", "type": "string"}]},
                    {"name": "touch", "mode": "silent",
                     "params": [{"name": "count", "type": "number", "default": 1}]},
                    {"name": "next", "mode": "action"}
                ]
            }"#,
        )
        .unwrap();
        vec![Extension {
            name: "demo".into(),
            entrypoint: "/ext/demo".into(),
            manifest,
        }]
        .into_iter()
        .collect()
    }

    fn run(command: &str) -> Action {
        Action::run(command)
    }

    #[test]
    fn test_view_mode_pushes() {
        let catalog = catalog();
        let ctx = DispatchContext {
            catalog: &catalog,
            current: Some("demo"),
        };
        match dispatch(&run("list"), &ctx) {
            Decision::Push {
                extension, command, ..
            } => {
                assert_eq!(extension.name, "demo");
                assert_eq!(command.name, "list");
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_missing_param_requests_form() {
        let catalog = catalog();
        let ctx = DispatchContext {
            catalog: &catalog,
            current: Some("demo"),
        };
        match dispatch(&run("greet"), &ctx) {
            Decision::RequestParams {
                action, missing, ..
            } => {
                assert_eq!(missing.len(), 1);
                assert_eq!(missing[0].name, "name");
                match action.kind {
                    ActionKind::Run { extension, .. } => {
                        assert_eq!(extension.as_deref(), Some("demo"))
                    }
                    other => panic!("unexpected action: {:?}", other),
                }
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_supplied_param_satisfies() {
        let catalog = catalog();
        let ctx = DispatchContext {
            catalog: &catalog,
            current: Some("demo"),
        };
        let mut action = run("greet");
        if let ActionKind::Run { params, .. } = &mut action.kind {
            params.insert("name".into(), ParamValue::from("ada"));
        }
        assert!(matches!(dispatch(&action, &ctx), Decision::Push { .. }));
    }

    #[test]
    fn test_silent_mode_executes_with_defaults() {
        let catalog = catalog();
        let ctx = DispatchContext {
            catalog: &catalog,
            current: Some("demo"),
        };
        match dispatch(&run("touch"), &ctx) {
            Decision::Execute {
                invocation, mode, ..
            } => {
                assert_eq!(mode, Mode::Silent);
                assert_eq!(invocation.params["count"], ParamValue::from(1));
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_targets_are_errors() {
        let catalog = catalog();
        let ctx = DispatchContext {
            catalog: &catalog,
            current: None,
        };
        assert!(matches!(dispatch(&run("list"), &ctx), Decision::Error(_)));

        let ctx = DispatchContext {
            catalog: &catalog,
            current: Some("demo"),
        };
        assert!(matches!(dispatch(&run("missing"), &ctx), Decision::Error(_)));

        let mut action = run("list");
        if let ActionKind::Run { extension, .. } = &mut action.kind {
            *extension = Some("other".into());
        }
        assert!(matches!(dispatch(&action, &ctx), Decision::Error(_)));
    }

    #[test]
    fn test_side_effect_actions() {
        let catalog = Catalog::new();
        let ctx = DispatchContext {
            catalog: &catalog,
            current: None,
        };
        assert!(matches!(
            dispatch(&Action::new(ActionKind::Copy { text: "x".into() }), &ctx),
            Decision::Copy { .. }
        ));
        assert!(matches!(
            dispatch(&Action::new(ActionKind::Exit), &ctx),
            Decision::Exit
        ));
    }
}
