// src/cli/dispatcher.rs

use anyhow::{Context as _, Result, anyhow};
use std::collections::HashMap;

use crate::{
    constants::UID_TRAVERSE,
    core::{
        action::Action,
        arg_parser::TypedArgs,
        flags::{action_flags, action_subcommands},
        invoked::InvokedAction,
        uid::{self, Target, Uid},
    },
    models::{Command, CompletionOptions, Context},
    system::shell,
};

/// Actions keyed by flag name.
pub type ActionMap = HashMap<String, Action>;

/// Completion actions registered against a host command tree, addressed by UID.
#[derive(Debug)]
pub struct Registry {
    root: Command,
    options: CompletionOptions,
    actions: HashMap<String, Action>,
}

impl Registry {
    /// Creates an empty registry for the command tree `root`.
    pub fn new(root: Command) -> Self {
        Self {
            root,
            options: CompletionOptions::default(),
            actions: HashMap::new(),
        }
    }

    /// Sets the options used when completing flags.
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// The command tree completions are registered against.
    pub fn root(&self) -> &Command {
        &self.root
    }

    /// Registers value completion for flags of the command at `path`.
    pub fn flag_completion<S: AsRef<str>>(
        &mut self,
        path: &[S],
        actions: ActionMap,
    ) -> Result<(), uid::UidError> {
        for (flag, action) in actions {
            let uid = Uid::flag(path, &flag);
            uid::check_addressable(&uid)?;
            uid::find(&self.root, &uid)?;
            log::debug!("Registered flag action '{}'", uid);
            self.actions.insert(uid.to_string(), action);
        }
        Ok(())
    }

    /// Registers completion for the positional slots of the command at `path`,
    /// in order.
    pub fn positional_completion<S: AsRef<str>>(
        &mut self,
        path: &[S],
        actions: Vec<Action>,
    ) -> Result<(), uid::UidError> {
        let command = Uid::command(path);
        uid::check_addressable(&command)?;
        uid::find(&self.root, &command)?;
        for (position, action) in actions.into_iter().enumerate() {
            let uid = Uid::positional(path, position);
            log::debug!("Registered positional action '{}'", uid);
            self.actions.insert(uid.to_string(), action);
        }
        Ok(())
    }

    /// The action registered under `uid`.
    pub fn action(&self, uid: &str) -> Option<&Action> {
        self.actions.get(uid)
    }

    /// Resolves and renders the candidates for one completion request.
    ///
    /// `args` are the words typed after the program name, the last one being
    /// the word under completion.
    pub fn complete(&self, shell_name: &str, uid: &str, args: &[String]) -> Result<String> {
        let invoked = self.resolve(uid, args)?;
        log::debug!(
            "Resolved {} candidate(s) (nospace={}, skipcache={})",
            invoked.raw_values.len(),
            invoked.nospace,
            invoked.skipcache
        );
        Ok(shell::format(shell_name, &invoked)?)
    }

    /// Resolves the candidates for one completion request.
    pub fn resolve(&self, uid: &str, args: &[String]) -> Result<InvokedAction> {
        let typed = TypedArgs::parse(&self.root, args, self.options.long_shorthand);
        let context = Context::new(typed.current.as_str()).with_args(typed.positional.clone());

        let action = if uid == UID_TRAVERSE {
            self.traverse(&typed)
        } else {
            let parsed: Uid = uid
                .parse()
                .with_context(|| format!("Could not route completion request '{}'", uid))?;
            let command = uid::find(&self.root, &parsed)?;
            match parsed.target {
                Target::Command => {
                    // Prefer the walked command, its supplied flags are marked.
                    let command = if typed.path == parsed.path {
                        &typed.command
                    } else {
                        command
                    };
                    self.command_action(command, &typed.current)
                }
                Target::Flag(_) | Target::Positional(_) => self
                    .actions
                    .get(uid)
                    .cloned()
                    .ok_or_else(|| anyhow!("No action registered for UID '{}'", uid))?,
            }
        };

        Ok(action.invoke(&context)?)
    }

    /// Derives the action from the typed arguments alone.
    fn traverse(&self, typed: &TypedArgs) -> Action {
        if let Some(flag) = &typed.pending_flag {
            log::debug!("Completing value of flag '{}'", flag);
            return self.registered(Uid::flag(&typed.path, flag));
        }

        if !typed.flags_terminated {
            if let Some((flag, _)) = typed
                .current
                .strip_prefix("--")
                .and_then(|long| long.split_once('='))
            {
                return self.inline_flag_value(typed, flag);
            }
            if typed.current.starts_with('-') {
                return action_flags(&typed.command, &self.options);
            }
        }

        let position = typed.positional.len();
        let positional = self.actions.get(&Uid::positional(&typed.path, position).to_string());
        let has_subcommands = typed.command.children.iter().any(|c| !c.hidden);
        match (position, positional) {
            (0, Some(action)) if has_subcommands => {
                Action::batch(vec![action_subcommands(&typed.command), action.clone()])
            }
            (_, Some(action)) => action.clone(),
            (0, None) => action_subcommands(&typed.command),
            _ => Action::default(),
        }
    }

    /// Completes `--flag=value` by narrowing the context to the value.
    fn inline_flag_value(&self, typed: &TypedArgs, flag: &str) -> Action {
        let action = self.registered(Uid::flag(&typed.path, flag));
        let prefix = format!("--{}=", flag);
        Action::callback(move |c| {
            let value = c.callback_value.strip_prefix(&prefix).unwrap_or_default();
            let narrowed = c.narrowed(value, Vec::new());
            Ok(action.invoke(&narrowed)?.prefix(&prefix).into_action())
        })
    }

    fn registered(&self, uid: Uid) -> Action {
        self.actions
            .get(&uid.to_string())
            .cloned()
            .unwrap_or_default()
    }

    fn command_action(&self, command: &Command, current: &str) -> Action {
        if current.starts_with('-') {
            action_flags(command, &self.options)
        } else {
            action_subcommands(command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{multi_parts::multi_parts, uid::uid_flag},
        models::{Flag, RawValue},
    };

    // --- Helper to create a Vec<String> from &str slices ---
    fn to_cli_params(params: &[&str]) -> Vec<String> {
        params.iter().map(|s| s.to_string()).collect()
    }

    fn registry() -> Registry {
        let root = Command::new("example")
            .with_subcommand(
                Command::new("action")
                    .with_alias("alias")
                    .with_short("action example")
                    .with_flag(Flag::string("values").with_shorthand('v').with_usage("values flag"))
                    .with_flag(Flag::bool("bool").with_shorthand('b').with_usage("bool flag")),
            )
            .with_subcommand(Command::new("flag").with_short("flag example"));
        let mut registry = Registry::new(root);
        registry
            .flag_completion(
                &["example", "action"],
                ActionMap::from([(
                    "values".to_string(),
                    Action::values(["values", "example"]),
                )]),
            )
            .unwrap();
        registry
            .positional_completion(
                &["example", "action"],
                vec![
                    Action::values(["positional1", "p1"]),
                    multi_parts("=", |c| {
                        Ok(match c.parts.len() {
                            0 => Action::values(["key1=", "key2="]),
                            _ => Action::values(["val1", "val2"]),
                        })
                    }),
                ],
            )
            .unwrap();
        registry
    }

    fn values(invoked: &InvokedAction) -> Vec<&str> {
        invoked.raw_values.iter().map(|v| v.value.as_str()).collect()
    }

    #[test]
    fn test_registering_unknown_flag_fails() {
        let mut registry = registry();
        let result = registry.flag_completion(
            &["example", "action"],
            ActionMap::from([("missing".to_string(), Action::default())]),
        );
        assert!(matches!(result, Err(uid::UidError::FlagNotFound { .. })));
    }

    #[test]
    fn test_registering_on_unaddressable_command_fails() {
        let root = Command::new("example").with_subcommand(
            Command::new("cmd_").with_subcommand(
                Command::new("child").with_flag(Flag::bool("force")),
            ),
        );
        let mut registry = Registry::new(root);
        let positional = registry.positional_completion(
            &["example", "cmd_", "child"],
            vec![Action::values(["a"])],
        );
        assert_eq!(
            positional,
            Err(uid::UidError::UnaddressableName("cmd_".to_string()))
        );
        let flag = registry.flag_completion(
            &["example", "cmd_", "child"],
            ActionMap::from([("force".to_string(), Action::default())]),
        );
        assert!(matches!(flag, Err(uid::UidError::UnaddressableName(_))));
        assert!(registry.action("_example__cmd___child#0").is_none());
    }

    #[test]
    fn test_registered_under_uid() {
        let registry = registry();
        assert!(registry.action(&uid_flag(&["example", "action"], "values")).is_some());
        assert!(registry.action("_example__action#1").is_some());
        assert!(registry.action("_example__action#2").is_none());
    }

    #[test]
    fn test_traverse_subcommands() {
        let invoked = registry().resolve("_", &to_cli_params(&[""])).unwrap();
        assert_eq!(
            invoked.raw_values,
            vec![
                RawValue::new("action", "action example"),
                RawValue::new("alias", "action example"),
                RawValue::new("flag", "flag example"),
            ]
        );
    }

    #[test]
    fn test_traverse_flag_value() {
        let invoked = registry()
            .resolve("_", &to_cli_params(&["action", "--values", ""]))
            .unwrap();
        assert_eq!(values(&invoked), vec!["values", "example"]);

        let shorthand = registry()
            .resolve("_", &to_cli_params(&["action", "-bv", ""]))
            .unwrap();
        assert_eq!(values(&shorthand), vec!["values", "example"]);
    }

    #[test]
    fn test_traverse_inline_flag_value() {
        let invoked = registry()
            .resolve("_", &to_cli_params(&["action", "--values=ex"]))
            .unwrap();
        assert_eq!(values(&invoked), vec!["--values=values", "--values=example"]);
    }

    #[test]
    fn test_traverse_flags_skip_supplied() {
        let invoked = registry()
            .resolve("_", &to_cli_params(&["action", "--bool", "--"]))
            .unwrap();
        assert_eq!(values(&invoked), vec!["--values", "-v"]);
    }

    #[test]
    fn test_traverse_positionals() {
        let first = registry()
            .resolve("_", &to_cli_params(&["action", ""]))
            .unwrap();
        assert_eq!(values(&first), vec!["positional1", "p1"]);

        let second = registry()
            .resolve("_", &to_cli_params(&["action", "p1", "key1=v"]))
            .unwrap();
        assert_eq!(values(&second), vec!["key1=val1", "key1=val2"]);
        assert!(second.nospace);

        let third = registry()
            .resolve("_", &to_cli_params(&["action", "p1", "k=v", ""]))
            .unwrap();
        assert!(third.raw_values.is_empty());
    }

    #[test]
    fn test_explicit_uids() {
        let registry = registry();
        let flag = registry
            .resolve("_example__action##values", &to_cli_params(&["action", "--values", ""]))
            .unwrap();
        assert_eq!(values(&flag), vec!["values", "example"]);

        let command = registry
            .resolve("_example__action", &to_cli_params(&["action", "-"]))
            .unwrap();
        assert_eq!(values(&command), vec!["--values", "-v", "--bool", "-b"]);
    }

    #[test]
    fn test_routing_errors_are_fatal() {
        let registry = registry();
        assert!(registry.resolve("bogus", &to_cli_params(&[""])).is_err());
        assert!(registry.resolve("_example__missing", &to_cli_params(&[""])).is_err());
        assert!(registry.resolve("_example__action#5", &to_cli_params(&[""])).is_err());
    }

    #[test]
    fn test_complete_formats_for_shell() {
        let registry = registry();
        let output = registry
            .complete("fish", "_", &to_cli_params(&["action", "--values", ""]))
            .unwrap();
        assert_eq!(output, "values\nexample");
        assert!(registry.complete("tcsh", "_", &to_cli_params(&[""])).is_err());
    }
}
