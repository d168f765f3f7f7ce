// src/core/action.rs

//! # Actions
//!
//! An [`Action`] is a lazy description of how to produce completion
//! candidates: either a fixed batch of [`RawValue`]s or a callback that
//! receives the request [`Context`] and returns another `Action`.
//!
//! [`Action::invoke`] resolves the callbacks with an iterative trampoline
//! bounded by [`MAX_CALLBACK_DEPTH`], accumulating the `nospace` and
//! `skipcache` modifiers of every action on the chain.

use crate::{
    constants::{MAX_CALLBACK_DEPTH, MESSAGE_MARKER},
    core::invoked::InvokedAction,
    models::{Context, RawValue},
};
use regex::Regex;
use std::{fmt, fs, path::PathBuf, sync::Arc};
use thiserror::Error;

/// Fatal configuration errors raised while resolving an action.
///
/// Environment failures (unreadable directories, failing commands) are never
/// reported here; they become message candidates instead.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// More callbacks were unwrapped than the configured bound.
    #[error("Callback chain exceeded the maximum depth of {0}. Check for self-referencing callbacks.")]
    CallbackDepthExceeded(usize),
    /// A suppress pattern is not a valid regular expression.
    #[error("Invalid suppress pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why the pattern was rejected.
        #[source]
        source: regex::Error,
    },
}

/// A completion callback, shared between clones of the same action.
pub type Callback = Arc<dyn Fn(&Context) -> Result<Action, CompletionError> + Send + Sync>;

#[derive(Clone)]
enum Source {
    Static(Vec<RawValue>),
    Dynamic(Callback),
}

/// A composable, possibly lazy source of completion candidates.
#[derive(Clone)]
pub struct Action {
    source: Source,
    nospace: bool,
    skipcache: bool,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Action");
        match &self.source {
            Source::Static(values) => debug.field("static", values),
            Source::Dynamic(_) => debug.field("dynamic", &"<callback>"),
        };
        debug
            .field("nospace", &self.nospace)
            .field("skipcache", &self.skipcache)
            .finish()
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::raw_values(Vec::new())
    }
}

impl Action {
    // --- Constructors ---

    /// A fixed batch of candidates.
    pub fn raw_values(values: Vec<RawValue>) -> Self {
        Self {
            source: Source::Static(values),
            nospace: false,
            skipcache: false,
        }
    }

    /// Completes arbitrary keywords.
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::raw_values(
            values
                .into_iter()
                .map(|v| RawValue::new(v, ""))
                .collect(),
        )
    }

    /// Completes keywords paired with a description.
    pub fn values_described<I, V, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (V, D)>,
        V: Into<String>,
        D: Into<String>,
    {
        Self::raw_values(
            pairs
                .into_iter()
                .map(|(v, d)| RawValue::new(v, d))
                .collect(),
        )
    }

    /// Defers candidate generation until the action is invoked.
    pub fn callback<F>(callback: F) -> Self
    where
        F: Fn(&Context) -> Result<Self, CompletionError> + Send + Sync + 'static,
    {
        Self {
            source: Source::Dynamic(Arc::new(callback)),
            nospace: false,
            skipcache: false,
        }
    }

    /// Displays a message where no candidates can be generated.
    ///
    /// Represented as a filler candidate plus a marker candidate carrying the
    /// text as description. Both are prefixed with the callback value so
    /// shells filtering by prefix keep them.
    pub fn message(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::callback(move |c| {
            Ok(InvokedAction::new(
                vec![
                    RawValue::new("", ""),
                    RawValue::new(MESSAGE_MARKER, text.as_str()),
                ],
                false,
                false,
            )
            .prefix(&c.callback_value)
            .into_action()
            .no_space()
            .skip_cache())
        })
    }

    /// Invokes every action and merges the results in order.
    pub fn batch(actions: Vec<Self>) -> Self {
        Self::callback(move |c| {
            let mut merged = InvokedAction::default();
            for action in &actions {
                merged = merged.merge(action.invoke(c)?);
            }
            Ok(merged.into_action())
        })
    }

    // --- Modifiers ---

    /// Do not append a separator after inserting a candidate.
    pub fn no_space(mut self) -> Self {
        self.nospace = true;
        self
    }

    /// Do not cache the result across completion requests.
    pub fn skip_cache(mut self) -> Self {
        self.skipcache = true;
        self
    }

    /// Whether the candidates are known without invoking a callback.
    pub fn is_static(&self) -> bool {
        matches!(self.source, Source::Static(_))
    }

    /// Whether `no_space` was applied to this action.
    pub fn nospace(&self) -> bool {
        self.nospace
    }

    /// Whether `skip_cache` was applied to this action.
    pub fn skipcache(&self) -> bool {
        self.skipcache
    }

    /// Evaluates the action with `dir` as working directory.
    ///
    /// Relative paths resolve against the current context directory. A
    /// missing directory or a file yields a message.
    pub fn chdir(self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self::callback(move |c| {
            let resolved = c.resolve(&dir);
            match fs::metadata(&resolved) {
                Err(e) => return Ok(Self::message(format!("{}: {}", dir.display(), e))),
                Ok(metadata) if !metadata.is_dir() => {
                    return Ok(Self::message(format!(
                        "{} is not a directory",
                        dir.display()
                    )));
                }
                Ok(_) => {}
            }
            let mut narrowed = c.clone();
            narrowed.dir = Some(resolved);
            Ok(self.invoke(&narrowed)?.into_action())
        })
    }

    /// Removes message candidates whose text matches one of the patterns.
    ///
    /// The modifiers of the suppressed message are kept so the result is
    /// still not cached.
    pub fn suppress<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        Self::callback(move |c| {
            let regexes = patterns
                .iter()
                .map(|p| {
                    Regex::new(p).map_err(|source| CompletionError::InvalidPattern {
                        pattern: p.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let invoked = self.invoke(c)?;
            let suppressed: Vec<String> = invoked
                .raw_values
                .iter()
                .filter(|v| v.display.ends_with(MESSAGE_MARKER))
                .filter(|v| regexes.iter().any(|re| re.is_match(&v.description)))
                .filter_map(|v| v.value.strip_suffix(MESSAGE_MARKER).map(str::to_string))
                .collect();
            if suppressed.is_empty() {
                return Ok(invoked.into_action());
            }

            log::debug!("Suppressing {} message(s)", suppressed.len());
            let raw_values = invoked
                .raw_values
                .into_iter()
                .filter(|v| {
                    let is_marker = v
                        .value
                        .strip_suffix(MESSAGE_MARKER)
                        .is_some_and(|prefix| suppressed.iter().any(|s| s == prefix))
                        && v.display.ends_with(MESSAGE_MARKER);
                    let is_filler =
                        v.description.is_empty() && suppressed.iter().any(|s| *s == v.value);
                    !is_marker && !is_filler
                })
                .collect();
            Ok(InvokedAction::new(raw_values, invoked.nospace, invoked.skipcache).into_action())
        })
    }

    // --- Resolution ---

    /// Resolves callbacks until a fixed batch of candidates is reached.
    ///
    /// Every callback on the chain receives the same context. Modifiers set
    /// at any depth are carried to the result. The depth is counted over the
    /// whole request: callbacks invoking other actions (`batch`,
    /// `multi_parts`, `chdir`) continue from their own depth. Unwrapping more
    /// than [`MAX_CALLBACK_DEPTH`] callbacks is a configuration error.
    pub fn invoke(&self, context: &Context) -> Result<InvokedAction, CompletionError> {
        let mut nospace = false;
        let mut skipcache = false;
        let mut depth = context.depth;
        let mut scoped = context.clone();
        let mut current = self.clone();

        loop {
            nospace |= current.nospace;
            skipcache |= current.skipcache;
            match current.source {
                Source::Static(values) => {
                    return Ok(InvokedAction::new(values, nospace, skipcache));
                }
                Source::Dynamic(callback) => {
                    if depth >= MAX_CALLBACK_DEPTH {
                        return Err(CompletionError::CallbackDepthExceeded(MAX_CALLBACK_DEPTH));
                    }
                    depth += 1;
                    scoped.depth = depth;
                    current = callback(&scoped)?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::raw_values_from;

    fn sorted(mut invoked: InvokedAction) -> InvokedAction {
        invoked.raw_values.sort();
        invoked
    }

    #[test]
    fn test_nested_callbacks_resolve_to_values() {
        let action = Action::callback(|_| {
            Ok(Action::callback(|_| {
                Ok(Action::callback(|_| Ok(Action::values(["a", "b", "c"]))))
            }))
        });
        let invoked = action.invoke(&Context::default()).unwrap();
        assert_eq!(invoked.raw_values, raw_values_from(&["a", "b", "c"]));
        assert!(!invoked.nospace);
        assert!(!invoked.skipcache);
    }

    #[test]
    fn test_static_action_is_unchanged_by_context() {
        let action = Action::values_described([("x", "first"), ("y", "second")]);
        let a = action.invoke(&Context::default()).unwrap();
        let b = action
            .invoke(&Context::new("zzz").with_args(vec!["arg".into()]))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.raw_values[1], RawValue::new("y", "second"));
    }

    #[test]
    fn test_modifiers_propagate_from_any_depth() {
        let action = Action::callback(|_| Ok(Action::callback(|_| Ok(Action::values(["a"]).no_space()))));
        assert!(action.invoke(&Context::default()).unwrap().nospace);

        let outer = Action::callback(|_| Ok(Action::values(["a"]))).skip_cache();
        assert!(outer.invoke(&Context::default()).unwrap().skipcache);
    }

    fn endless() -> Action {
        Action::callback(|_| Ok(endless()))
    }

    #[test]
    fn test_self_referencing_callback_hits_depth_limit() {
        let result = endless().invoke(&Context::default());
        assert!(matches!(
            result,
            Err(CompletionError::CallbackDepthExceeded(MAX_CALLBACK_DEPTH))
        ));
    }

    fn endless_batch() -> Action {
        Action::batch(vec![Action::callback(|_| Ok(endless_batch()))])
    }

    #[test]
    fn test_self_referencing_batch_hits_depth_limit() {
        let result = endless_batch().invoke(&Context::default());
        assert!(matches!(
            result,
            Err(CompletionError::CallbackDepthExceeded(MAX_CALLBACK_DEPTH))
        ));
    }

    #[test]
    fn test_depth_is_shared_by_nested_invocations() {
        // Each batch level unwraps two callbacks.
        fn nested(levels: usize) -> Action {
            if levels == 0 {
                return Action::values(["leaf"]);
            }
            Action::batch(vec![Action::callback(move |_| Ok(nested(levels - 1)))])
        }
        let within = nested(MAX_CALLBACK_DEPTH / 2).invoke(&Context::default()).unwrap();
        assert_eq!(within.raw_values, raw_values_from(&["leaf"]));
        assert!(nested(MAX_CALLBACK_DEPTH / 2 + 1)
            .invoke(&Context::default())
            .is_err());
    }

    #[test]
    fn test_skipcache_survives_merge_and_transforms() {
        let action = Action::callback(|c| {
            Ok(Action::values(Vec::<String>::new())
                .invoke(c)?
                .merge(Action::callback(|_| Ok(Action::message("skipcache"))).invoke(c)?)
                .filter(&[""])
                .prefix("")
                .suffix("")
                .into_action())
        });
        assert!(!action.skipcache());
        assert!(action.invoke(&Context::default()).unwrap().skipcache);
    }

    #[test]
    fn test_message_is_prefixed_with_callback_value() {
        let invoked = Action::message("example message")
            .invoke(&Context::new("docs/"))
            .unwrap();
        assert_eq!(
            invoked,
            InvokedAction::new(
                vec![
                    RawValue::new("docs/", ""),
                    RawValue::new("docs/ERR", "example message"),
                ],
                true,
                true,
            )
        );
    }

    #[test]
    fn test_batch_keeps_order() {
        let invoked = Action::batch(vec![
            Action::values(["b", "a"]),
            Action::callback(|_| Ok(Action::values(["c"]))),
        ])
        .invoke(&Context::default())
        .unwrap();
        assert_eq!(invoked.raw_values, raw_values_from(&["b", "a", "c"]));
    }

    #[test]
    fn test_suppressed_message_keeps_modifiers() {
        let invoked = Action::batch(vec![
            Action::message("example message").suppress(["example"]),
            Action::values(["test"]),
        ])
        .invoke(&Context::default())
        .unwrap();
        assert_eq!(
            sorted(invoked),
            InvokedAction::new(raw_values_from(&["test"]), true, true)
        );
    }

    #[test]
    fn test_unmatched_suppress_keeps_message() {
        let invoked = Action::message("example message")
            .suppress(["other"])
            .invoke(&Context::default())
            .unwrap();
        assert_eq!(invoked.raw_values.len(), 2);
    }

    #[test]
    fn test_invalid_suppress_pattern_is_fatal() {
        let result = Action::message("x").suppress(["("]).invoke(&Context::default());
        assert!(matches!(result, Err(CompletionError::InvalidPattern { .. })));
    }

    #[test]
    fn test_chdir_to_missing_directory_is_a_message() {
        let tmp = tempfile::tempdir().unwrap();
        let invoked = Action::values(["x"])
            .chdir("nonexistent")
            .invoke(&Context::default().with_dir(tmp.path()))
            .unwrap();
        assert!(invoked.skipcache);
        assert!(invoked.nospace);
        assert!(invoked.raw_values[1].description.starts_with("nonexistent: "));
    }

    #[test]
    fn test_chdir_sets_context_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let action = Action::callback(|c| {
            let dir = c.dir.clone().unwrap_or_default();
            Ok(Action::values([dir.file_name().unwrap().to_string_lossy().to_string()]))
        })
        .chdir("sub");
        let invoked = action
            .invoke(&Context::default().with_dir(tmp.path()))
            .unwrap();
        assert_eq!(invoked.raw_values, raw_values_from(&["sub"]));
    }
}
