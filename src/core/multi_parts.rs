// src/core/multi_parts.rs

use crate::{
    core::action::{Action, CompletionError},
    models::Context,
};

/// Completes one `divider`-separated segment of a compound value.
///
/// The callback sees a narrowed context: `callback_value` holds only the
/// segment being completed and `parts` the segments already typed. Its
/// candidates are prefixed with the already typed portion and `nospace` is
/// forced.
///
/// ```
/// use tabwright::core::{action::Action, multi_parts::multi_parts};
///
/// let action = multi_parts("=", |c| {
///     Ok(match c.parts.len() {
///         0 => Action::values(["key"]),
///         _ => Action::values(["value"]),
///     })
/// });
/// # let _ = action;
/// ```
pub fn multi_parts<F>(divider: impl Into<String>, callback: F) -> Action
where
    F: Fn(&Context) -> Result<Action, CompletionError> + Send + Sync + 'static,
{
    let divider = divider.into();
    Action::callback(move |c| {
        let (prefix, current) = split_typed_prefix(&c.callback_value, &divider);
        let narrowed = c.narrowed(current, typed_parts(prefix, &divider));
        Ok(callback(&narrowed)?
            .invoke(&narrowed)?
            .prefix(prefix)
            .into_action()
            .no_space())
    })
}

/// Splits after the last divider. An empty divider leaves no prefix.
fn split_typed_prefix<'a>(value: &'a str, divider: &str) -> (&'a str, &'a str) {
    if divider.is_empty() {
        return ("", value);
    }
    match value.rfind(divider) {
        Some(index) => value.split_at(index + divider.len()),
        None => ("", value),
    }
}

fn typed_parts(prefix: &str, divider: &str) -> Vec<String> {
    if prefix.is_empty() {
        return Vec::new();
    }
    let mut parts: Vec<String> = prefix.split(divider).map(str::to_string).collect();
    // The prefix ends with the divider.
    parts.pop();
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_split_typed_prefix() {
        assert_eq!(split_typed_prefix("a=b=c", "="), ("a=b=", "c"));
        assert_eq!(split_typed_prefix("abc", "="), ("", "abc"));
        assert_eq!(split_typed_prefix("a::b", "::"), ("a::", "b"));
        assert_eq!(split_typed_prefix("a=b", ""), ("", "a=b"));
    }

    #[test]
    fn test_callback_sees_narrowed_context() {
        let seen: Arc<Mutex<Option<Context>>> = Arc::new(Mutex::new(None));
        let recorder = Arc::clone(&seen);
        let action = multi_parts(":", move |c| {
            *recorder.lock().unwrap() = Some(c.clone());
            Ok(Action::values(["wheel", "users"]))
        });

        let original = Context::new("root:adm:wh").with_args(vec!["chown".into()]);
        let invoked = action.invoke(&original).unwrap();

        let narrowed = seen.lock().unwrap().clone().unwrap();
        assert_eq!(narrowed.callback_value, "wh");
        assert_eq!(narrowed.parts, vec!["root", "adm"]);
        assert_eq!(narrowed.args, vec!["chown"]);
        assert_eq!(original.callback_value, "root:adm:wh");

        assert!(invoked.nospace);
        assert_eq!(
            invoked.raw_values,
            vec![
                RawValue::new("root:adm:wheel", ""),
                RawValue::new("root:adm:users", ""),
            ]
        );
    }

    #[test]
    fn test_empty_divider_keeps_whole_word() {
        let action = multi_parts("", |c| {
            assert!(c.parts.is_empty());
            Ok(Action::values([format!("{}!", c.callback_value)]))
        });
        let invoked = action.invoke(&Context::new("abc")).unwrap();
        assert!(invoked.nospace);
        assert_eq!(invoked.raw_values, vec![RawValue::new("abc!", "")]);
    }

    fn endless_segments() -> Action {
        multi_parts("/", |_| Ok(endless_segments()))
    }

    #[test]
    fn test_self_referencing_callback_hits_depth_limit() {
        let result = endless_segments().invoke(&Context::new("a/b"));
        assert!(matches!(
            result,
            Err(CompletionError::CallbackDepthExceeded(_))
        ));
    }

    #[test]
    fn test_nospace_from_multi_parts_survives_merge() {
        let action = Action::callback(|c| {
            Ok(Action::values(Vec::<String>::new())
                .invoke(c)?
                .merge(multi_parts("", |_| Ok(Action::message("nospace"))).invoke(c)?)
                .filter(&[""])
                .into_action())
        });
        assert!(!action.nospace());
        assert!(action.invoke(&Context::default()).unwrap().nospace);
    }
}
