// src/core/invoked.rs

use crate::{core::action::Action, models::RawValue};

/// The resolved result of invoking an [`Action`].
///
/// All operations return a new value. `nospace` and `skipcache` are
/// monotonic: once set by any contributing source they stay set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokedAction {
    /// The resolved candidates, in order.
    pub raw_values: Vec<RawValue>,
    /// No separator is inserted after a candidate.
    pub nospace: bool,
    /// The result must not be cached.
    pub skipcache: bool,
}

impl InvokedAction {
    /// Wraps candidates with their modifiers.
    pub fn new(raw_values: Vec<RawValue>, nospace: bool, skipcache: bool) -> Self {
        Self {
            raw_values,
            nospace,
            skipcache,
        }
    }

    /// Concatenates both batches, `self` first.
    pub fn merge(mut self, other: Self) -> Self {
        self.raw_values.extend(other.raw_values);
        self.nospace |= other.nospace;
        self.skipcache |= other.skipcache;
        self
    }

    /// Drops the candidates whose display is excluded.
    pub fn filter(mut self, excluded: &[&str]) -> Self {
        self.raw_values
            .retain(|v| !excluded.contains(&v.display.as_str()));
        self
    }

    /// Prepends `prefix` to every value and display.
    pub fn prefix(mut self, prefix: &str) -> Self {
        if prefix.is_empty() {
            return self;
        }
        for value in &mut self.raw_values {
            value.value.insert_str(0, prefix);
            value.display.insert_str(0, prefix);
        }
        self
    }

    /// Appends `suffix` to every value and display.
    pub fn suffix(mut self, suffix: &str) -> Self {
        for value in &mut self.raw_values {
            value.value.push_str(suffix);
            value.display.push_str(suffix);
        }
        self
    }

    /// Shows only the last `divider`-separated segment of every value.
    ///
    /// A trailing divider belongs to the last segment (`a/b/` shows `b/`).
    /// Values stay intact and `nospace` is forced since a segment is never a
    /// complete word.
    pub fn to_multi_parts(mut self, divider: &str) -> Self {
        if !divider.is_empty() {
            for value in &mut self.raw_values {
                let trimmed = value.value.strip_suffix(divider).unwrap_or(&value.value);
                if let Some(index) = trimmed.rfind(divider)
                    && let Some(segment) = value.value.get(index + divider.len()..)
                {
                    value.display = segment.to_string();
                }
            }
        }
        self.nospace = true;
        self
    }

    /// Wraps the candidates into a static action keeping the modifiers.
    pub fn into_action(self) -> Action {
        let mut action = Action::raw_values(self.raw_values);
        if self.nospace {
            action = action.no_space();
        }
        if self.skipcache {
            action = action.skip_cache();
        }
        action
    }
}
