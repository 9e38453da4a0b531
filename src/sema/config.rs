//! Analysis options.

use crate::base::Name;

/// Opt-in findings that are not errors in the analysed code.
///
/// Everything is off by default, so a tree without free variables or
/// duplicate keys analyses to an empty diagnostic list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LintOptions {
    /// Unused `let` bindings and formals.
    pub unused_definitions: bool,
    /// `rec` sets whose keys are never referenced.
    pub extra_rec: bool,
    /// `with` expressions that provide no variable.
    pub extra_with: bool,
    /// Variables inside a `with` body that resolve to a binding outside it.
    pub escaping_with: bool,
    /// `inherit;` with no names.
    pub empty_inherit: bool,
    /// Sets that mix static and dynamic keys.
    pub dynamic_key_collision: bool,
    /// Bindings that shadow a global primop or constant.
    pub builtin_override: bool,
    /// `builtins.map` and `inherit (builtins) map;` where plain `map` works.
    pub removable_prefix: bool,
}

impl LintOptions {
    /// Every lint enabled.
    pub fn all() -> Self {
        Self {
            unused_definitions: true,
            extra_rec: true,
            extra_with: true,
            escaping_with: true,
            empty_inherit: true,
            dynamic_key_collision: true,
            builtin_override: true,
            removable_prefix: true,
        }
    }
}

/// Configuration for one Sema pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SemaConfig {
    pub lints: LintOptions,
    /// Names placed in the global frame next to the standard builtins.
    pub extra_builtins: Vec<Name>,
}

impl SemaConfig {
    /// Default configuration with every lint enabled.
    pub fn all_lints() -> Self {
        Self {
            lints: LintOptions::all(),
            ..Self::default()
        }
    }

    /// Add a global name.
    pub fn with_builtin(mut self, name: impl Into<Name>) -> Self {
        self.extra_builtins.push(name.into());
        self
    }
}
