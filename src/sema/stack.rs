//! Stack growth for the recursive walk.
//!
//! Generated Nix files can nest far deeper than a thread stack allows
//! (long `++` chains, towers of parentheses). Every recursive entry point of
//! the pass goes through [`ensure_sufficient_stack`].

/// Grow once less than this much stack is left.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, switching to a fresh stack segment first if the current one is
/// nearly exhausted.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
