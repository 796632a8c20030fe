/// `scripting/stack.rs` — scoped operand-stack balance checks
///
/// `StackGuard` records the depth of a `StackDepth` target when created and
/// re-reads it when dropped. A mismatch is reported through
/// `StackDepth::report_imbalance`; the stack itself is never touched.
use std::ops::{Deref, DerefMut};

use super::error::{Diagnostic, ErrorKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Guarded stack leak: [{label}] exit={exit} enter={enter}")]
pub struct StackImbalance {
    pub label: &'static str,
    pub enter: usize,
    pub exit: usize,
}

impl StackImbalance {
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic {
            kind: ErrorKind::StackImbalance,
            message: self.to_string(),
            line: None,
        }
    }
}

/// Anything with an operand stack whose depth can be observed.
pub trait StackDepth {
    fn stack_depth(&self) -> usize;

    fn report_imbalance(&mut self, imbalance: StackImbalance) {
        log::warn!("{imbalance}");
    }
}

/// Gives access to the guarded target through `Deref`/`DerefMut`, so the
/// check runs on every exit path of the scope that owns the guard.
pub struct StackGuard<'a, S: StackDepth + ?Sized> {
    label: &'static str,
    enter: usize,
    target: &'a mut S,
}

impl<'a, S: StackDepth + ?Sized> StackGuard<'a, S> {
    pub fn new(label: &'static str, target: &'a mut S) -> Self {
        let enter = target.stack_depth();
        Self {
            label,
            enter,
            target,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn enter_depth(&self) -> usize {
        self.enter
    }
}

impl<S: StackDepth + ?Sized> Deref for StackGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.target
    }
}

impl<S: StackDepth + ?Sized> DerefMut for StackGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.target
    }
}

impl<S: StackDepth + ?Sized> Drop for StackGuard<'_, S> {
    fn drop(&mut self) {
        let exit = self.target.stack_depth();
        if exit != self.enter {
            self.target.report_imbalance(StackImbalance {
                label: self.label,
                enter: self.enter,
                exit,
            });
        }
    }
}
