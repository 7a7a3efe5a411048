//! Pipe stage evaluation.
//!
//! A pipe chain runs its stages left to right, threading each stage's result
//! into the next as `previous`. The seed stage is `first`. Each stage looks up
//! a [`PipeHandler`] by name; the handler decides how often to evaluate the
//! stage body and with which `$` bindings.

use std::sync::Arc;

use sluice_foundation::{Result, Value};

use crate::compiler::{Program, Stage};
use crate::vm::{Context, Vm};

/// Behaviour of one kind of pipe stage.
pub trait PipeHandler: Send + Sync {
    /// Produces this stage's result from the previous stage's result.
    ///
    /// # Errors
    /// Returns any error raised while evaluating the stage body.
    fn apply(&self, stage: &mut StageEvaluator<'_>, previous: Value) -> Result<Value>;
}

/// Evaluates one stage body under scoped bindings.
pub struct StageEvaluator<'a> {
    pub(crate) vm: &'a mut Vm,
    pub(crate) program: &'a Program,
    pub(crate) stage: &'a Stage,
    pub(crate) context: &'a Context,
}

impl StageEvaluator<'_> {
    /// Runs the stage body once with `bindings` in scope.
    ///
    /// Only names the body refers to are installed. The binding frame is
    /// removed again whether or not evaluation succeeds.
    ///
    /// # Errors
    /// Returns any error raised by the stage body.
    pub fn eval(&mut self, bindings: &[(&str, Value)]) -> Result<Value> {
        let frame: Vec<(Arc<str>, Value)> = bindings
            .iter()
            .filter_map(|(name, value)| {
                self.stage
                    .bindings
                    .iter()
                    .find(|b| &***b == *name)
                    .map(|b| (Arc::clone(b), value.clone()))
            })
            .collect();

        self.vm.frames.push(frame);
        let result = self
            .vm
            .execute(self.program, &self.stage.code, self.context);
        self.vm.frames.pop();
        result
    }

    /// Returns the ambient context.
    #[must_use]
    pub fn context(&self) -> &Context {
        self.context
    }

    /// Returns the stage's handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.stage.name
    }

    /// Returns true if the stage body refers to `name`.
    #[must_use]
    pub fn references(&self, name: &str) -> bool {
        self.stage.references(name)
    }
}

/// Treats an array as its elements and anything else as a single element.
fn elements(value: Value) -> Vec<Value> {
    if let Some(items) = value.as_array() {
        return items.iter().cloned().collect();
    }
    vec![value]
}

/// `first`: evaluates the seed expression.
pub struct First;

impl PipeHandler for First {
    fn apply(&self, stage: &mut StageEvaluator<'_>, _previous: Value) -> Result<Value> {
        stage.eval(&[])
    }
}

/// `pipe`: evaluates once with `$1` bound to the previous result.
pub struct Pipe;

impl PipeHandler for Pipe {
    fn apply(&self, stage: &mut StageEvaluator<'_>, previous: Value) -> Result<Value> {
        stage.eval(&[("$1", previous)])
    }
}

/// `map`: evaluates per element with `$item` bound and collects the results.
pub struct Map;

impl PipeHandler for Map {
    fn apply(&self, stage: &mut StageEvaluator<'_>, previous: Value) -> Result<Value> {
        let items = elements(previous);
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(stage.eval(&[("$item", item)])?);
        }
        Ok(Value::array(out))
    }
}

/// `filter`: keeps the elements whose predicate is truthy.
pub struct Filter;

impl PipeHandler for Filter {
    fn apply(&self, stage: &mut StageEvaluator<'_>, previous: Value) -> Result<Value> {
        let mut kept = Vec::new();
        for item in elements(previous) {
            if stage.eval(&[("$item", item.clone())])?.is_truthy() {
                kept.push(item);
            }
        }
        Ok(Value::array(kept))
    }
}

/// `find`: returns the first element whose predicate is truthy, or null.
pub struct Find;

impl PipeHandler for Find {
    fn apply(&self, stage: &mut StageEvaluator<'_>, previous: Value) -> Result<Value> {
        for item in elements(previous) {
            if stage.eval(&[("$item", item.clone())])?.is_truthy() {
                return Ok(item);
            }
        }
        Ok(Value::Null)
    }
}

/// `reduce`: folds elements into `$acc`, which starts as null.
pub struct Reduce;

impl PipeHandler for Reduce {
    fn apply(&self, stage: &mut StageEvaluator<'_>, previous: Value) -> Result<Value> {
        let mut acc = Value::Null;
        for item in elements(previous) {
            acc = stage.eval(&[("$acc", acc), ("$item", item)])?;
        }
        Ok(acc)
    }
}

/// The built-in handlers with their registered names.
#[must_use]
pub fn builtin_handlers() -> Vec<(&'static str, Arc<dyn PipeHandler>)> {
    fn entry(
        name: &'static str,
        handler: impl PipeHandler + 'static,
    ) -> (&'static str, Arc<dyn PipeHandler>) {
        (name, Arc::new(handler))
    }

    vec![
        entry("first", First),
        entry("pipe", Pipe),
        entry("map", Map),
        entry("filter", Filter),
        entry("find", Find),
        entry("reduce", Reduce),
    ]
}
