/*!
Help projection: the options a user still has to deal with, given what they
already supplied. Options that already have a value are left out, except for
invalid ones, which are always shown so the user sees the help text for the
option they got wrong.
 */

use std::sync::Arc;

use crate::{
    arguments::{ArgumentMap, tokenize_lenient},
    descriptor::{Arity, OptionDescriptor, Schema},
};

/// How much help was asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpRequest {
    /// `--help`: only the options relevant to the partial invocation
    Succinct,

    /// `--help-all`: every registered option
    Full,
}

fn is_supplied(arguments: &ArgumentMap, descriptor: &OptionDescriptor) -> bool {
    match descriptor.arity() {
        Arity::Flag | Arity::OptionalValue => arguments.contains(descriptor.name()),
        Arity::Value => arguments.value(descriptor.name()).is_some(),
    }
}

/// A display-ready schema, split into invalid, required and optional options
#[derive(Debug, Clone, Default)]
pub struct Projection {
    invalid: Vec<Arc<OptionDescriptor>>,
    required: Vec<Arc<OptionDescriptor>>,
    optional: Vec<Arc<OptionDescriptor>>,
}

impl Projection {
    /// Project a schema against the raw command line
    pub fn new<T: AsRef<[u8]>>(
        tokens: &[T],
        schema: &Schema,
        invalid: &[Arc<OptionDescriptor>],
    ) -> Self {
        let arguments = tokenize_lenient(tokens, schema);
        Self::from_arguments(&arguments, schema, invalid)
    }

    pub fn from_arguments(
        arguments: &ArgumentMap,
        schema: &Schema,
        invalid: &[Arc<OptionDescriptor>],
    ) -> Self {
        let is_invalid = |name: &str| invalid.iter().any(|bad| bad.is_named(name));

        let (required, optional): (Vec<_>, Vec<_>) = schema
            .iter()
            .filter(|descriptor| {
                !is_invalid(descriptor.name()) && !is_supplied(arguments, descriptor)
            })
            .cloned()
            .partition(|descriptor| descriptor.is_required());

        Self {
            invalid: invalid.to_vec(),
            required,
            optional,
        }
    }

    pub fn invalid(&self) -> &[Arc<OptionDescriptor>] {
        &self.invalid
    }

    pub fn required(&self) -> &[Arc<OptionDescriptor>] {
        &self.required
    }

    pub fn optional(&self) -> &[Arc<OptionDescriptor>] {
        &self.optional
    }

    /// Options that must be fixed or supplied before resolution can succeed
    pub fn still_needed(&self) -> impl Iterator<Item = &Arc<OptionDescriptor>> {
        self.invalid.iter().chain(&self.required)
    }

    pub fn is_satisfied(&self) -> bool {
        self.still_needed().next().is_none()
    }

    /// True if the projection would print nothing
    pub fn is_empty(&self) -> bool {
        self.invalid.is_empty() && self.required.is_empty() && self.optional.is_empty()
    }
}
