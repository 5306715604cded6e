/*!
Option descriptors and schemas. A descriptor is the metadata for a single
`--option`; a [`Schema`] is the ordered set of descriptors that is accepted
at some point of a resolution run.
 */

use std::{borrow::Cow, fmt, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    Mandatory,
}

/// Whether an option takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Presence flag, never takes a value (`--no-header`)
    Flag,

    /// Takes the following argument as its value (`--algorithm fges`)
    Value,

    /// May be followed by a value; presence alone is meaningful
    /// (`--verbose` or `--verbose false`)
    OptionalValue,
}

/// The declared type of an option's value. Numeric bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueType {
    Boolean,
    Integer { min: i64, max: i64 },
    Double { min: f64, max: f64 },
    String,
}

impl ValueType {
    /// The placeholder shown in usage messages when a descriptor doesn't
    /// provide its own.
    #[must_use]
    pub const fn placeholder(&self) -> &'static str {
        match self {
            ValueType::Boolean => "BOOLEAN",
            ValueType::Integer { .. } => "INTEGER",
            ValueType::Double { .. } => "DOUBLE",
            ValueType::String => "STRING",
        }
    }
}

/**
Metadata describing a single command-line option. Descriptors are immutable
once they are registered; the resolver derives modified copies (for instance
with [`promoted`][OptionDescriptor::promoted]) rather than changing shared
ones.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    name: Cow<'static, str>,
    arity: Arity,
    requirement: Requirement,
    description: Cow<'static, str>,
    value: ValueType,
    placeholder: Option<&'static str>,
}

impl OptionDescriptor {
    /// A presence flag
    pub fn flag(
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: name.into(),
            arity: Arity::Flag,
            requirement: Requirement::Optional,
            description: description.into(),
            value: ValueType::Boolean,
            placeholder: None,
        }
    }

    /// An option that takes a value of the given type
    pub fn value(
        name: impl Into<Cow<'static, str>>,
        value: ValueType,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        let arity = match value {
            ValueType::Boolean => Arity::OptionalValue,
            _ => Arity::Value,
        };

        Self {
            name: name.into(),
            arity,
            requirement: Requirement::Optional,
            description: description.into(),
            value,
            placeholder: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Mandatory;
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    /// A mandatory copy of this descriptor, used when an earlier value makes
    /// an otherwise optional option necessary.
    #[must_use]
    pub fn promoted(&self) -> Self {
        self.clone().required()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn arity(&self) -> Arity {
        self.arity
    }

    #[inline]
    pub fn takes_value(&self) -> bool {
        !matches!(self.arity, Arity::Flag)
    }

    #[inline]
    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Mandatory
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn value_type(&self) -> &ValueType {
        &self.value
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder.unwrap_or_else(|| self.value.placeholder())
    }

    /// Case-insensitive name comparison
    #[inline]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}", self.name)
    }
}

/**
An ordered set of descriptors, keyed case-insensitively by name. A schema
only ever grows: admitting a descriptor whose name is already present
replaces it in place, so the set of names is never reduced.
 */
#[derive(Debug, Clone, Default)]
pub struct Schema {
    descriptors: Vec<Arc<OptionDescriptor>>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<OptionDescriptor>> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.is_named(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Add a descriptor to the schema. Returns true if the name wasn't
    /// present before.
    pub fn admit(&mut self, descriptor: Arc<OptionDescriptor>) -> bool {
        match self
            .descriptors
            .iter_mut()
            .find(|existing| existing.is_named(descriptor.name()))
        {
            Some(existing) => {
                *existing = descriptor;
                false
            }
            None => {
                self.descriptors.push(descriptor);
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<OptionDescriptor>> {
        self.descriptors.iter()
    }

    pub fn required(&self) -> impl Iterator<Item = &Arc<OptionDescriptor>> {
        self.iter().filter(|descriptor| descriptor.is_required())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|descriptor| descriptor.name())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl FromIterator<Arc<OptionDescriptor>> for Schema {
    fn from_iter<T: IntoIterator<Item = Arc<OptionDescriptor>>>(iter: T) -> Self {
        let mut schema = Schema::new();
        iter.into_iter().for_each(|descriptor| {
            schema.admit(descriptor);
        });
        schema
    }
}
