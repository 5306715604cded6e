/*!
Tokenization of the raw command line against a [`Schema`]. The schema
decides, option by option, whether the following argument is a value: the
same command line can produce a different [`ArgumentMap`] once the schema has
grown, which is why the resolver tokenizes again after every pass.
 */

use std::{collections::BTreeMap, str};

use causal_args_parser::{Arg, ArgAccess, ArgumentsParser, Visitor};

use crate::{
    descriptor::{Arity, OptionDescriptor, Schema},
    errors::ResolveError,
};

/**
The options found on the command line. Options declared by the schema are
keyed by their canonical name; an option present without a value maps to
[`None`]. Options the schema doesn't know about are kept separately, under
the name they were given.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentMap {
    values: BTreeMap<String, Option<String>>,
    unrecognized: BTreeMap<String, Option<String>>,
}

impl ArgumentMap {
    /// Look up a declared option. The outer [`Option`] is presence, the
    /// inner one is the value.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.values
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_deref())
    }

    /// The value of a declared option, if it was given with one
    #[inline]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).flatten()
    }

    /// True if a declared option was present, with or without a value
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// True if the option appeared at all, declared or not
    pub fn mentions(&self, name: &str) -> bool {
        self.contains(name)
            || self
                .unrecognized
                .keys()
                .any(|key| key.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Options that weren't part of the schema
    pub fn unrecognized(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.unrecognized
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Number of distinct options found, declared or not
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() + self.unrecognized.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.unrecognized.is_empty()
    }
}

fn lossy(arg: Arg<'_>) -> String {
    String::from_utf8_lossy(arg.bytes()).into_owned()
}

struct Collector<'s> {
    schema: &'s Schema,
    lenient: bool,
    map: ArgumentMap,

    /// The most recent option, for tying stray arguments to it
    last: Option<String>,
}

impl Collector<'_> {
    fn text(&self, option: &str, arg: Arg<'_>) -> Result<String, ResolveError> {
        match arg.as_str() {
            Ok(text) => Ok(text.to_owned()),
            Err(_) if self.lenient => Ok(lossy(arg)),
            Err(err) => Err(ResolveError::MalformedValue {
                option: option.to_owned(),
                value: lossy(arg),
                message: err.to_string(),
            }),
        }
    }

    fn record(
        &mut self,
        descriptor: &OptionDescriptor,
        value: Option<String>,
    ) -> Result<(), ResolveError> {
        let name = descriptor.name();
        self.last = Some(name.to_owned());

        match self.map.values.insert(name.to_owned(), value) {
            Some(_) if !self.lenient => Err(ResolveError::RepeatedOption {
                option: name.to_owned(),
            }),
            _ => Ok(()),
        }
    }

    /// Undeclared names are keyed by their first spelling, ignoring case
    fn unrecognized(&mut self, name: String, value: Option<String>) -> Result<(), ResolveError> {
        let existing = self
            .map
            .unrecognized
            .keys()
            .find(|key| key.eq_ignore_ascii_case(&name))
            .cloned();

        match existing {
            Some(key) if !self.lenient => Err(ResolveError::RepeatedOption { option: key }),
            Some(key) => {
                self.last = Some(key.clone());
                self.map.unrecognized.insert(key, value);
                Ok(())
            }
            None => {
                self.last = Some(name.clone());
                self.map.unrecognized.insert(name, value);
                Ok(())
            }
        }
    }
}

impl<'arg> Visitor<'arg> for &mut Collector<'_> {
    type Value = Result<(), ResolveError>;

    fn visit_positional(self, argument: Arg<'arg>) -> Self::Value {
        match self.lenient {
            true => Ok(()),
            false => Err(ResolveError::UnexpectedArgument {
                argument: lossy(argument),
                after: self.last.clone(),
            }),
        }
    }

    fn visit_long_option(self, option: Arg<'arg>, argument: Arg<'arg>) -> Self::Value {
        let name = lossy(option);
        let schema = self.schema;

        match schema.get(&name) {
            Some(descriptor) => {
                let value = self.text(descriptor.name(), argument)?;

                match descriptor.arity() {
                    Arity::Flag if self.lenient => self.record(descriptor, None),
                    Arity::Flag => Err(ResolveError::MalformedValue {
                        option: descriptor.name().to_owned(),
                        value,
                        message: "this option doesn't take a value".to_owned(),
                    }),
                    Arity::Value | Arity::OptionalValue => self.record(descriptor, Some(value)),
                }
            }
            None => {
                let value = lossy(argument);
                self.unrecognized(name, Some(value))
            }
        }
    }

    fn visit_long(self, option: Arg<'arg>, arg: impl ArgAccess<'arg>) -> Self::Value {
        let name = lossy(option);
        let schema = self.schema;

        match schema.get(&name) {
            Some(descriptor) => match descriptor.arity() {
                Arity::Flag => self.record(descriptor, None),
                Arity::Value | Arity::OptionalValue => {
                    let value = arg
                        .take()
                        .map(|value| self.text(descriptor.name(), value))
                        .transpose()?;

                    self.record(descriptor, value)
                }
            },
            // Assume that the following argument belongs to the unknown
            // option, so it isn't reported as stray
            None => {
                let value = arg.take().map(lossy);
                self.unrecognized(name, value)
            }
        }
    }
}

fn collect<T: AsRef<[u8]>>(
    tokens: &[T],
    schema: &Schema,
    lenient: bool,
) -> Result<ArgumentMap, ResolveError> {
    let mut parser = ArgumentsParser::new(tokens.iter().map(|token| token.as_ref()));
    let mut collector = Collector {
        schema,
        lenient,
        map: ArgumentMap::default(),
        last: None,
    };

    while let Some(result) = parser.next_arg(&mut collector) {
        result?;
    }

    tracing::trace!(
        options = collector.map.values.len(),
        unrecognized = collector.map.unrecognized.len(),
        lenient,
        "tokenized arguments"
    );

    Ok(collector.map)
}

/**
Build an [`ArgumentMap`] from the raw arguments (excluding the program name).

Fails on stray arguments, on repeated options, on a value given with `=` to
a flag, and on values that aren't UTF-8. Options absent from the schema are
never an error here.
 */
pub fn tokenize<T: AsRef<[u8]>>(tokens: &[T], schema: &Schema) -> Result<ArgumentMap, ResolveError> {
    collect(tokens, schema, false)
}

/// Like [`tokenize`], but never fails: stray arguments are skipped and the
/// last instance of a repeated option wins.
pub fn tokenize_lenient<T: AsRef<[u8]>>(tokens: &[T], schema: &Schema) -> ArgumentMap {
    collect(tokens, schema, true).unwrap_or_default()
}
