/*!
Resolution errors. Every [`ResolveError`] names the option responsible for
it, so that a [`Failure`] can be rendered as targeted help.
 */

use std::{fmt::Display, path::PathBuf, sync::Arc};

use joinery::JoinableIterator;
use lazy_format::lazy_format;

use crate::{
    arguments::ArgumentMap,
    catalog::{DataType, SelectorKind},
    descriptor::{OptionDescriptor, Schema},
    help::Projection,
    parameter::{Bound, ValueError},
    resolver::Stage,
};

fn choices(expected: &[String]) -> impl Display + '_ {
    let list = expected.iter().join_with(", ");

    lazy_format!(match (expected.is_empty()) {
        true => "(none available)",
        false => "{list}",
    })
}

fn unexpected<'a>(argument: &'a str, after: &'a Option<String>) -> impl Display + 'a {
    lazy_format!(match (after) {
        Some(option) => "unexpected argument {argument:?} after --{option}",
        None => "unexpected argument {argument:?}",
    })
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("--{option} requires a value")]
    MissingRequiredValue { option: String },

    #[error("--{option}: unknown {kind} {value:?}; expected one of: {}", choices(.expected))]
    UnknownSelector {
        option: String,
        kind: SelectorKind,
        value: String,
        expected: Vec<String>,
    },

    #[error(
        "--{option}: {kind} {value:?} can't be used with {data_type} data; expected one of: {}",
        choices(.expected)
    )]
    InapplicableSelector {
        option: String,
        kind: SelectorKind,
        value: String,
        data_type: DataType,
        expected: Vec<String>,
    },

    #[error("--{option}: {value} is out of range: {bound}")]
    OutOfRangeValue {
        option: String,
        value: String,
        bound: Bound,
    },

    #[error("--{option}: failed to parse {value:?}: {message}")]
    MalformedValue {
        option: String,
        value: String,
        message: String,
    },

    #[error("--{option} conflicts with --{other}: {reason}")]
    ConflictingOptions {
        option: String,
        other: String,
        reason: String,
    },

    #[error("--{option}: {}: {reason}", .path.display())]
    FileNotFound {
        option: String,
        path: PathBuf,
        reason: String,
    },

    #[error("--{option} appeared more than once")]
    RepeatedOption { option: String },

    #[error("{}", unexpected(.argument, .after))]
    UnexpectedArgument {
        argument: String,
        after: Option<String>,
    },

    #[error("unrecognized option --{option}")]
    UnknownOption { option: String },

    #[error("--{option}: {command} reads parameter {name:?}, which isn't declared")]
    UndeclaredParameter {
        option: String,
        command: String,
        name: String,
    },
}

impl ResolveError {
    /// Attach an option name to an error from value conversion
    pub fn from_value(option: &str, error: ValueError) -> Self {
        let option = option.to_owned();

        match error {
            ValueError::NeedsArgument => Self::MissingRequiredValue { option },
            ValueError::Parse { arg, message } => Self::MalformedValue {
                option,
                value: arg,
                message,
            },
            ValueError::OutOfRange { arg, bound } => Self::OutOfRangeValue {
                option,
                value: arg,
                bound,
            },
        }
    }

    /// The name of the option responsible for this error, if any
    pub fn option(&self) -> Option<&str> {
        match self {
            ResolveError::MissingRequiredValue { option }
            | ResolveError::UnknownSelector { option, .. }
            | ResolveError::InapplicableSelector { option, .. }
            | ResolveError::OutOfRangeValue { option, .. }
            | ResolveError::MalformedValue { option, .. }
            | ResolveError::ConflictingOptions { option, .. }
            | ResolveError::FileNotFound { option, .. }
            | ResolveError::RepeatedOption { option }
            | ResolveError::UnknownOption { option }
            | ResolveError::UndeclaredParameter { option, .. } => Some(option),
            ResolveError::UnexpectedArgument { after, .. } => after.as_deref(),
        }
    }
}

/**
A failed resolution run: the error that stopped it, along with the state of
the run at that point. The schema is the one that was active when the error
was found, so help rendered from a failure only covers the options that are
relevant to the choices that were already made.
 */
#[derive(Debug, Clone)]
pub struct Failure {
    pub error: ResolveError,

    /// The last stage that was reached successfully
    pub stage: Stage,

    pub schema: Schema,

    /// The descriptors responsible for the error
    pub invalid: Vec<Arc<OptionDescriptor>>,

    /// The arguments, tokenized leniently against `schema`
    pub arguments: ArgumentMap,
}

impl Failure {
    /// The help projection scoped to this failure
    pub fn projection(&self) -> Projection {
        Projection::from_arguments(&self.arguments, &self.schema, &self.invalid)
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_errors_list_choices() {
        let error = ResolveError::InapplicableSelector {
            option: "test".into(),
            kind: SelectorKind::Test,
            value: "fisher-z-test".into(),
            data_type: DataType::Discrete,
            expected: vec!["chi-square-test".into(), "g-square-test".into()],
        };

        assert_eq!(
            error.to_string(),
            "--test: independence test \"fisher-z-test\" can't be used with discrete data; \
            expected one of: chi-square-test, g-square-test"
        );
        assert_eq!(error.option(), Some("test"));
    }

    #[test]
    fn stray_arguments_refer_to_the_previous_option() {
        let error = ResolveError::UnexpectedArgument {
            argument: "b.txt".into(),
            after: Some("dataset".into()),
        };

        assert_eq!(
            error.to_string(),
            "unexpected argument \"b.txt\" after --dataset"
        );
        assert_eq!(error.option(), Some("dataset"));

        let error = ResolveError::UnexpectedArgument {
            argument: "fges".into(),
            after: None,
        };
        assert_eq!(error.option(), None);
    }

    #[test]
    fn value_errors_become_option_errors() {
        let error = ResolveError::from_value(
            "penalty-discount",
            ValueError::OutOfRange {
                arg: "1000000".into(),
                bound: Bound::Maximum("100".into()),
            },
        );

        assert_eq!(
            error.to_string(),
            "--penalty-discount: 1000000 is out of range: must be at most 100"
        );
    }
}
