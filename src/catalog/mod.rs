/*!
The command and parameter catalogs that the resolver consults. These are the
seams between argument resolution and the rest of the application: the
resolver never needs a concrete algorithm, only the facts declared here.

[`BuiltinCatalog`] is the catalog shipped with the `causal-cmd` binary.
 */

mod builtin;
mod params;

use std::fmt;

pub use builtin::BuiltinCatalog;

use crate::{descriptor::ValueType, parameter::ParamValue};

/// The kind of data a dataset file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Continuous,
    Discrete,
    Mixed,
    Covariance,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Continuous,
        DataType::Discrete,
        DataType::Mixed,
        DataType::Covariance,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            DataType::Continuous => "continuous",
            DataType::Discrete => "discrete",
            DataType::Mixed => "mixed",
            DataType::Covariance => "covariance",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|data_type| data_type.name().eq_ignore_ascii_case(name))
    }

    /// Tabular data is read row by row from a delimited file; covariance
    /// data is a precomputed matrix.
    #[must_use]
    pub const fn is_tabular(&self) -> bool {
        !matches!(self, DataType::Covariance)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The registries a selector option chooses from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Algorithm,
    Test,
    Score,
    DataType,
    Delimiter,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SelectorKind::Algorithm => "algorithm",
            SelectorKind::Test => "independence test",
            SelectorKind::Score => "score",
            SelectorKind::DataType => "data type",
            SelectorKind::Delimiter => "delimiter",
        })
    }
}

#[derive(Debug, Clone)]
pub struct AlgorithmInfo {
    pub command: &'static str,
    pub description: &'static str,
    pub experimental: bool,
    pub requires_test: bool,
    pub requires_score: bool,
    pub accepts_knowledge: bool,
    pub accepts_multiple_datasets: bool,

    /// Parameters read by the algorithm itself, excluding those of its test
    /// and score
    pub parameters: &'static [&'static str],
}

/// An independence test or a score
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub command: &'static str,
    pub description: &'static str,
    pub experimental: bool,
    pub data_types: &'static [DataType],
    pub parameters: &'static [&'static str],
}

impl MethodInfo {
    #[inline]
    pub fn supports(&self, data_type: DataType) -> bool {
        self.data_types.contains(&data_type)
    }
}

/// A command name with its description, for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSummary {
    pub command: &'static str,
    pub description: &'static str,
}

/// Declared type, default, and inclusive bounds of a tunable parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Boolean { default: bool },
    Integer { default: i64, min: i64, max: i64 },
    Double { default: f64, min: f64, max: f64 },
    String { default: &'static str },
}

#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
}

impl ParamInfo {
    pub fn default_value(&self) -> ParamValue {
        match self.kind {
            ParamKind::Boolean { default } => ParamValue::Boolean(default),
            ParamKind::Integer { default, .. } => ParamValue::Integer(default),
            ParamKind::Double { default, .. } => ParamValue::Double(default),
            ParamKind::String { default } => ParamValue::String(default.to_owned()),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self.kind {
            ParamKind::Boolean { .. } => ValueType::Boolean,
            ParamKind::Integer { min, max, .. } => ValueType::Integer { min, max },
            ParamKind::Double { min, max, .. } => ValueType::Double { min, max },
            ParamKind::String { .. } => ValueType::String,
        }
    }
}

/// Lookup of algorithm, independence test, and score commands. Command
/// names are matched case-insensitively.
pub trait CommandRegistry {
    fn algorithms(&self) -> &[AlgorithmInfo];
    fn tests(&self) -> &[MethodInfo];
    fn scores(&self) -> &[MethodInfo];

    fn algorithm(&self, command: &str) -> Option<&AlgorithmInfo> {
        self.algorithms()
            .iter()
            .find(|algorithm| algorithm.command.eq_ignore_ascii_case(command))
    }

    fn test(&self, command: &str) -> Option<&MethodInfo> {
        find_method(self.tests(), command)
    }

    fn score(&self, command: &str) -> Option<&MethodInfo> {
        find_method(self.scores(), command)
    }

    /// Tests or scores that can be used with the given data type
    fn methods_for(
        &self,
        kind: SelectorKind,
        data_type: DataType,
        include_experimental: bool,
    ) -> Vec<&MethodInfo> {
        let methods: &[MethodInfo] = match kind {
            SelectorKind::Test => self.tests(),
            SelectorKind::Score => self.scores(),
            _ => &[],
        };

        methods
            .iter()
            .filter(|method| include_experimental || !method.experimental)
            .filter(|method| method.supports(data_type))
            .collect()
    }

    /// Every command of the given kind, optionally leaving out the
    /// experimental ones
    fn commands(&self, kind: SelectorKind, include_experimental: bool) -> Vec<CommandSummary> {
        match kind {
            SelectorKind::Algorithm => self
                .algorithms()
                .iter()
                .filter(|algorithm| include_experimental || !algorithm.experimental)
                .map(|algorithm| CommandSummary {
                    command: algorithm.command,
                    description: algorithm.description,
                })
                .collect(),
            SelectorKind::Test | SelectorKind::Score => {
                let methods = match kind {
                    SelectorKind::Test => self.tests(),
                    _ => self.scores(),
                };

                methods
                    .iter()
                    .filter(|method| include_experimental || !method.experimental)
                    .map(|method| CommandSummary {
                        command: method.command,
                        description: method.description,
                    })
                    .collect()
            }
            SelectorKind::DataType | SelectorKind::Delimiter => Vec::new(),
        }
    }
}

fn find_method<'a>(methods: &'a [MethodInfo], command: &str) -> Option<&'a MethodInfo> {
    methods
        .iter()
        .find(|method| method.command.eq_ignore_ascii_case(command))
}

/// Declared tunable parameters, with their types, defaults, and bounds
pub trait ParameterRegistry {
    fn parameters(&self) -> &[ParamInfo];

    fn parameter(&self, name: &str) -> Option<&ParamInfo> {
        self.parameters()
            .iter()
            .find(|parameter| parameter.name.eq_ignore_ascii_case(name))
    }
}

/**
Stands in for instantiating an algorithm with its test and score: all the
resolver needs from such an instance is the transitive set of parameter
names it reads.
 */
pub trait Factory {
    /// Parameters that control resampling, read by every algorithm
    fn bootstrap_parameters(&self) -> &[&'static str];

    /// The algorithm's parameters, then the test's, then the score's, then
    /// the bootstrap parameters, without duplicates.
    fn parameter_names(
        &self,
        algorithm: &AlgorithmInfo,
        test: Option<&MethodInfo>,
        score: Option<&MethodInfo>,
    ) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();

        algorithm
            .parameters
            .iter()
            .chain(test.map_or(&[][..], |test| test.parameters))
            .chain(score.map_or(&[][..], |score| score.parameters))
            .chain(self.bootstrap_parameters())
            .for_each(|&name| {
                if !names.contains(&name) {
                    names.push(name);
                }
            });

        names
    }
}

/// Everything the resolver needs from the rest of the application
pub trait Catalog: CommandRegistry + ParameterRegistry + Factory {}

impl<T> Catalog for T where T: CommandRegistry + ParameterRegistry + Factory {}
