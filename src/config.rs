/*!
The output of a successful resolution: a [`ResolvedConfiguration`] with
concrete values for everything the data readers and the search need.
 */

use std::{collections::BTreeMap, fmt, path::PathBuf};

use crate::{catalog::DataType, parameter::ParamValue};

/// Field delimiter of a tabular data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Colon,
    Space,
    Tab,
    Whitespace,
    Semicolon,
    Pipe,
}

impl Delimiter {
    pub const ALL: [Delimiter; 7] = [
        Delimiter::Comma,
        Delimiter::Colon,
        Delimiter::Space,
        Delimiter::Tab,
        Delimiter::Whitespace,
        Delimiter::Semicolon,
        Delimiter::Pipe,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Delimiter::Comma => "comma",
            Delimiter::Colon => "colon",
            Delimiter::Space => "space",
            Delimiter::Tab => "tab",
            Delimiter::Whitespace => "whitespace",
            Delimiter::Semicolon => "semicolon",
            Delimiter::Pipe => "pipe",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|delimiter| delimiter.name().eq_ignore_ascii_case(name))
    }

    /// The delimiting character. Whitespace delimits on any run of spaces
    /// and tabs, and reports a space here.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Colon => ':',
            Delimiter::Space | Delimiter::Whitespace => ' ',
            Delimiter::Tab => '\t',
            Delimiter::Semicolon => ';',
            Delimiter::Pipe => '|',
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the dataset files should be read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataSettings {
    pub exclude_variables: Option<PathBuf>,
    pub metadata: Option<PathBuf>,
    pub missing_marker: Option<String>,
    pub comment_marker: Option<String>,
    pub quote_char: Option<char>,
    pub has_header: bool,

    /// Only set for mixed data
    pub num_categories: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub prefix: String,
    pub json_graph: bool,
}

/**
A fully validated invocation. Test and score are only set when the algorithm
requires them, and `parameters` holds exactly the parameters read by the
selected algorithm, test and score (plus the bootstrap parameters).
 */
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ResolvedConfiguration {
    pub data_type: DataType,
    pub delimiter: Delimiter,
    pub datasets: Vec<PathBuf>,

    pub algorithm: String,
    pub test: Option<String>,
    pub score: Option<String>,
    pub knowledge: Option<PathBuf>,
    pub parameters: BTreeMap<String, ParamValue>,

    pub data: DataSettings,
    pub output: OutputSettings,
    pub thread_count: usize,
    pub skip_validation: bool,
    pub experimental: bool,
    pub use_defaults: bool,

    /// Options that were given, but don't apply to this invocation
    pub unused: Vec<String>,
}

impl ResolvedConfiguration {
    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }
}
