#![no_std]

/*!
Low-level tokenization of command-line arguments. Takes care of telling long
options apart from their values and from stray arguments. No schema lookups
and no type handling happen here; a [`Visitor`] decides, option by option,
whether a value should be taken.
*/

use ::core::fmt::{self, Debug, Write};
use ::core::str::{self, Utf8Error};

#[cfg(test)]
extern crate std;

/**
A single, raw argument passed in from the command line.

This type is used in two ways: to indicate long command line options, and to
indicate their values. For instance, given `--algorithm fges --dataset=d.txt`,
`algorithm`, `fges`, `dataset`, and `d.txt` would all be passed as [`Arg`]
values to the relevant functions.

An [`Arg`] internally is just a byte slice, since that's what the OS gives us.
*/
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Arg<'arg>(&'arg [u8]);

impl<'arg> Arg<'arg> {
    #[inline]
    #[must_use]
    pub const fn new(bytes: &'arg [u8]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn bytes(&self) -> &'arg [u8] {
        self.0
    }

    /// Get this argument as a string, if it's valid UTF-8
    #[inline]
    pub fn as_str(&self) -> Result<&'arg str, Utf8Error> {
        str::from_utf8(self.0)
    }
}

/**
Debug-print an arg. This implementation does its best to treat the arg as a
string, but includes non-utf-8 bytes in their hex representation as needed.
 */
impl Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
            f.write_char('[')?;

            let mut bytes = bytes.iter().copied();

            if let Some(b) = bytes.next() {
                write!(f, "{b:#x}")?;
                bytes.try_for_each(|b| write!(f, ",{b:#x}"))?;
            }

            f.write_char(']')
        }

        if self.0.is_empty() {
            return f.write_str("\"\"");
        }

        self.0.utf8_chunks().enumerate().try_for_each(|(i, chunk)| {
            if i > 0 {
                write!(f, "..")?
            }

            match (chunk.valid(), chunk.invalid()) {
                (s, b"") => write!(f, "{s:?}"),
                ("", b) => write_bytes(f, b),
                (s, b) => {
                    write!(f, "{s:?}..")?;
                    write_bytes(f, b)
                }
            }
        })
    }
}

/**
The [`ArgumentsParser`] type operates by passing arguments it finds into a
[`Visitor`], to be handled.
 */
pub trait Visitor<'arg> {
    type Value;

    /// A stray argument that isn't attached to any option, such as a second
    /// value after `--out dir other`, or anything after a raw `--`.
    fn visit_positional(self, argument: Arg<'arg>) -> Self::Value;

    /// A long option that definitely has an argument, because it was given
    /// as `--option=argument`
    fn visit_long_option(self, option: Arg<'arg>, argument: Arg<'arg>) -> Self::Value;

    /// A long option or flag, such as `--option`
    fn visit_long(self, option: Arg<'arg>, arg: impl ArgAccess<'arg>) -> Self::Value;
}

/**
[`ArgAccess`] allows a visitor to decide if a given option needs a value,
based on the identity of the option.

Consider `--no-header data.txt`. Is this a flag followed by a stray argument,
or an option with a value? The [`ArgumentsParser`] can't classify it on its
own, so a visitor requests a value via this trait only for options that take
one.
*/
pub trait ArgAccess<'arg>: Sized {
    /**
    Get a value from the parser. This should only be called by options that
    take one; flags should simply ignore it, so that the next command line
    argument can be parsed independently.

    This returns [`None`] if the arguments have been exhausted or if the next
    argument is itself an option marker (`--something` or a raw `--`). In
    that case nothing is consumed, so an option name is never swallowed as
    the value of the option before it.
    */
    fn take(self) -> Option<Arg<'arg>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    PositionalOnly,
}

/**
An `ArgumentsParser` is the main entry point into `causal_args_parser`. It
parses arguments in each call to [`next_arg`][ArgumentsParser::next_arg],
sending those arguments to the given [`Visitor`].

The parser operates entirely on borrowed data; the ubiquitous `'arg`
lifetime refers to the borrowed command line.
*/
#[derive(Debug, Clone)]
pub struct ArgumentsParser<'arg, I> {
    state: State,
    lookahead: Option<&'arg [u8]>,
    args: I,
}

impl<'arg, I> ArgumentsParser<'arg, I>
where
    I: Iterator<Item = &'arg [u8]>,
{
    /**
    Create a new [`ArgumentsParser`] from an iterator of byte slices, where
    each byte slice is a single argument received from the command line. This
    list should *exclude* the name of the program.
     */
    #[inline]
    #[must_use]
    pub fn new(args: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            state: State::Ready,
            lookahead: None,
            args: args.into_iter(),
        }
    }

    #[inline]
    fn peek(&mut self) -> Option<&'arg [u8]> {
        if self.lookahead.is_none() {
            self.lookahead = self.args.next();
        }

        self.lookahead
    }

    #[inline]
    fn advance(&mut self) -> Option<&'arg [u8]> {
        self.lookahead.take().or_else(|| self.args.next())
    }

    /// Put `self` into a `PositionalOnly` state, then process a positional
    /// argument
    #[inline]
    fn positional_only_arg<V>(&mut self, visitor: V) -> Option<V::Value>
    where
        V: Visitor<'arg>,
    {
        self.state = State::PositionalOnly;
        self.advance()
            .map(Arg)
            .map(|arg| visitor.visit_positional(arg))
    }

    pub fn next_arg<V>(&mut self, visitor: V) -> Option<V::Value>
    where
        V: Visitor<'arg>,
    {
        match self.state {
            State::Ready => match self.advance()? {
                b"--" => self.positional_only_arg(visitor),
                [b'-', b'-', option @ ..] => Some(match split_once(option, b'=') {
                    Some((option, argument)) => {
                        visitor.visit_long_option(Arg(option), Arg(argument))
                    }
                    None => visitor.visit_long(Arg(option), StandardArgAccess { parent: self }),
                }),
                positional => Some(visitor.visit_positional(Arg(positional))),
            },
            State::PositionalOnly => self.positional_only_arg(visitor),
        }
    }
}

/// Returns true if this raw argument would be read as an option marker
#[inline]
#[must_use]
pub fn is_option_marker(argument: &[u8]) -> bool {
    argument.starts_with(b"--")
}

/// ArgAccess implementation that gets the next argument from the list,
/// unless that argument is another option.
struct StandardArgAccess<'a, 'arg, I> {
    parent: &'a mut ArgumentsParser<'arg, I>,
}

impl<'arg, I> ArgAccess<'arg> for StandardArgAccess<'_, 'arg, I>
where
    I: Iterator<Item = &'arg [u8]>,
{
    fn take(self) -> Option<Arg<'arg>> {
        match self.parent.peek()? {
            next if is_option_marker(next) => None,
            _ => self.parent.advance().map(Arg),
        }
    }
}

fn split_once(input: &[u8], delimiter: u8) -> Option<(&[u8], &[u8])> {
    memchr::memchr(delimiter, input).map(|i| (&input[..i], &input[i + 1..]))
}
