/*!
Rendering of help, command listings and failures.

```text
DESCRIPTION

Synopsis:
  causal-cmd --algorithm <ALGORITHM> ... [OPTIONS]

Errors:
  --test <TEST>
          Independence test for discrete data: chi-square-test, g-square-test

Required:
  --score <SCORE>
          ...

Options:
  ...
```
 */

use std::{
    fmt::Display,
    io::{self, Write as _},
};

use indent_write::io::IndentWriter;
use lazy_format::lazy_format;

use crate::{
    catalog::{CommandSummary, SelectorKind},
    descriptor::{Arity, OptionDescriptor},
    errors::Failure,
    help::{HelpRequest, Projection},
};

const WRAP_WIDTH: usize = 72;

fn option_tags(option: &OptionDescriptor) -> impl Display + '_ {
    let name = option.name();
    let placeholder = option.placeholder();

    lazy_format!(match (option.arity()) {
        Arity::Flag => "--{name}",
        Arity::Value => "--{name} <{placeholder}>",
        Arity::OptionalValue => "--{name} [{placeholder}]",
    })
}

fn print_option(
    out: &mut (impl io::Write + ?Sized),
    style: HelpRequest,
    option: &OptionDescriptor,
) -> io::Result<()> {
    describe(out, option_tags(option), option.description(), style)
}

pub fn print_help(
    out: &mut impl io::Write,
    command: &str,
    description: &str,
    projection: &Projection,
    style: HelpRequest,
) -> io::Result<()> {
    writeln!(out, "{description}")?;

    section(out, "Synopsis", |mut out| {
        write!(out, "{command}")?;

        projection
            .invalid()
            .iter()
            .chain(projection.required())
            .filter(|option| option.is_required())
            .try_for_each(|option| write!(out, " {}", option_tags(option)))?;

        if !projection.optional().is_empty() {
            write!(out, " [OPTIONS]")?;
        }

        writeln!(out)
    })?;

    maybe_section(out, "Errors", projection.invalid(), |out, option| {
        print_option(out, style, option)
    })?;

    maybe_section(out, "Required", projection.required(), |out, option| {
        print_option(out, style, option)
    })?;

    maybe_section(out, "Options", projection.optional(), |out, option| {
        print_option(out, style, option)
    })
}

/// List the commands of one kind, with their descriptions
pub fn print_commands(
    out: &mut impl io::Write,
    kind: SelectorKind,
    commands: &[CommandSummary],
) -> io::Result<()> {
    let header = match kind {
        SelectorKind::Algorithm => "Algorithms",
        SelectorKind::Test => "Independence tests",
        SelectorKind::Score => "Scores",
        SelectorKind::DataType => "Data types",
        SelectorKind::Delimiter => "Delimiters",
    };

    if commands.is_empty() {
        return writeln!(out, "no {kind} commands are available");
    }

    section(out, header, |mut out| {
        commands.iter().try_for_each(|summary| {
            describe(
                &mut out,
                summary.command,
                summary.description,
                HelpRequest::Succinct,
            )
        })
    })
}

/// Print the cause of a failure, then help scoped to the point of failure
pub fn print_failure(
    out: &mut impl io::Write,
    command: &str,
    description: &str,
    failure: &Failure,
) -> io::Result<()> {
    writeln!(out, "error: {}\n", failure.error)?;
    print_help(
        out,
        command,
        description,
        &failure.projection(),
        HelpRequest::Succinct,
    )
}

/// `Header:` on its own line after a blank one, then `body` indented by two
fn section<O: io::Write + ?Sized, T>(
    out: &mut O,
    header: &str,
    body: impl FnOnce(IndentWriter<&mut O>) -> io::Result<T>,
) -> io::Result<T> {
    writeln!(out, "\n{header}:")?;
    body(IndentWriter::new("  ", out))
}

/// A [`section`] with one `entry` per item; nothing at all for no items
fn maybe_section<O: io::Write + ?Sized, I: IntoIterator>(
    out: &mut O,
    header: &str,
    items: I,
    entry: impl Fn(&mut IndentWriter<&mut O>, I::Item) -> io::Result<()>,
) -> io::Result<()> {
    let mut items = items.into_iter().peekable();

    if items.peek().is_none() {
        return Ok(());
    }

    section(out, header, |mut out| {
        items.try_for_each(|item| entry(&mut out, item))
    })
}

/// An option or command tag with its description. Tags narrower than the
/// description column share their line with a short description; otherwise
/// the description is wrapped on the lines below.
fn describe(
    out: &mut (impl io::Write + ?Sized),
    item: impl Display,
    description: &str,
    style: HelpRequest,
) -> io::Result<()> {
    const COLUMN: &str = "        ";

    struct Measured<'a, T: io::Write + ?Sized> {
        inner: &'a mut T,
        width: &'a mut usize,
    }

    impl<T: io::Write + ?Sized> io::Write for Measured<'_, T> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = self.inner.write(buf)?;
            *self.width += n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    let mut width = 0;

    write!(
        Measured {
            inner: &mut *out,
            width: &mut width,
        },
        "{item}"
    )?;

    if description.is_empty() {
        return writeln!(out);
    }

    if let Some(gap) = COLUMN.len().checked_sub(width)
        && gap >= 2
        && description.len() <= WRAP_WIDTH
    {
        write!(out, "{:gap$}", "")?;
        return writeln!(out, "{description}");
    }

    let mut out = IndentWriter::new(COLUMN, out);

    writeln!(out)?;
    textwrap::wrap(description, WRAP_WIDTH)
        .iter()
        .try_for_each(|line| writeln!(out, "{line}"))?;

    match style {
        HelpRequest::Full => writeln!(out),
        HelpRequest::Succinct => Ok(()),
    }
}
