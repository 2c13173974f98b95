//! Pretty-printing facility for error messages
//!
//! In fairness, this is mostly a wrapper around `pest::error::Error::new_from_span`,
//! the difficult part of the formatting is handled and `Error` only adds aggregation
//! of messages as well as colored output.
//!
//! # Example
//!
//! ```rust
//! Error::new("Months out of order")
//!     .with_span(&loc, "this month")
//!     .with_span(&prev_loc, "comes before this one")
//!     .with_text("Purchases must be listed chronologically")
//!     .with_hint("move the purchase to its year, in calendar order")
//!     .register(errors);
//! ```
//!
//! ```txt
//! --> Error: Months out of order
//!  |     --> hours.pln:9:5
//!  |      |
//!  |    9 |     Jan: 7;
//!  |      |     ^-----^
//!  |      |
//!  |      = this month
//!  |     --> hours.pln:7:5
//!  |      |
//!  |    7 |     Mar: 6;
//!  |      |     ^-----^
//!  |      |
//!  |      = comes before this one
//!  |  Purchases must be listed chronologically
//!  |      ? hint: move the purchase to its year, in calendar order
//! ```

use crate::lib::parse::Rule;
use std::fmt;

/// Location of an error
///
/// Contains information on the file in which the error
/// occured and the precise span within that file
pub type Loc<'i> = (&'i str, pest::Span<'i>);

/// Report for a single error
///
/// All messages (`label` passed with `new`, arguments of `with_hint`
/// and `with_text`) should fit in a single line.
///
/// ```rust
/// // NO
/// Error::new("Fatal failure\ngeneral message\nspanning several lines\nhint to fix\nnote\nsee
/// documentation")
///     .register(errors);
///
/// // YES
/// Error::new("Fatal failure")
///     .with_text("general message")
///     .with_text("spanning several lines")
///     .with_hint("hint to fix")
///     .with_hint("note")
///     .with_text("see documentation")
///     .register(errors);
/// ```
#[must_use]
#[derive(Debug)]
pub struct Error {
    /// determines the error label (warning/error) and the color (yellow/red)
    fatal: bool,
    /// name of the error
    label: String,
    /// contents of the error
    items: Vec<Item>,
}

/// Kinds of items that can be added to an error report
#[derive(Debug)]
enum Item {
    /// code block
    Block(pest::error::Error<Rule>),
    /// important message
    Text(String),
    /// recommendations for fixes
    Hint(String),
}

/// A collection of errors
///
/// Typically to keep record of all errors detected in one file,
/// but the structure itself makes no assumption regarding the
/// spatial or semantic relationship between these errors
#[must_use]
#[derive(Debug, Default)]
pub struct Record {
    /// how many are errors, the rest are warnings
    fatal: usize,
    contents: Vec<Error>,
}

impl Error {
    /// Create a new error
    pub fn new<S>(msg: S) -> Self
    where S: ToString {
        Self {
            fatal: true,
            label: msg.to_string(),
            items: Vec::new(),
        }
    }

    /// Mark as a warning rather that a fatal error
    pub fn nonfatal(mut self) -> Self {
        self.fatal = false;
        self
    }

    /// Add a pre-existing error (e.g. to build from a parsing error)
    pub fn with_error(mut self, err: pest::error::Error<Rule>) -> Self {
        self.items.push(Item::Block(err.renamed_rules(rule_rename)));
        self
    }

    /// Add a code block and its associated message
    pub fn with_span<S>(mut self, loc: &Loc, msg: S) -> Self
    where S: ToString {
        let block = pest::error::Error::new_from_span(
            pest::error::ErrorVariant::CustomError { message: msg.to_string() },
            loc.1.clone(),
        );
        self.items.push(Item::Block(block.with_path(loc.0)));
        self
    }

    /// Add an important note
    pub fn with_text<S>(mut self, msg: S) -> Self
    where S: ToString {
        self.items.push(Item::Text(msg.to_string()));
        self
    }

    /// Add a hint on how to fix
    pub fn with_hint<S>(mut self, msg: S) -> Self
    where S: ToString {
        self.items.push(Item::Hint(msg.to_string()));
        self
    }

    /// Consume the error and add it to the pool of recorded errors
    pub fn register(self, record: &mut Record) {
        record.register(self);
    }
}

impl Record {
    /// Initialize a new pool of errors (e.g. to record errors from another file)
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if any of the recorded errors are fatal
    pub fn is_fatal(&self) -> bool {
        self.fatal > 0
    }

    /// Number of fatal errors
    pub fn count_errors(&self) -> usize {
        self.fatal
    }

    /// Number of nonfatal errors
    pub fn count_warnings(&self) -> usize {
        self.contents.len() - self.fatal
    }

    /// Add a new error to the pool
    fn register(&mut self, err: Error) {
        if err.fatal {
            self.fatal += 1;
        }
        self.contents.push(err);
    }
}

const RED: &str = "\x1b[0;91;1m";
const YELLOW: &str = "\x1b[0;93;1m";
const BLUE: &str = "\x1b[0;96;1m";
const WHITE: &str = "\x1b[0;1m";
const NONE: &str = "\x1b[0m";

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (color, header) = if self.fatal {
            (RED, "--> Error")
        } else {
            (YELLOW, "--> Warning")
        };
        writeln!(f, "{}{}:{} {}{}", color, header, WHITE, self.label, NONE)?;
        for item in &self.items {
            match item {
                Item::Block(err) => {
                    let mut align = "   ".to_string();
                    let mut align_found = false;
                    for line in format!("{}", err).split('\n') {
                        write!(f, " {}|{}  {}", color, if align_found { &align } else { "" }, BLUE)?;
                        for c in line.chars() {
                            match c {
                                '-' if !align_found => {
                                    align_found = true;
                                    write!(f, "{}-", align)?;
                                }
                                ' ' if !align_found => {
                                    align.pop();
                                    write!(f, " ")?;
                                }
                                '|' => write!(f, "|{}", NONE)?,
                                '=' => write!(f, "={}", NONE)?,
                                '^' => write!(f, "{}^", color)?,
                                _ => write!(f, "{}", c)?,
                            }
                        }
                        writeln!(f)?;
                    }
                }
                Item::Text(txt) => {
                    writeln!(f, " {}|  {}{}{}", color, WHITE, txt, NONE)?;
                }
                Item::Hint(txt) => {
                    writeln!(f, " {}|      {}? hint: {}{}", color, BLUE, NONE, txt)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contents.is_empty() {
            return Ok(());
        }
        let fatal = self.is_fatal();
        let count = if fatal { self.count_errors() } else { self.count_warnings() };
        let color = if fatal { RED } else { YELLOW };
        let trunc = 10;
        for err in self.contents.iter().filter(|err| err.fatal == fatal).take(trunc) {
            // only print errors with the maximum fatality
            writeln!(f, "{}", err)?;
        }
        if count > trunc {
            writeln!(f, "{} And {} more.", color, count - trunc)?;
        }
        let plural = if count > 1 { "s" } else { "" };
        if fatal {
            writeln!(f, "{}Fatal: {}{} error{} emitted{}", color, WHITE, count, plural, NONE)?;
        } else {
            writeln!(f, "{}Nonfatal: {}{} warning{} emitted{}", color, WHITE, count, plural, NONE)?;
        }
        Ok(())
    }
}

/// Convert rule names to user-friendly information about their purpose
fn rule_rename(rule: &Rule) -> String {
    use Rule::*;
    String::from(match rule {
        EOI => "EOF",
        WHITESPACE => "at least one whitespace",
        COMMENT => "a comment",
        digit => "a digit (0..9)",
        number => "a number",
        quantity => "a quantity ('X' or 'X.Y')",
        semicolon => "a semicolon (';') separator",
        colon => "a colon (':') separator",
        range => "a range ('..') separator",
        string => "a string of non-'\"' characters",
        tag_text => "a quoted name ('\"foo\"')",
        month_name => "a month name ('Jan' ... 'Dec')",
        marker_year => "a year marker ('YYYY:')",
        date => "a date ('YYYY-Mmm-DD')",
        field_workspace => "a 'workspace' field",
        field_project => "a 'project' field",
        field_title => "a 'title' field",
        field_window => "a 'window' field",
        field_workday => "a 'workday' field",
        field_pagesize => "a 'pagesize' field",
        field => "any field descriptor",
        purchase => "a month of purchased days ('Mmm: X;')",
        purchases_year => "a sequence of purchases for the same year",
        item => "a field descriptor or a sequence of purchases",
        program => "a sequence of field descriptors or purchases",
    })
}
