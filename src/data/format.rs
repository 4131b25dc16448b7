//! Service name templates.
//!
//! A template is literal text with named placeholders for the textual
//! columns of a record:
//!
//! ```text
//! %<source_name>s;%<source_id>s     named, printf style
//! %{type}                            named, bare
//! %%                                 a literal '%'
//! ```
//!
//! Templates are compiled once, so an unknown placeholder is reported at
//! startup rather than on the first poll.

use std::str::FromStr;

use ngstat_types::{StatField, StatisticRecord};
use thiserror::Error;

/// Template that joins all five textual columns with `;`.
pub const DEFAULT_TEMPLATE: &str =
    "%<source_name>s;%<source_id>s;%<source_instance>s;%<state>s;%<type>s";

/// Errors found while compiling a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Placeholder does not name a record column.
    #[error("unknown placeholder '{0}'")]
    UnknownPlaceholder(String),

    /// A `%` that does not start a valid directive.
    #[error("invalid directive at byte {0}")]
    InvalidDirective(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(StatField),
}

/// A compiled service name template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl ServiceTemplate {
    /// Compile a template string.
    pub fn parse(template: &str) -> Result<Self, FormatError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(pos) = rest.find('%') {
            literal.push_str(&rest[..pos]);
            let offset = template.len() - rest.len() + pos;
            let directive = &rest[pos + 1..];

            let (field, consumed) = if directive.starts_with('%') {
                literal.push('%');
                rest = &directive[1..];
                continue;
            } else if let Some(named) = directive.strip_prefix('<') {
                let end = named.find('>').ok_or(FormatError::InvalidDirective(offset))?;
                if named.as_bytes().get(end + 1) != Some(&b's') {
                    return Err(FormatError::InvalidDirective(offset));
                }
                (&named[..end], 1 + end + 2)
            } else if let Some(named) = directive.strip_prefix('{') {
                let end = named.find('}').ok_or(FormatError::InvalidDirective(offset))?;
                (&named[..end], 1 + end + 1)
            } else {
                return Err(FormatError::InvalidDirective(offset));
            };

            let field = StatField::from_str(field)
                .map_err(|_| FormatError::UnknownPlaceholder(field.to_string()))?;

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field(field));
            rest = &directive[consumed..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// Render the service name for a record.
    pub fn render(&self, record: &StatisticRecord) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(record.field(*field)),
            }
        }
        out
    }

    /// Columns referenced by the template, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = StatField> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(field) => Some(*field),
            Segment::Literal(_) => None,
        })
    }

    /// The template text this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for ServiceTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
            segments: vec![
                Segment::Field(StatField::SourceName),
                Segment::Literal(";".to_string()),
                Segment::Field(StatField::SourceId),
                Segment::Literal(";".to_string()),
                Segment::Field(StatField::SourceInstance),
                Segment::Literal(";".to_string()),
                Segment::Field(StatField::State),
                Segment::Literal(";".to_string()),
                Segment::Field(StatField::Type),
            ],
        }
    }
}

impl FromStr for ServiceTemplate {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
