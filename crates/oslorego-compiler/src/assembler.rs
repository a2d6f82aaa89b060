//! Rego module assembly.
//!
//! Turns rule records into the final module text: a fixed header followed by
//! one block per record. Records sharing a name become separate same-named
//! blocks, which Rego reads as alternatives.

use std::fmt::Write as _;

use crate::classifier::rego_string;
use crate::package::PackageName;
use crate::rule::{RuleKind, RuleRecord};

const INDENT: &str = "    ";

/// Renders rule records into a Rego module.
///
/// # Examples
///
/// ```
/// use oslorego_compiler::assembler::PolicyAssembler;
/// use oslorego_compiler::rule::{RuleKind, RuleRecord};
/// use oslorego_compiler::PackageName;
///
/// let assembler = PolicyAssembler::new(PackageName::default());
/// let text = assembler.render(&[RuleRecord::single(RuleKind::Action, "secrets:get", "admin")]);
/// assert!(text.ends_with("allow {\n    rule = \"secrets:get\"\n    admin\n}\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyAssembler {
    package: PackageName,
}

impl PolicyAssembler {
    /// Creates an assembler for `package`.
    #[must_use]
    pub const fn new(package: PackageName) -> Self {
        Self { package }
    }

    /// The package this assembler writes.
    #[must_use]
    pub const fn package(&self) -> &PackageName {
        &self.package
    }

    /// The module header, ending with a newline.
    #[must_use]
    pub fn header(&self) -> String {
        format!(
            "package {}\n\n\
             import input.credentials as credentials\n\
             import input.rule as rule\n\
             import input.target as target\n\n\
             default allow = false\n",
            self.package
        )
    }

    /// Renders a single block, without a trailing newline.
    #[must_use]
    pub fn render_record(record: &RuleRecord) -> String {
        let mut block = match record.kind {
            RuleKind::Action => format!("allow {{\n{INDENT}rule = {}\n", rego_string(&record.name)),
            RuleKind::Alias => format!("{} {{\n", record.name),
        };
        if record.assertions.is_empty() {
            let _ = writeln!(block, "{INDENT}true");
        }
        for assertion in &record.assertions {
            let _ = writeln!(block, "{INDENT}{assertion}");
        }
        block.push('}');
        block
    }

    /// Renders the header followed by every record, separated by blank lines.
    #[must_use]
    pub fn render(&self, records: &[RuleRecord]) -> String {
        let mut output = self.header();
        for record in records {
            output.push('\n');
            output.push_str(&Self::render_record(record));
            output.push('\n');
        }
        output
    }
}
