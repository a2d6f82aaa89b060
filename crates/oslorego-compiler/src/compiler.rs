//! Document-level compilation.
//!
//! The [`Compiler`] walks a [`PolicyDocument`] in key order, parses every rule
//! expression and hands the resulting records to the [`PolicyAssembler`].

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::assembler::PolicyAssembler;
use crate::config::CompilerConfig;
use crate::document::PolicyDocument;
use crate::error::{CompilerError, Result};
use crate::naming::{AliasAllocator, ReservedAliases, SequentialAliases};
use crate::package::{is_identifier, PackageName};
use crate::parser::compile_rule_value;
use crate::rule::{RuleKind, RuleRecord};

/// Compiles oslo.policy documents into Rego modules.
///
/// # Examples
///
/// ```
/// use oslorego_compiler::Compiler;
///
/// let rego = Compiler::new()
///     .compile_str(r#"{"admin": "role:admin", "secrets:get": "rule:admin"}"#)
///     .unwrap();
///
/// assert!(rego.starts_with("package openstack.policy\n"));
/// assert!(rego.contains("allow {\n    rule = \"secrets:get\"\n    admin\n}"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    /// Creates a compiler with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compiler with `config`.
    #[must_use]
    pub const fn with_config(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles YAML or JSON source straight to Rego text.
    ///
    /// The configuration is validated before the source is parsed.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration, an unparsable document,
    /// or any rule that fails to compile.
    #[instrument(skip(self, source), fields(package = %self.config.package_name))]
    pub fn compile_str(&self, source: &str) -> Result<String> {
        self.config.validate()?;
        let document: PolicyDocument = source.parse()?;
        Ok(self.compile_document(&document)?.render())
    }

    /// Reads and compiles a policy file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the file cannot be
    /// read or parsed, or any rule fails to compile.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<CompiledPolicy> {
        self.config.validate()?;
        let document = PolicyDocument::from_file(path)?;
        self.compile_document(&document)
    }

    /// Compiles a parsed document with a fresh `<prefix>_<n>` name sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or any rule fails to
    /// compile. Compilation stops at the first failing rule.
    pub fn compile_document(&self, document: &PolicyDocument) -> Result<CompiledPolicy> {
        let aliases = SequentialAliases::new(self.config.alias_prefix.clone());
        self.compile_document_with(document, &aliases)
    }

    /// Compiles a parsed document using `aliases` for generated rule names.
    ///
    /// Names already used as policy keys are never handed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or any rule fails to
    /// compile.
    pub fn compile_document_with(
        &self,
        document: &PolicyDocument,
        aliases: &dyn AliasAllocator,
    ) -> Result<CompiledPolicy> {
        let package = self.config.validate()?;
        let aliases = ReservedAliases::new(aliases, document.names());
        let mut records = Vec::new();

        for (name, value) in document.iter() {
            let kind = RuleKind::for_key(name, self.config.action_separator);
            if kind == RuleKind::Alias && !is_identifier(name) {
                warn!(name, "Alias name is not a valid Rego identifier");
            }
            let compiled = compile_rule_value(kind, name, value, &aliases)
                .map_err(|e| CompilerError::policy(name, e))?;
            records.extend(compiled);
        }

        let compiled = CompiledPolicy::new(package, records, document);
        let summary = compiled.summary();
        info!(
            policies = summary.policies,
            actions = summary.actions,
            aliases = summary.aliases,
            generated_aliases = summary.generated_aliases,
            blocks = summary.blocks,
            "Compiled policy document"
        );
        Ok(compiled)
    }
}

/// The result of compiling a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPolicy {
    package: PackageName,
    records: Vec<RuleRecord>,
    summary: CompilationSummary,
}

/// Counts describing a compiled document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompilationSummary {
    /// Rego package.
    pub package: String,
    /// Entries in the source document.
    pub policies: usize,
    /// Distinct action names.
    pub actions: usize,
    /// Distinct alias names taken from the document.
    pub aliases: usize,
    /// Distinct rule names generated for parenthesized groups.
    pub generated_aliases: usize,
    /// Blocks in the output.
    pub blocks: usize,
}

impl CompiledPolicy {
    fn new(package: PackageName, records: Vec<RuleRecord>, document: &PolicyDocument) -> Self {
        let summary = summarize(&package, &records, document);
        Self {
            package,
            records,
            summary,
        }
    }

    /// The package of the module.
    #[must_use]
    pub const fn package(&self) -> &PackageName {
        &self.package
    }

    /// All records, in output order.
    #[must_use]
    pub fn records(&self) -> &[RuleRecord] {
        &self.records
    }

    /// Records named `name`, one per alternative.
    pub fn records_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RuleRecord> {
        self.records.iter().filter(move |r| r.name == name)
    }

    /// Counts describing this result.
    #[must_use]
    pub fn summary(&self) -> CompilationSummary {
        self.summary.clone()
    }

    /// Renders the Rego module.
    #[must_use]
    pub fn render(&self) -> String {
        PolicyAssembler::new(self.package.clone()).render(&self.records)
    }

    /// Writes the rendered module to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`CompilerError::FileWriteError`] if the file cannot be written.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render()).map_err(|e| CompilerError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

fn summarize(
    package: &PackageName,
    records: &[RuleRecord],
    document: &PolicyDocument,
) -> CompilationSummary {
    let mut actions = HashSet::new();
    let mut aliases = HashSet::new();
    let mut generated = HashSet::new();
    for record in records {
        let name = record.name.as_str();
        match record.kind {
            RuleKind::Action => actions.insert(name),
            RuleKind::Alias if document.contains(name) => aliases.insert(name),
            RuleKind::Alias => generated.insert(name),
        };
    }

    CompilationSummary {
        package: package.to_string(),
        policies: document.len(),
        actions: actions.len(),
        aliases: aliases.len(),
        generated_aliases: generated.len(),
        blocks: records.len(),
    }
}

impl fmt::Display for CompiledPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Compiles oslo.policy YAML or JSON into a Rego module in `package_name`.
///
/// # Errors
///
/// Returns an error if the package name is invalid, the document cannot be
/// parsed, or any rule fails to compile.
///
/// # Examples
///
/// ```
/// let rego = oslorego_compiler::oslo_policy_to_rego("nova.policy", "admin: role:admin").unwrap();
/// assert!(rego.contains("admin {\n    credentials.roles[_] = \"admin\"\n}"));
/// ```
pub fn oslo_policy_to_rego(package_name: &str, source: &str) -> Result<String> {
    Compiler::with_config(CompilerConfig::new().with_package_name(package_name)).compile_str(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExpressionError;

    #[test]
    fn test_records_follow_document_order() {
        let document = PolicyDocument::new()
            .with_entry("b", "rule:a")
            .with_entry("a", "role:admin");
        let compiled = Compiler::new().compile_document(&document).unwrap();
        let names: Vec<_> = compiled.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_generated_names_skip_document_keys() {
        let document = PolicyDocument::new()
            .with_entry("openstack_rule_1", "role:admin")
            .with_entry("x", "(rule:openstack_rule_1)");
        let compiled = Compiler::new().compile_document(&document).unwrap();
        let generated: Vec<_> = compiled.records_named("openstack_rule_2").collect();
        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].assertions, vec!["openstack_rule_1"]);
    }

    #[test]
    fn test_fresh_names_per_run() {
        let compiler = Compiler::new();
        let document = PolicyDocument::new().with_entry("x", "(rule:a)");
        let first = compiler.compile_document(&document).unwrap().render();
        let second = compiler.compile_document(&document).unwrap().render();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_allocator() {
        let document = PolicyDocument::new().with_entry("x", "(rule:a) and (rule:b)");
        let aliases = SequentialAliases::new("sub");
        let compiled = Compiler::new()
            .compile_document_with(&document, &aliases)
            .unwrap();
        assert_eq!(compiled.records()[0].assertions, vec!["sub_1", "sub_2"]);
    }

    #[test]
    fn test_custom_separator() {
        let config = CompilerConfig::new().with_action_separator('/');
        let document = PolicyDocument::new()
            .with_entry("compute/start", "rule:a")
            .with_entry("a:b", "rule:a");
        let compiled = Compiler::with_config(config).compile_document(&document).unwrap();
        assert_eq!(compiled.records()[0].kind, RuleKind::Action);
        assert_eq!(compiled.records()[1].kind, RuleKind::Alias);
    }

    #[test]
    fn test_error_names_key() {
        let err = Compiler::new()
            .compile_str("good: role:a\nbad: \"rule:a and\"\n")
            .unwrap_err();
        match err {
            CompilerError::Policy { key, source } => {
                assert_eq!(key, "bad");
                assert_eq!(
                    source,
                    ExpressionError::UnexpectedToken {
                        token: "<end>".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_package_checked_before_parsing() {
        let compiler = Compiler::with_config(CompilerConfig::new().with_package_name("a/b"));
        assert!(matches!(
            compiler.compile_str("{ not yaml"),
            Err(CompilerError::InvalidPackageName { .. })
        ));
    }

    #[test]
    fn test_summary() {
        let document = PolicyDocument::new()
            .with_entry("admin", "role:admin")
            .with_entry("secrets:get", "rule:admin or (role:a and role:b)")
            .with_entry("secrets:list", "rule:admin");
        let summary = Compiler::new().compile_document(&document).unwrap().summary();
        assert_eq!(
            summary,
            CompilationSummary {
                package: "openstack.policy".to_string(),
                policies: 3,
                actions: 2,
                aliases: 1,
                generated_aliases: 1,
                blocks: 5,
            }
        );
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.rego");
        fs::write(&path, "stale content that is much longer than the new module").unwrap();

        let compiled = Compiler::new()
            .compile_document(&PolicyDocument::new().with_entry("a", "@"))
            .unwrap();
        compiled.write_to_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), compiled.to_string());

        let missing_dir = dir.path().join("missing").join("policy.rego");
        assert!(matches!(
            compiled.write_to_file(missing_dir),
            Err(CompilerError::FileWriteError { .. })
        ));
    }
}
