//! Variable interpolation resolver.
//!
//! Raw values may reference other keys and environment variables:
//! `${key}` resolves in the current section, `${section:key}` across
//! sections, `$NAME` or `${NAME}` from the environment, and `$$` escapes
//! a literal `$`. Key references resolve recursively against the raw
//! values of the document, with cycle detection over the in-progress
//! reference chain. Document keys take precedence over environment
//! variables of the same name; only an identifier that names no key is
//! looked up in the environment.
//!
//! The resolver holds an environment snapshot and a missing-variable
//! policy; the document is passed in per call and never mutated.

use std::collections::HashMap;

use crate::{
    document::Document,
    error::{ConfigError, Result},
};

/// Policy for references to unset environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingEnvPolicy {
    /// Fail with [`ConfigError::MissingEnv`].
    #[default]
    Fail,
    /// Substitute the empty string.
    Empty,
}

/// Resolves interpolation tokens against a document and an environment
/// snapshot.
#[derive(Debug, Clone)]
pub struct Interpolator {
    env: HashMap<String, String>,
    missing_env: MissingEnvPolicy,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpolator {
    /// Snapshot the process environment, with the strict missing-variable
    /// policy.
    pub fn new() -> Self {
        Self {
            env: std::env::vars().collect(),
            missing_env: MissingEnvPolicy::Fail,
        }
    }

    /// Use a fixed variable map instead of the process environment.
    pub fn with_env(env: HashMap<String, String>) -> Self {
        Self {
            env,
            missing_env: MissingEnvPolicy::Fail,
        }
    }

    /// Substitute the empty string for unset environment variables
    /// instead of failing.
    pub fn missing_env_as_empty(mut self) -> Self {
        self.missing_env = MissingEnvPolicy::Empty;
        self
    }

    pub fn missing_env_policy(&self) -> MissingEnvPolicy {
        self.missing_env
    }

    /// Resolve every token in `raw`, treating `section` as the current
    /// section for unqualified references.
    ///
    /// # Errors
    ///
    /// Fails on unterminated or malformed tokens, references to missing
    /// keys, unset environment variables (under the strict policy), and
    /// reference cycles.
    pub fn resolve(&self, doc: &Document, section: &str, raw: &str) -> Result<String> {
        let mut chain = Vec::new();
        self.resolve_text(doc, section, raw, &mut chain)
    }

    fn resolve_text(
        &self,
        doc: &Document,
        section: &str,
        raw: &str,
        chain: &mut Vec<(String, String)>,
    ) -> Result<String> {
        let mut out = String::new();
        let mut chars = raw.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '$' {
                out.push(ch);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    out.push('$');
                }
                Some('{') => {
                    chars.next();
                    let mut reference = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        reference.push(c);
                    }
                    if !closed {
                        return Err(ConfigError::InterpolationSyntax {
                            value: raw.to_string(),
                            reason: "unterminated `${`".to_string(),
                        });
                    }
                    let resolved = self.resolve_reference(doc, section, &reference, raw, chain)?;
                    out.push_str(&resolved);
                }
                Some(c) if is_word(*c) => {
                    let mut name = String::new();
                    while let Some(c) = chars.peek() {
                        if !is_word(*c) {
                            break;
                        }
                        name.push(*c);
                        chars.next();
                    }
                    let resolved = self.resolve_name(doc, section, &name, chain)?;
                    out.push_str(&resolved);
                }
                // A `$` that starts no token is literal text.
                _ => out.push('$'),
            }
        }
        Ok(out)
    }

    fn resolve_reference(
        &self,
        doc: &Document,
        section: &str,
        reference: &str,
        raw: &str,
        chain: &mut Vec<(String, String)>,
    ) -> Result<String> {
        let parts: Vec<&str> = reference.split(':').collect();
        match parts.as_slice() {
            [name] => self.resolve_name(doc, section, name, chain),
            [target_section, key] => match doc.get(target_section, key) {
                Some(value) => self.resolve_key(doc, target_section, key, value, chain),
                None => Err(ConfigError::MissingKey {
                    section: target_section.to_string(),
                    key: key.to_string(),
                }),
            },
            _ => Err(ConfigError::InterpolationSyntax {
                value: raw.to_string(),
                reason: format!("more than one `:` in `${{{reference}}}`"),
            }),
        }
    }

    /// Unqualified identifier: a key in the current section wins; the
    /// environment is only consulted when no such key exists.
    fn resolve_name(
        &self,
        doc: &Document,
        section: &str,
        name: &str,
        chain: &mut Vec<(String, String)>,
    ) -> Result<String> {
        if let Some(value) = doc.get(section, name) {
            return self.resolve_key(doc, section, name, value, chain);
        }
        match self.env.get(name) {
            Some(value) => Ok(value.clone()),
            None => match self.missing_env {
                MissingEnvPolicy::Fail => Err(ConfigError::MissingEnv {
                    name: name.to_string(),
                }),
                MissingEnvPolicy::Empty => Ok(String::new()),
            },
        }
    }

    fn resolve_key(
        &self,
        doc: &Document,
        section: &str,
        key: &str,
        value: &str,
        chain: &mut Vec<(String, String)>,
    ) -> Result<String> {
        let coordinate = (section.to_string(), key.to_string());
        if chain.contains(&coordinate) {
            let mut rendered: Vec<String> =
                chain.iter().map(|(s, k)| format!("{s}:{k}")).collect();
            rendered.push(format!("{section}:{key}"));
            return Err(ConfigError::InterpolationCycle {
                chain: rendered.join(" -> "),
            });
        }
        chain.push(coordinate);
        let resolved = self.resolve_text(doc, section, value, chain)?;
        chain.pop();
        Ok(resolved)
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::parse(
            "[Section1]\n\
             a = a\n\
             b = ${a}\n\
             c = $ENV1/${b}\n\
             d = ${ENV2}\n\
             \n\
             [Section2]\n\
             a = ${Section1:a}\n\
             b = ${ENV2}/${Section1:a}/$ENV1\n",
        )
        .unwrap()
    }

    fn interpolator() -> Interpolator {
        Interpolator::with_env(HashMap::from([
            ("ENV1".to_string(), "EnvValue1".to_string()),
            ("ENV2".to_string(), "EnvValue2".to_string()),
        ]))
    }

    #[test]
    fn resolves_chained_references() {
        let doc = sample();
        let i = interpolator();
        assert_eq!(doc.interpolated_with(&i, "Section1", "a").unwrap(), "a");
        assert_eq!(doc.interpolated_with(&i, "Section1", "b").unwrap(), "a");
        assert_eq!(doc.interpolated_with(&i, "Section1", "c").unwrap(), "EnvValue1/a");
        assert_eq!(doc.interpolated_with(&i, "Section1", "d").unwrap(), "EnvValue2");
    }

    #[test]
    fn resolves_cross_section_references() {
        let doc = sample();
        let i = interpolator();
        assert_eq!(doc.interpolated_with(&i, "Section2", "a").unwrap(), "a");
        assert_eq!(
            doc.interpolated_with(&i, "Section2", "b").unwrap(),
            "EnvValue2/a/EnvValue1"
        );
    }

    #[test]
    fn document_keys_shadow_environment_variables() {
        let doc = Document::parse("[S]\nHOME = from_doc\nx = ${HOME}\ny = $HOME\n").unwrap();
        let i = Interpolator::with_env(HashMap::from([(
            "HOME".to_string(),
            "from_env".to_string(),
        )]));
        assert_eq!(doc.interpolated_with(&i, "S", "x").unwrap(), "from_doc");
        assert_eq!(doc.interpolated_with(&i, "S", "y").unwrap(), "from_doc");
    }

    #[test]
    fn missing_env_fails_under_strict_policy() {
        let doc = Document::parse("[S]\nx = ${UNSET_VAR}\n").unwrap();
        let err = doc
            .interpolated_with(&Interpolator::with_env(HashMap::new()), "S", "x")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv { name } if name == "UNSET_VAR"));
    }

    #[test]
    fn missing_env_substitutes_empty_under_lenient_policy() {
        let doc = Document::parse("[S]\nx = a/${UNSET_VAR}/b\n").unwrap();
        let i = Interpolator::with_env(HashMap::new()).missing_env_as_empty();
        assert_eq!(doc.interpolated_with(&i, "S", "x").unwrap(), "a//b");
    }

    #[test]
    fn missing_cross_section_key_fails() {
        let doc = Document::parse("[S]\nx = ${Other:key}\n").unwrap();
        let err = doc
            .interpolated_with(&interpolator(), "S", "x")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { section, key } if section == "Other" && key == "key"));
    }

    #[test]
    fn detects_reference_cycles() {
        let doc = Document::parse("[S]\na = ${b}\nb = ${a}\n").unwrap();
        let err = doc
            .interpolated_with(&interpolator(), "S", "a")
            .unwrap_err();
        match err {
            ConfigError::InterpolationCycle { chain } => {
                assert!(chain.contains("S:a"), "chain: {chain}");
                assert!(chain.contains("S:b"), "chain: {chain}");
            }
            other => panic!("expected a cycle error, got {other}"),
        }
    }

    #[test]
    fn detects_self_reference() {
        let doc = Document::parse("[S]\na = ${a}\n").unwrap();
        let err = doc
            .interpolated_with(&interpolator(), "S", "a")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InterpolationCycle { .. }));
    }

    #[test]
    fn double_dollar_escapes() {
        let doc = Document::parse("[S]\nx = $$HOME and $$\n").unwrap();
        assert_eq!(
            doc.interpolated_with(&interpolator(), "S", "x").unwrap(),
            "$HOME and $"
        );
    }

    #[test]
    fn dollar_without_token_is_literal() {
        let doc = Document::parse("[S]\nx = cost: 5$ total\n").unwrap();
        assert_eq!(
            doc.interpolated_with(&interpolator(), "S", "x").unwrap(),
            "cost: 5$ total"
        );
    }

    #[test]
    fn unterminated_brace_is_a_syntax_error() {
        let doc = Document::parse("[S]\nx = ${oops\n").unwrap();
        let err = doc
            .interpolated_with(&interpolator(), "S", "x")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InterpolationSyntax { .. }));
    }

    #[test]
    fn extra_colon_is_a_syntax_error() {
        let doc = Document::parse("[S]\nx = ${a:b:c}\n").unwrap();
        let err = doc
            .interpolated_with(&interpolator(), "S", "x")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InterpolationSyntax { .. }));
    }

    #[test]
    fn resolver_does_not_mutate_the_document() {
        let doc = sample();
        let before = doc.serialize();
        let _ = doc.interpolated_with(&interpolator(), "Section1", "c");
        assert_eq!(doc.serialize(), before);
    }
}
