//! Row Validation - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy maps violations to actions.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::FailureMode;
use crate::table::ItemRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub item_id: String,
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    /// `rule: message` pairs joined for error reporting
    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|v| format!("{}: {}", v.rule, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, row: &ItemRow) -> Vec<ValidationViolation>;
}

fn violation(
    rule: &dyn ValidationRule,
    row: &ItemRow,
    severity: ViolationSeverity,
    message: String,
    remediation: &str,
) -> ValidationViolation {
    ValidationViolation {
        item_id: row.id.clone(),
        rule: rule.name().to_string(),
        severity,
        message,
        remediation: vec![remediation.to_string()],
    }
}

// --- Concrete Rules ---

/// Identifiers become file names and resource locations.
pub struct IdentifierRule;

impl ValidationRule for IdentifierRule {
    fn name(&self) -> &'static str { "identifier" }

    fn validate(&self, row: &ItemRow) -> Vec<ValidationViolation> {
        let bad: Vec<char> = row
            .id
            .chars()
            .filter(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
            .collect();

        if bad.is_empty() {
            return vec![];
        }
        vec![violation(
            self,
            row,
            ViolationSeverity::Error,
            format!("'{}' is not a valid resource path (offending: {:?})", row.id, bad),
            "Use lowercase letters, digits, '_', '-', '.' and '/' only",
        )]
    }
}

/// Player-head textures are base64 encoded profile JSON.
pub struct TextureRule;

impl ValidationRule for TextureRule {
    fn name(&self) -> &'static str { "texture" }

    fn validate(&self, row: &ItemRow) -> Vec<ValidationViolation> {
        let decoded = match base64::engine::general_purpose::STANDARD.decode(row.texture.as_bytes()) {
            Ok(bytes) => bytes,
            Err(e) => {
                return vec![violation(
                    self,
                    row,
                    ViolationSeverity::Warning,
                    format!("Texture is not base64: {}", e),
                    "Copy the texture value of the head from its source page",
                )];
            }
        };

        let has_textures = serde_json::from_slice::<serde_json::Value>(&decoded)
            .ok()
            .map_or(false, |v| v.get("textures").map_or(false, |t| t.is_object()));

        if has_textures {
            vec![]
        } else {
            vec![violation(
                self,
                row,
                ViolationSeverity::Warning,
                "Texture does not decode to a profile with a 'textures' object".to_string(),
                "Copy the texture value of the head from its source page",
            )]
        }
    }
}

pub struct AttributionRule;

impl ValidationRule for AttributionRule {
    fn name(&self) -> &'static str { "attribution" }

    fn validate(&self, row: &ItemRow) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        if row.author.is_empty() {
            violations.push(violation(
                self,
                row,
                ViolationSeverity::Info,
                "Author is empty".to_string(),
                "Credit the model author in the table",
            ));
        }
        if row.url.is_empty() {
            violations.push(violation(
                self,
                row,
                ViolationSeverity::Info,
                "Source url is empty".to_string(),
                "Link the model source in the table",
            ));
        }
        violations
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
    failure_mode: FailureMode,
}

impl Validator {
    pub fn new(failure_mode: FailureMode) -> Self {
        Self {
            rules: vec![
                Box::new(IdentifierRule),
                Box::new(TextureRule),
                Box::new(AttributionRule),
            ],
            failure_mode,
        }
    }

    pub fn validate(&self, row: &ItemRow) -> ValidationResult {
        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(row))
            .collect();

        let has_errors = violations.iter().any(|v| v.severity == ViolationSeverity::Error);

        match self.failure_mode {
            FailureMode::Block => ValidationResult {
                valid: !has_errors,
                violations,
            },
            // Never block, just record
            FailureMode::Warn | FailureMode::Log => ValidationResult {
                valid: true,
                violations,
            },
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(FailureMode::default())
    }
}
