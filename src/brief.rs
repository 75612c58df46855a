//! The strategy brief: the single immutable input of a pipeline run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BriefError;

/// Rendered in prompts for brief fields left empty.
pub const NOT_SPECIFIED: &str = "not specified";

/// Product or service brief supplied by the caller.
///
/// Serialized with camelCase keys; snake_case keys are accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    #[serde(alias = "product_name")]
    pub product_name: String,
    #[serde(default, alias = "product_description")]
    pub product_description: String,
    #[serde(default, alias = "target_market")]
    pub target_market: String,
    #[serde(default, alias = "current_situation")]
    pub current_situation: String,
    #[serde(default)]
    pub objectives: String,
    #[serde(default)]
    pub competitors: String,
    /// Free-form notes, including text extracted from attached documents.
    #[serde(default, alias = "additional_info")]
    pub additional_info: String,
}

impl Brief {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.product_description = description.into();
        self
    }

    pub fn with_target_market(mut self, target_market: impl Into<String>) -> Self {
        self.target_market = target_market.into();
        self
    }

    pub fn with_current_situation(mut self, situation: impl Into<String>) -> Self {
        self.current_situation = situation.into();
        self
    }

    pub fn with_objectives(mut self, objectives: impl Into<String>) -> Self {
        self.objectives = objectives.into();
        self
    }

    pub fn with_competitors(mut self, competitors: impl Into<String>) -> Self {
        self.competitors = competitors.into();
        self
    }

    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = info.into();
        self
    }

    /// Load a brief from a `.json`, `.yaml` or `.yml` file.
    ///
    /// Files with any other extension are parsed as JSON.
    pub fn from_file(path: &Path) -> Result<Self, BriefError> {
        let content = std::fs::read_to_string(path).map_err(|source| BriefError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let brief: Brief = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };
        brief.validate()?;
        Ok(brief)
    }

    /// A brief must at least name the product.
    pub fn validate(&self) -> Result<(), BriefError> {
        if self.product_name.trim().is_empty() {
            return Err(BriefError::MissingProductName);
        }
        Ok(())
    }

    /// Markdown rendering of every brief field for user prompts.
    pub fn render(&self) -> String {
        format!(
            "## Brief\n\n\
             **Product / service**: {}\n\n\
             **Description**:\n{}\n\n\
             **Target market**:\n{}\n\n\
             **Current situation**:\n{}\n\n\
             **Objectives**:\n{}\n\n\
             **Competitors**:\n{}\n\n\
             **Additional information**:\n{}",
            self.product_name,
            or_unspecified(&self.product_description),
            or_unspecified(&self.target_market),
            or_unspecified(&self.current_situation),
            or_unspecified(&self.objectives),
            or_unspecified(&self.competitors),
            or_unspecified(&self.additional_info),
        )
    }
}

/// `value`, or [`NOT_SPECIFIED`] when blank.
pub fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_SPECIFIED
    } else {
        value
    }
}
