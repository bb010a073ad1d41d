//! Prompt library for savings advice
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/finboard/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Frontmatter carries the generation parameters for each prompt, so an
//! override can tune token budget and temperature together with the wording.
//! Rendering is a pure function of the template and its inputs.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{format_eur, Language, SpendingByCategory, SummaryPayload};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const SAVINGS_ADVICE: &str = include_str!("../../../prompts/savings_advice.md");
    pub const SAVINGS_TIPS: &str = include_str!("../../../prompts/savings_tips.md");
}

/// Number of categories embedded in the localized prompt
pub const TOP_CATEGORY_COUNT: usize = 3;

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptId {
    /// Full category breakdown, English only
    #[serde(alias = "advice")]
    SavingsAdvice,
    /// Top categories only, answered in a requested language
    #[serde(alias = "tips")]
    SavingsTips,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SavingsAdvice => "savings_advice",
            Self::SavingsTips => "savings_tips",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[Self::SavingsAdvice, Self::SavingsTips]
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::SavingsAdvice => defaults::SAVINGS_ADVICE,
            Self::SavingsTips => defaults::SAVINGS_TIPS,
        }
    }
}

impl std::str::FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "savings_advice" | "advice" => Ok(Self::SavingsAdvice),
            "savings_tips" | "tips" => Ok(Self::SavingsTips),
            _ => Err(format!("Unknown prompt: {}", s)),
        }
    }
}

/// Sampling parameters sent with a prompt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    pub version: u32,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl PromptMetadata {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.max_new_tokens,
            temperature: self.temperature,
        }
    }
}

/// A loaded prompt template
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    pub content: String,
    pub is_override: bool,
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Replace `{{name}}` placeholders in a single pass
    ///
    /// Substituted values are never rescanned, so a category called
    /// `{{language}}` stays literal. Unknown placeholders are kept as-is.
    pub fn render(&self, vars: &[(&str, String)]) -> String {
        let mut out = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let name = &after[..end];
                    match vars.iter().find(|(k, _)| *k == name) {
                        Some((_, value)) => out.push_str(value),
                        None => {
                            out.push_str("{{");
                            out.push_str(name);
                            out.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// A rendered prompt ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct InsightPrompt {
    pub id: PromptId,
    pub text: String,
    pub params: GenerationParams,
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a new prompt library with default paths
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if let Entry::Vacant(slot) = self.cache.entry(id) {
            slot.insert(load_prompt(self.override_dir.as_deref(), id)?);
        }
        self.cache
            .get(&id)
            .ok_or_else(|| Error::NotFound(id.as_str().to_string()))
    }

    /// Check if a prompt has an override file
    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_dir
            .as_ref()
            .is_some_and(|dir| dir.join(format!("{}.md", id.as_str())).exists())
    }

    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    /// Render the localized top-categories prompt
    pub fn savings_tips(
        &mut self,
        summary: &SummaryPayload,
        spending: &SpendingByCategory,
        language: Language,
    ) -> Result<InsightPrompt> {
        let prompt = self.get(PromptId::SavingsTips)?;
        let mut vars = summary_vars(summary);
        vars.push(("language", language.as_str().to_string()));
        vars.push(("top_categories", top_categories_line(spending)));
        Ok(InsightPrompt {
            id: PromptId::SavingsTips,
            text: prompt.render(&vars),
            params: prompt.metadata.params(),
        })
    }

    /// Render the full-breakdown prompt
    pub fn savings_advice(
        &mut self,
        summary: &SummaryPayload,
        spending: &SpendingByCategory,
    ) -> Result<InsightPrompt> {
        let prompt = self.get(PromptId::SavingsAdvice)?;
        let mut vars = summary_vars(summary);
        vars.push(("categories", all_categories_line(spending)));
        Ok(InsightPrompt {
            id: PromptId::SavingsAdvice,
            text: prompt.render(&vars),
            params: prompt.metadata.params(),
        })
    }

    /// Render whichever prompt `id` names
    pub fn build(
        &mut self,
        id: PromptId,
        summary: &SummaryPayload,
        spending: &SpendingByCategory,
        language: Language,
    ) -> Result<InsightPrompt> {
        match id {
            PromptId::SavingsTips => self.savings_tips(summary, spending, language),
            PromptId::SavingsAdvice => self.savings_advice(summary, spending),
        }
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Localized savings prompt from the embedded template
pub fn build_prompt(
    summary: &SummaryPayload,
    spending: &SpendingByCategory,
    language: Language,
) -> Result<String> {
    PromptLibrary::embedded_only()
        .savings_tips(summary, spending, language)
        .map(|p| p.text)
}

fn summary_vars(summary: &SummaryPayload) -> Vec<(&'static str, String)> {
    vec![
        ("total_income", format_eur(summary.total_income)),
        ("total_expenses", format_eur(summary.total_expenses)),
        ("savings", format_eur(summary.savings)),
    ]
}

/// `Rent (€1,000.00), Food (€500.00), Other (€500.00)`
fn top_categories_line(spending: &SpendingByCategory) -> String {
    spending
        .top(TOP_CATEGORY_COUNT)
        .iter()
        .map(|c| format!("{} ({})", c.category, format_eur(c.amount)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn all_categories_line(spending: &SpendingByCategory) -> String {
    spending
        .iter()
        .map(|c| format!("{}: {}", c.category, format_eur(c.amount)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finboard").join("prompts").join("overrides"))
}

fn load_prompt(override_dir: Option<&Path>, id: PromptId) -> Result<Prompt> {
    if let Some(dir) = override_dir {
        let override_path = dir.join(format!("{}.md", id.as_str()));
        if override_path.exists() {
            let content = fs::read_to_string(&override_path).map_err(|e| {
                Error::InvalidData(format!("Failed to read prompt override: {}", e))
            })?;
            let (metadata, body) = parse_prompt(&content)?;
            tracing::debug!(prompt = id.as_str(), path = %override_path.display(), "Using prompt override");
            return Ok(Prompt {
                metadata,
                content: body,
                is_override: true,
                override_path: Some(override_path),
            });
        }
    }

    let (metadata, body) = parse_prompt(id.default_content())?;
    Ok(Prompt {
        metadata,
        content: body,
        is_override: false,
        override_path: None,
    })
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}
