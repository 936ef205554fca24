use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::errors::TransformError;

/// Most improvements a transform reports.
pub const MAX_IMPROVEMENTS: usize = 3;

/// Audience the rewritten message is addressed to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    Sequence,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Situation {
    Client,
    CustomerService,
    ExternalComms,
    FeedbackToTeam,
    FeedbackToManagement,
    Personal,
    Complaint,
    #[default]
    Other,
}

impl Situation {
    /// Instruction handed to the rewriter for this audience.
    pub fn template(&self) -> &'static str {
        match self {
            Situation::Client => "Transform into professional, empathetic business communication",
            Situation::CustomerService => {
                "Convert to helpful, empathetic customer service response"
            }
            Situation::ExternalComms => "Change to clear, professional brand communication",
            Situation::FeedbackToTeam => "Change to constructive, supportive team feedback",
            Situation::FeedbackToManagement => {
                "Adapt to respectful, solution-focused upward feedback"
            }
            Situation::Personal | Situation::Complaint => {
                "Modify to caring, considerate personal message"
            }
            Situation::Other => "Transform to professional, empathetic communication",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Situation::Client => "Business Client (B2B)",
            Situation::CustomerService => "Customer Service (B2C)",
            Situation::ExternalComms => "Brand Communications",
            Situation::FeedbackToTeam => "Team Feedback",
            Situation::FeedbackToManagement => "Management Feedback",
            Situation::Personal => "Personal (Family/Friends)",
            Situation::Complaint => "Complaint",
            Situation::Other => "Other Professional",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    Sequence,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Formality {
    #[default]
    Formal,
    Casual,
}

impl Formality {
    pub fn clause(&self) -> &'static str {
        match self {
            Formality::Formal => "professional and polite",
            Formality::Casual => "friendly and warm",
        }
    }
}

/// Tone dial used by older clients in place of [`Formality`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Sequence,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl From<Importance> for Formality {
    fn from(importance: Importance) -> Self {
        match importance {
            Importance::High | Importance::Medium => Formality::Formal,
            Importance::Low => Formality::Casual,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOptions {
    #[serde(default)]
    pub situation: Situation,
    #[serde(default)]
    pub formality: Formality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    pub text: String,
    #[serde(flatten)]
    pub options: TransformOptions,
}

impl TransformRequest {
    pub fn new(text: impl Into<String>, options: TransformOptions) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }

    /// Rejects blank text before any capability is touched.
    pub fn validate(&self) -> Result<(), TransformError> {
        if self.text.trim().is_empty() {
            return Err(TransformError::EmptyInput);
        }
        Ok(())
    }
}

/// Ordered list of at most [`MAX_IMPROVEMENTS`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct Improvements(Vec<String>);

impl Improvements {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for Improvements {
    fn from(mut items: Vec<String>) -> Self {
        items.truncate(MAX_IMPROVEMENTS);
        Self(items)
    }
}

impl<'a> IntoIterator for &'a Improvements {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformResponse {
    pub original_text: String,
    pub transformed_text: String,
    pub improvements: Improvements,
}
