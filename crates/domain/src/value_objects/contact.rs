//! Underground contact: method selection, background-specific templates and
//! the record kept once contact is made.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{BackgroundCategory, DialogueOption, DiscoveryTier};

/// Hours the protagonist has to answer. Stored only; nothing acts on expiry.
pub const RESPONSE_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Moderate,
    High,
}

/// How the contact reaches the protagonist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    DelayedMysterious,
    EveningHome,
    ImmediateTerminal,
}

impl ContactMethod {
    /// Fixed mapping from how deep the protagonist dug to how they get contacted.
    pub fn for_tier(tier: DiscoveryTier) -> Self {
        match tier {
            DiscoveryTier::Surface => ContactMethod::DelayedMysterious,
            DiscoveryTier::Medium => ContactMethod::EveningHome,
            DiscoveryTier::Deep => ContactMethod::ImmediateTerminal,
        }
    }

    pub fn timing(&self) -> &'static str {
        match self {
            ContactMethod::DelayedMysterious => "delayed_contact",
            ContactMethod::EveningHome => "evening_19:47",
            ContactMethod::ImmediateTerminal => "during_work",
        }
    }

    pub fn urgency(&self) -> Urgency {
        match self {
            ContactMethod::DelayedMysterious => Urgency::Low,
            ContactMethod::EveningHome => Urgency::Moderate,
            ContactMethod::ImmediateTerminal => Urgency::High,
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            ContactMethod::DelayedMysterious => "mysterious",
            ContactMethod::EveningHome => "professional",
            ContactMethod::ImmediateTerminal => "urgent",
        }
    }

    pub fn knowledge_demonstrated(&self) -> &'static str {
        match self {
            ContactMethod::DelayedMysterious => "hints",
            ContactMethod::EveningHome => "specific",
            ContactMethod::ImmediateTerminal => "comprehensive",
        }
    }

    pub fn location(&self) -> &'static str {
        match self {
            ContactMethod::ImmediateTerminal => "ACN Terminal",
            _ => "Protagonist home",
        }
    }
}

impl fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContactMethod::DelayedMysterious => "delayed_mysterious",
            ContactMethod::EveningHome => "evening_home",
            ContactMethod::ImmediateTerminal => "immediate_terminal",
        };
        f.write_str(s)
    }
}

/// Four-part first message, worded for the protagonist's background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTemplate {
    pub opening: &'static str,
    pub approach: &'static str,
    pub offer: &'static str,
    pub closing: &'static str,
}

impl MessageTemplate {
    pub fn for_background(background: BackgroundCategory) -> Self {
        match background {
            BackgroundCategory::Methodical => MessageTemplate {
                opening: "Your careful documentation of surveillance evidence shows impressive operational security.",
                approach: "Professional approach recognized. Your evidence is valuable if handled correctly.",
                offer: "My network can provide protection and purpose for your documented findings.",
                closing: "Secure channel attached. Consider carefully.",
            },
            BackgroundCategory::Confident => MessageTemplate {
                opening: "Your digital fingerprints are all over EAI Classification Level Seven files. Bold move.",
                approach: "I know because I monitor government surveillance systems. The watchers have watchers.",
                offer: "Your skills, my protection network. Mutual benefit against institutional corruption.",
                closing: "Channel attached. Time is short.",
            },
            BackgroundCategory::Strategic => MessageTemplate {
                opening: "You've identified a profitable information asymmetry regarding technical surveillance.",
                approach: "I represent interests that convert discoveries into advancement opportunities while managing risks.",
                offer: "Cost-benefit analysis: Cooperation provides protection and resources. Resistance provides neither.",
                closing: "Business proposition attached. Review terms.",
            },
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n\n{}\n\n{}\n\n{}",
            self.opening, self.approach, self.offer, self.closing
        )
    }
}

/// Replies offered after first contact, keyed to the response consequence table.
pub fn response_options(background: BackgroundCategory) -> Vec<DialogueOption> {
    let rows: [(&str, &str, &str); 3] = match background {
        BackgroundCategory::Methodical => [
            ("I need to verify your claims systematically", "cautious", "information_exchange"),
            ("What specific protection protocols do you offer?", "professional", "negotiation"),
            ("How do I know this isn't another surveillance layer?", "suspicious", "trust_building"),
        ],
        BackgroundCategory::Confident => [
            ("If you're fighting surveillance, prove your legitimacy", "direct", "challenge_response"),
            ("My family built these networks with integrity - explain your purpose", "principled", "ideological_alignment"),
            ("I'm willing to listen but I won't be used", "assertive", "respect_establishment"),
        ],
        BackgroundCategory::Strategic => [
            ("Define the specific terms and timeline", "business", "formal_negotiation"),
            ("What resources do you control and what capabilities do you require?", "analytical", "resource_assessment"),
            ("I need to evaluate all options before committing", "strategic", "competitive_analysis"),
        ],
    };
    rows.iter()
        .map(|(text, tone, key)| DialogueOption::new(*text, *tone).leading_to(*key))
        .collect()
}

/// Stored once the underground contact has reached out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub method: ContactMethod,
    pub background: BackgroundCategory,
    pub discovery_tier: DiscoveryTier,
    pub contacted_at: DateTime<Utc>,
    pub response_deadline: DateTime<Utc>,
    /// Consequence key of the reply, once the protagonist has answered.
    #[serde(default)]
    pub response: Option<String>,
}

impl ContactRecord {
    pub fn new(
        method: ContactMethod,
        background: BackgroundCategory,
        discovery_tier: DiscoveryTier,
        contacted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            method,
            background,
            discovery_tier,
            contacted_at,
            response_deadline: contacted_at + Duration::hours(RESPONSE_WINDOW_HOURS),
            response: None,
        }
    }
}
