//! ACN colleagues the protagonist can talk to, with their canned lines.

use crate::{Dialogue, DialogueOption};

const DEFAULT_LINE: &str = "I understand what you're saying.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colleague {
    pub name: &'static str,
    pub role: &'static str,
    pub personality: &'static [&'static str],
    pub background: &'static str,
    /// Interaction type to canned line.
    pub dialogue_patterns: &'static [(&'static str, &'static str)],
}

const COLLEAGUES: &[Colleague] = &[
    Colleague {
        name: "Kess Meridian",
        role: "Inter-Regional Coordinator",
        personality: &["observant", "collaborative", "curious"],
        background: "Qadir, adjacent workstation, notices patterns",
        dialogue_patterns: &[
            ("morning_greeting", "Morning, early bird. Those overnight routing errors still showing up?"),
            ("technical_discussion", "Something's definitely off with the Administrative Priority channels."),
            ("concern_expression", "That's... unusual. Those channels are supposed to be rock-solid."),
        ],
    },
    Colleague {
        name: "Supervisor Thane",
        role: "Floor Supervisor",
        personality: &["protective", "efficient", "increasingly_uncomfortable"],
        background: "15-year ACN veteran, values precision",
        dialogue_patterns: &[
            ("assignment_delivery", "Need someone detail-oriented on the Administrative routing analysis."),
            ("task_clarification", "Message volume spikes, unusual routing patterns. Probably system optimization protocols."),
            ("professional_assessment", "Good precision record. Take Terminal 7, isolated access."),
        ],
    },
    Colleague {
        name: "Jorik Thorne",
        role: "Senior Technician",
        personality: &["veteran", "cynical", "historically_aware"],
        background: "30-year ACN veteran, corner workstation",
        dialogue_patterns: &[
            ("historical_context", "Thirty years I've been here. Used to be we actually competed with the other networks."),
            ("subtle_warnings", "Makes you wonder who's really setting the policies."),
            ("mentor_advice", "When the patterns don't match the purpose, someone's changing the rules."),
        ],
    },
    Colleague {
        name: "Mira Chen",
        role: "Junior Technician",
        personality: &["eager", "nervous", "grateful"],
        background: "Recent Bara promotion to Qadir",
        dialogue_patterns: &[
            ("guidance_seeking", "Is this the right way to handle routing discrepancies?"),
            ("procedure_questions", "What's the proper documentation protocol for this?"),
            ("gratitude_expression", "Thank you for explaining that - I want to get everything right."),
        ],
    },
];

impl Colleague {
    pub fn all() -> &'static [Colleague] {
        COLLEAGUES
    }

    pub fn find(name: &str) -> Option<&'static Colleague> {
        let name = name.trim();
        COLLEAGUES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn canned_line(&self, interaction: &str) -> &'static str {
        self.dialogue_patterns
            .iter()
            .find(|(kind, _)| *kind == interaction)
            .map(|(_, line)| *line)
            .unwrap_or(DEFAULT_LINE)
    }

    /// Replies offered after any colleague line.
    pub fn reply_options() -> Vec<DialogueOption> {
        vec![
            DialogueOption::new("Thanks for the information", "professional"),
            DialogueOption::new("I'll look into that", "investigative"),
            DialogueOption::new("Let me know if you notice anything else", "collaborative"),
        ]
    }

    pub fn canned_dialogue(&self, interaction: &str) -> Dialogue {
        Dialogue::new(self.canned_line(interaction), Self::reply_options())
    }
}
