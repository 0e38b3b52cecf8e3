//! Static consequence tables used whenever generated content is unavailable.
//!
//! These are deterministic: the same key always yields the same kinds,
//! targets and values.

use super::{Consequence, ConsequenceSet, DelayedConsequence, DiscoveryTier};

/// Canned lines used when a generated dialogue line is unusable.
pub const FALLBACK_DIALOGUE_LINES: &[&str] = &[
    "I understand. Let me think about this.",
    "That's... interesting. I hadn't considered that perspective.",
    "We should be careful about what we say here.",
    "I'm not sure I can help with that right now.",
    "Things are more complicated than they appear.",
];

/// Narrative for sets that carry no specific story text.
pub const DEFAULT_NARRATIVE: &str = "Your decision has consequences that will unfold over time.";

/// Fallback for a background-building choice, keyed by choice type only.
pub fn choice_fallback(choice_type: &str) -> ConsequenceSet {
    match choice_type {
        "work_priority" => ConsequenceSet::new(
            vec![Consequence::relationship(
                "Supervisor Thane",
                1,
                "Professional approach noted",
            )],
            vec![],
            "Supervisor Thane glances over as you settle in, and gives a short approving nod.",
        ),
        "investigation_start" => ConsequenceSet::new(
            vec![Consequence::trait_tag(
                "observant",
                "Develops keen observation skills",
            )],
            vec![],
            "The routing tables start to look less like noise and more like a pattern.",
        ),
        "discovery_approach" => ConsequenceSet::new(
            vec![Consequence::reputation(
                "Valoria",
                -1,
                "Security breach detected",
            )],
            vec![DelayedConsequence::event(
                "Security review",
                "Investigation launched",
                "72 hours",
            )],
            "Somewhere in the building an access log records your name.",
        ),
        _ => neutral("Minor interaction"),
    }
}

/// Fallback for a resolved discovery. Severity grows with the tier.
///
/// Knowledge is not part of these sets; it is granted by the tier itself.
pub fn discovery_fallback(tier: DiscoveryTier) -> ConsequenceSet {
    match tier {
        DiscoveryTier::Surface => ConsequenceSet::new(
            vec![
                Consequence::reputation("Valoria", -1, "Minor security concern noted"),
                Consequence::trait_tag("aware", "Becomes aware of surveillance"),
            ],
            vec![DelayedConsequence::event(
                "Routine review",
                "Standard questioning",
                "3 days",
            )],
            "You close the logs quickly. Someone is watching the network, and now you know it.",
        ),
        DiscoveryTier::Medium => ConsequenceSet::new(
            vec![Consequence::reputation(
                "Valoria",
                -2,
                "Security breach detected",
            )],
            vec![DelayedConsequence::event(
                "Security review",
                "Formal investigation",
                "72 hours",
            )],
            "The monitoring lists include names you recognise from the floor. Your own access did not go unnoticed.",
        ),
        DiscoveryTier::Deep => ConsequenceSet::new(
            vec![
                Consequence::reputation("Valoria", -3, "Major security breach"),
                Consequence::relationship("Echo Traders", 1, "Potential underground value"),
            ],
            vec![DelayedConsequence::event(
                "Automated alert",
                "Immediate investigation",
                "48 hours",
            )],
            "The full scope of the program unfolds across every region. An automated alert fires before you can log out.",
        ),
    }
}

/// Fallback for the reply chosen after the underground contact reaches out.
pub fn response_fallback(response_key: &str) -> ConsequenceSet {
    match response_key {
        "information_exchange" => ConsequenceSet::new(
            vec![
                Consequence::relationship("Shadow Syndicate", 1, "Professional approach appreciated"),
                Consequence::stat("knowledge", 1, "Gains additional intelligence"),
            ],
            vec![DelayedConsequence::event(
                "Information verification",
                "Blackmailer provides proof of capabilities",
                "24 hours",
            )],
            "The reply arrives within minutes: a fragment of proof, and a promise of more.",
        ),
        "negotiation" => ConsequenceSet::new(
            vec![
                Consequence::relationship("Echo Traders", 2, "Methodical approach valued"),
                Consequence::trait_tag("negotiator", "Develops negotiation skills"),
            ],
            vec![DelayedConsequence::event(
                "Terms discussion",
                "Formal cooperation proposal",
                "48 hours",
            )],
            "Your questions are answered with questions of their own. Terms will follow.",
        ),
        "challenge_response" => ConsequenceSet::new(
            vec![
                Consequence::relationship("Nullbound Coalition", 2, "Direct challenge respected"),
                Consequence::stat("influence", 1, "Gains credibility through boldness"),
            ],
            vec![DelayedConsequence::event(
                "Legitimacy test",
                "Blackmailer demonstrates resistance credentials",
                "12 hours",
            )],
            "The contact seems to respect the challenge. Proof, they say, is coming.",
        ),
        "formal_negotiation" => ConsequenceSet::new(
            vec![
                Consequence::relationship("Shadow Syndicate", 1, "Business approach acknowledged"),
                Consequence::stat("resources", 1, "Strategic positioning improved"),
            ],
            vec![DelayedConsequence::event(
                "Contract terms",
                "Detailed proposal with specific benefits",
                "36 hours",
            )],
            "A detailed proposal is promised. The contact speaks your language.",
        ),
        _ => neutral("Neutral response noted"),
    }
}

fn neutral(description: &str) -> ConsequenceSet {
    ConsequenceSet::new(
        vec![Consequence::reputation("general", 0, description)],
        vec![],
        DEFAULT_NARRATIVE,
    )
}
