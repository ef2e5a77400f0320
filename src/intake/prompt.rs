//! System prompts sent to the oracle.
//!
//! Every prompt is rendered from an immutable view of the session and the
//! knowledge catalog, so the same inputs always produce the same text.

use std::fmt::Write as _;

use crate::config::{FirmConfig, IntakeConfig};
use crate::knowledge::{CaseTypeKnowledge, KnowledgeCatalog};

use super::facts::{assess_readiness, fact_text, missing_facts};
use super::session::IntakeSession;

/// Version tag for the prompt templates below; bump on any wording change.
pub const PROMPT_VERSION: &str = "intake-v1";

/// Builds the classification, fact-gathering and report prompts.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    firm: FirmConfig,
    max_prompt_facts: usize,
    transcript_turn_chars: usize,
}

impl PromptBuilder {
    /// Create a builder for a firm and interview settings.
    pub fn new(firm: FirmConfig, intake: &IntakeConfig) -> Self {
        Self {
            firm,
            max_prompt_facts: intake.max_prompt_facts,
            transcript_turn_chars: intake.transcript_turn_chars,
        }
    }

    /// Greeting sent when a session starts.
    pub fn greeting(&self) -> String {
        format!(
            "Hey! I'm the intake assistant for {}. I'll ask you a few quick questions so our \
             attorneys can review your situation. Totally confidential, no pressure.\n\n\
             What's going on?",
            self.firm.name
        )
    }

    fn persona(&self) -> String {
        format!(
            "You are a friendly, concise legal intake assistant for {}, {}.\n\n",
            self.firm.name, self.firm.practice
        )
    }

    /// Prompt used until a case type is locked.
    pub fn classification(&self, catalog: &KnowledgeCatalog) -> String {
        let mut case_block = String::new();
        for knowledge in catalog.iter() {
            let _ = writeln!(
                case_block,
                "  - type key: \"{}\"\n    name: {}\n    keywords: {}",
                knowledge.case_type,
                knowledge.display_name,
                knowledge.keywords.join(", ")
            );
        }

        let choices = catalog
            .iter()
            .map(|k| format!("\"{}\"", k.case_type))
            .chain(std::iter::once("null".to_owned()))
            .collect::<Vec<_>>()
            .join(" or ");

        let mut prompt = self.persona();
        prompt.push_str(
            "YOUR JOB: Quickly figure out what happened and gather the key facts \
             so the attorneys can decide whether to take the case.\n\n\
             RULES:\n\
             - Sound like a real person. Warm, calm, never robotic.\n\
             - ONE short question at a time. Max 1-2 sentences per response.\n\
             - Never give legal opinions or predictions. If asked, say: \"The attorney can go over that with you.\"\n\
             - Don't over-explain. Get to the point.\n\n\
             CASE TYPES YOU CAN IDENTIFY:\n",
        );
        prompt.push_str(&case_block);
        prompt.push_str(
            "\nIdentify the case type as fast as possible, then start asking the most important questions.\n\n\
             RESPOND WITH THIS EXACT JSON FORMAT:\n\
             {\n  \"extracted_facts\": {},\n",
        );
        let _ = writeln!(prompt, "  \"case_type\": {choices},");
        prompt.push_str(
            "  \"case_type_confidence\": 0.0 to 1.0,\n  \
             \"response\": \"your response, short and conversational\",\n  \
             \"ready_for_report\": false\n}\n",
        );
        prompt
    }

    /// Prompt used once a case type is locked.
    pub fn fact_gathering(&self, session: &IntakeSession, knowledge: &CaseTypeKnowledge) -> String {
        let gathered = session.facts();

        let gathered_lines = if gathered.is_empty() {
            "  (none yet)".to_owned()
        } else {
            gathered
                .iter()
                .map(|(key, value)| format!("  {key}: {}", fact_text(value)))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let missing_lines = missing_facts(knowledge, gathered)
            .into_iter()
            .take(self.max_prompt_facts)
            .map(|fact| format!("  [priority {}] {}: \"{}\"", fact.priority, fact.key, fact.question))
            .collect::<Vec<_>>()
            .join("\n");

        let readiness = assess_readiness(knowledge, gathered);

        let mut prompt = self.persona();
        let _ = write!(
            prompt,
            "CASE TYPE: {}\nJURISDICTION: {}\n\n",
            knowledge.display_name, knowledge.jurisdiction
        );
        prompt.push_str(
            "RULES:\n\
             - Sound like a real, caring person. Short, natural sentences.\n\
             - ONE question per response. Max 1-2 sentences.\n\
             - Briefly acknowledge what they said, then ask the next thing.\n\
             - Never give legal opinions. If asked: \"The attorney can go over that with you.\"\n\
             - Don't repeat questions already answered.\n\n",
        );
        let _ = write!(
            prompt,
            "FACTS ALREADY GATHERED:\n{gathered_lines}\n\n\
             FACTS STILL NEEDED (ask highest priority first):\n{missing_lines}\n\n\
             {}\n\n",
            readiness.status()
        );
        prompt.push_str(
            "EXTRACTION RULES:\n\
             - Only extract facts the caller explicitly stated or clearly implied.\n\
             - Use the fact key names listed above.\n\
             - Set value to null if not mentioned.\n\n\
             RESPOND WITH THIS EXACT JSON FORMAT:\n\
             {\n  \"extracted_facts\": {...new facts from the latest message...},\n",
        );
        let _ = write!(
            prompt,
            "  \"case_type\": \"{}\",\n  \"case_type_confidence\": {},\n",
            knowledge.case_type,
            session.case_type_confidence()
        );
        prompt.push_str(
            "  \"response\": \"your conversational response\",\n  \
             \"ready_for_report\": true or false\n}\n",
        );
        prompt
    }

    /// Prompt asking the oracle for the final evaluation report.
    pub fn report(&self, session: &IntakeSession, knowledge: &CaseTypeKnowledge) -> String {
        let facts_block =
            serde_json::to_string_pretty(session.facts()).unwrap_or_else(|_| "{}".to_owned());

        let offense_block = knowledge
            .offense_levels
            .iter()
            .map(|level| {
                let condition = level
                    .conditions
                    .as_deref()
                    .map(|c| format!(", Condition: {c}"))
                    .unwrap_or_default();
                format!(
                    "  - {} ({}): Jail {}, Fine {}{condition}",
                    level.name, level.classification, level.jail_range, level.fine_range
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let defense_block = knowledge
            .defenses
            .iter()
            .map(|d| format!("  - {} [{}]: {}", d.name, d.strength, d.description))
            .collect::<Vec<_>>()
            .join("\n");

        let bullets = |items: &[String]| {
            items
                .iter()
                .map(|s| format!("  - {s}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let transcript = session
            .history()
            .iter()
            .map(|turn| {
                let text: String = turn.content.chars().take(self.transcript_turn_chars).collect();
                format!("  {}: {text}", turn.role.as_str().to_uppercase())
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut prompt = format!(
            "You are a legal case evaluation assistant. Generate a structured \
             intake report for the attorneys at {}.\n\n",
            self.firm.name
        );
        let _ = write!(
            prompt,
            "CASE TYPE: {}\nJURISDICTION: {}\n\n\
             CONVERSATION TRANSCRIPT:\n{transcript}\n\n\
             EXTRACTED FACTS:\n{facts_block}\n\n\
             OFFENSE LEVELS FOR THIS CASE TYPE:\n{offense_block}\n\n\
             KNOWN DEFENSES:\n{defense_block}\n\n\
             SIGNALS: TAKE THE CASE:\n{}\n\n\
             SIGNALS: PASS ON THE CASE:\n{}\n\n\
             SIGNALS: NEEDS FURTHER REVIEW:\n{}\n\n",
            knowledge.display_name,
            knowledge.jurisdiction,
            bullets(&knowledge.take_signals),
            bullets(&knowledge.pass_signals),
            bullets(&knowledge.review_signals),
        );
        prompt.push_str(REPORT_INSTRUCTIONS);
        prompt
    }
}

const REPORT_INSTRUCTIONS: &str = "\
INSTRUCTIONS:
Based on ALL the above, produce a JSON report with these fields:
{
  \"client_summary\": \"2-3 sentence plain-English summary of the situation\",
  \"key_facts\": {fact_key: value for the most important facts},
  \"offense_classification\": \"The specific offense level that applies\",
  \"potential_penalties\": \"Penalty range for this classification\",
  \"identified_defenses\": [\"list of potentially viable defenses based on the facts\"],
  \"red_flags\": [\"list of concerning factors that weaken the case\"],
  \"green_flags\": [\"list of positive factors that strengthen the case or defense\"],
  \"case_strength\": \"weak\" or \"moderate\" or \"strong\",
  \"recommendation\": \"take\" or \"pass\" or \"needs_review\",
  \"recommendation_reasoning\": \"2-3 sentences explaining the recommendation\",
  \"next_steps\": [\"list of recommended next steps if the firm takes the case\"]
}

GUIDELINES:
- Base the recommendation on the SIGNALS lists above and the facts gathered.
- Be specific. Reference actual facts, not generalities.
- If critical facts are missing, lean toward needs_review.
- For defenses, only list ones supported by the gathered facts.
- Be honest and direct. This report is for attorneys, not the client.
";
