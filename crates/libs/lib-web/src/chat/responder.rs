//! # Bot Responder
//!
//! Pure mapping from a customer utterance and a snapshot of the active
//! knowledge base to the bot's next move. No I/O, no clock, no randomness:
//! the same inputs always produce the same [`BotReply`].
//!
//! Rules, first match wins:
//!
//! 1. An explicit request for a human ("speak to an agent", "agent", ...) escalates.
//! 2. Text containing a greeting returns the numbered menu.
//! 3. A bare number selects a menu entry; `count + 1` escalates.
//! 4. Free text is scored against every entry; the best entry at or above
//!    the threshold answers.
//! 5. Otherwise the menu is shown again with the agent button offered, or,
//!    with an empty knowledge base, there is no answer.

use lib_core::{ChatSettings, Faq};
use std::collections::HashSet;

const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "greetings",
];

const ESCALATION_PHRASES: &[&str] = &[
    "speak to an agent",
    "speak to agent",
    "speak with an agent",
    "talk to an agent",
    "talk to agent",
    "talk to a human",
    "speak to a human",
    "human agent",
    "live agent",
    "real person",
    "customer care agent",
];

/// Utterances that escalate only when they are the whole message.
const ESCALATION_WORDS: &[&str] = &["agent", "human", "operator"];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "do", "does", "did", "can", "could", "should",
    "would", "what", "where", "when", "why", "how", "i", "my", "me", "to", "for", "of", "in", "on",
    "at",
];

pub const MENU_HEADER: &str = "Hello! How may I help you?\n\nPlease select a question by typing the number:\n\n";
pub const EMPTY_GREETING: &str = "Hello! How may I help you today?";
pub const EMPTY_SELECTION: &str =
    "I'm sorry, no FAQs are currently available. Would you like to speak to an agent?";

/// Tunable scoring thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponderConfig {
    /// Minimum score for a free-text match to be accepted
    pub match_threshold: u32,
    /// Words must be longer than this to count as significant
    pub min_word_len: usize,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self::from(&ChatSettings::default())
    }
}

impl From<&ChatSettings> for ResponderConfig {
    fn from(settings: &ChatSettings) -> Self {
        Self {
            match_threshold: settings.match_threshold,
            min_word_len: settings.min_word_len,
        }
    }
}

/// What the bot should do with a customer utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotReply {
    /// Send `text`; `offer_agent` asks the widget to show the agent button
    Text { text: String, offer_agent: bool },
    /// Hand the session over to a human agent
    Escalate,
    /// Nothing useful to say
    NoAnswer,
}

impl BotReply {
    fn text(text: impl Into<String>) -> Self {
        BotReply::Text { text: text.into(), offer_agent: false }
    }
}

/// Decide the bot's reply. `faqs` must be the active entries in menu order.
pub fn respond(utterance: &str, faqs: &[Faq], config: &ResponderConfig) -> BotReply {
    let text = utterance.trim().to_lowercase();
    let phrase = normalized_phrase(&text);

    if wants_agent(&text, &phrase) {
        return BotReply::Escalate;
    }

    if GREETINGS.iter().any(|greeting| text.contains(greeting)) {
        return BotReply::text(menu_text(faqs));
    }

    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return select(&text, faqs);
    }

    if !text.is_empty() {
        if let Some(faq) = best_match(&text, faqs, config) {
            return BotReply::text(faq.answer.clone());
        }
    }

    if faqs.is_empty() {
        BotReply::NoAnswer
    } else {
        BotReply::Text { text: menu_text(faqs), offer_agent: true }
    }
}

/// Numbered menu of `faqs`, ending with the agent option.
pub fn menu_text(faqs: &[Faq]) -> String {
    if faqs.is_empty() {
        return EMPTY_GREETING.to_string();
    }

    let mut menu = String::from(MENU_HEADER);
    for (index, faq) in faqs.iter().enumerate() {
        menu.push_str(&format!("{}. {}\n", index + 1, faq.question));
    }
    menu.push_str(&format!("\n{}. Speak to an agent", faqs.len() + 1));
    menu
}

fn select(digits: &str, faqs: &[Faq]) -> BotReply {
    if faqs.is_empty() {
        return BotReply::text(EMPTY_SELECTION);
    }

    let agent_option = faqs.len() + 1;
    match digits.parse::<usize>() {
        Ok(choice) if choice == agent_option => BotReply::Escalate,
        Ok(choice) if (1..agent_option).contains(&choice) => BotReply::text(faqs[choice - 1].answer.clone()),
        _ => BotReply::text(format!(
            "Invalid option. Please select a number between 1 and {}.",
            agent_option
        )),
    }
}

fn best_match<'a>(text: &str, faqs: &'a [Faq], config: &ResponderConfig) -> Option<&'a Faq> {
    let words = significant_words(text, config.min_word_len);

    let mut best: Option<&Faq> = None;
    let mut best_score = 0;
    for faq in faqs {
        let score = score(text, &words, faq, config);
        if score > best_score {
            best_score = score;
            best = Some(faq);
        }
    }

    best.filter(|_| best_score >= config.match_threshold)
}

fn score(text: &str, words: &HashSet<String>, faq: &Faq, config: &ResponderConfig) -> u32 {
    let question = faq.question.to_lowercase();
    let keywords = faq.keywords_list();
    let mut score = 0;

    if text.contains(&question) {
        score += 5;
    }
    if question.contains(text) {
        score += 3;
    }
    score += 3 * keywords.iter().filter(|kw| text.contains(kw.as_str())).count() as u32;

    let mut faq_words = significant_words(&question, config.min_word_len);
    for keyword in &keywords {
        faq_words.extend(significant_words(keyword, config.min_word_len));
    }
    score += 2 * words.intersection(&faq_words).count() as u32;

    score
}

fn significant_words(text: &str, min_word_len: usize) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > min_word_len && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

fn wants_agent(text: &str, phrase: &str) -> bool {
    let bare = text.trim_end_matches(|c: char| c.is_ascii_punctuation());
    ESCALATION_WORDS.contains(&bare)
        || ESCALATION_PHRASES.iter().any(|p| contains_phrase(phrase, p))
}

/// Lowercased words joined by single spaces and padded, for whole-word matching.
fn normalized_phrase(text: &str) -> String {
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();
    format!(" {} ", words.join(" "))
}

fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    normalized.contains(&format!(" {} ", phrase))
}
