//! Minimal-habit builder for the Lv10 plan
//!
//! The habit name is stripped of frequencies, durations and counts, and the
//! remaining core phrase is looked up in a fixed table of two-minute actions.

use habitus_domain::MinimalHabit;
use regex::Regex;
use std::sync::LazyLock;

/// Quantitative qualifiers removed from habit names, applied in order
static QUANTIFIER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Frequency words ("every morning", "3x/week", "twice a day", "daily")
        r"(?i)\b(?:\d+\s*(?:x|times?)\s*(?:a|per|/)\s*(?:day|week|month)|(?:once|twice)\s+(?:a|per)\s+(?:day|week|month)|(?:every|each)\s+(?:other\s+)?(?:day|morning|evening|night|week|weekday)|(?:per|a)\s+(?:day|week|month)|daily|weekly|nightly|monthly)\b",
        // Durations ("30 minutes", "1.5 hrs")
        r"(?i)\b\d+(?:\.\d+)?\s*(?:minutes?|mins?|hours?|hrs?|seconds?|secs?)\b",
        // Counts and distances ("5km", "20 pages", bare numbers)
        r"(?i)\b\d+(?:\.\d+)?\s*(?:km|kilometers?|miles?|pages?|reps?|sets?|times?|steps?|glasses?|cups?|chapters?)?\b",
        // Connectives left dangling at the end ("meditate for")
        r"(?i)(?:\s+(?:for|of|a|an|the|at|in|on))+\s*$",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

const STOP_CONDITION: &str = "Stop once the action is done or two minutes have passed";

struct MinimalAction {
    keywords: &'static [&'static str],
    cue: &'static str,
    action: &'static str,
    fallback: &'static str,
}

const MINIMAL_ACTIONS: [MinimalAction; 12] = [
    MinimalAction {
        keywords: &["run", "jog"],
        cue: "After your morning coffee",
        action: "Put on your running shoes and step outside the door",
        fallback: "Put on your running shoes",
    },
    MinimalAction {
        keywords: &["walk", "hike"],
        cue: "After lunch",
        action: "Walk to the end of the street and back",
        fallback: "Stand up and walk around the room",
    },
    MinimalAction {
        keywords: &["read"],
        cue: "When you get into bed",
        action: "Open the book and read one page",
        fallback: "Open the book",
    },
    MinimalAction {
        keywords: &["meditat", "breath"],
        cue: "After you sit down at your desk",
        action: "Sit still and take three slow breaths",
        fallback: "Take one slow breath",
    },
    MinimalAction {
        keywords: &["write", "writing", "journal"],
        cue: "After dinner",
        action: "Write one sentence",
        fallback: "Open the notebook",
    },
    MinimalAction {
        keywords: &["push", "squat", "exercise", "workout", "train", "gym"],
        cue: "After you get out of bed",
        action: "Do one push-up",
        fallback: "Get into the push-up position",
    },
    MinimalAction {
        keywords: &["stretch", "yoga"],
        cue: "After you get out of bed",
        action: "Roll out the mat and do one stretch",
        fallback: "Roll out the mat",
    },
    MinimalAction {
        keywords: &["study", "learn", "review"],
        cue: "After you open your laptop",
        action: "Open your notes and review one item",
        fallback: "Open your notes",
    },
    MinimalAction {
        keywords: &["practice", "practise", "play", "guitar", "piano"],
        cue: "After dinner",
        action: "Pick up the instrument and play one phrase",
        fallback: "Take the instrument out of its case",
    },
    MinimalAction {
        keywords: &["clean", "tidy", "declutter"],
        cue: "When you get home",
        action: "Put away one item",
        fallback: "Pick up one item",
    },
    MinimalAction {
        keywords: &["floss"],
        cue: "After brushing your teeth",
        action: "Floss one tooth",
        fallback: "Take out the floss",
    },
    MinimalAction {
        keywords: &["drink", "water", "hydrat"],
        cue: "After you wake up",
        action: "Fill a glass of water",
        fallback: "Take one sip of water",
    },
];

/// Remove frequencies, durations and counts from a habit name
///
/// The result is lowercase with single spaces.
///
/// # Examples
///
/// ```
/// use habitus_babystep::strip_quantifiers;
///
/// assert_eq!(strip_quantifiers("Meditate for 10 minutes daily"), "meditate");
/// assert_eq!(strip_quantifiers("Run 5km every morning"), "run");
/// ```
pub fn strip_quantifiers(name: &str) -> String {
    let mut phrase = name.to_string();
    for pattern in QUANTIFIER_PATTERNS.iter() {
        phrase = pattern.replace_all(&phrase, " ").into_owned();
    }

    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn lookup(core: &str) -> Option<&'static MinimalAction> {
    MINIMAL_ACTIONS.iter().find(|entry| {
        core.split(|c: char| !c.is_alphanumeric())
            .any(|word| entry.keywords.iter().any(|kw| word.starts_with(kw)))
    })
}

/// Build the two-minute version of a habit
pub fn build_minimal_habit(name: &str) -> MinimalHabit {
    let core = strip_quantifiers(name);

    match lookup(&core) {
        Some(entry) => MinimalHabit {
            cue: entry.cue.to_string(),
            action: entry.action.to_string(),
            stop_condition: STOP_CONDITION.to_string(),
            fallback: entry.fallback.to_string(),
        },
        None => MinimalHabit {
            cue: "Right after an existing daily routine".to_string(),
            action: if core.is_empty() {
                "Perform the setup step only".to_string()
            } else {
                format!("Perform the setup step only: get ready to {}", core)
            },
            stop_condition: STOP_CONDITION.to_string(),
            fallback: "Lay out what you will need tomorrow".to_string(),
        },
    }
}
