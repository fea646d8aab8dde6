//! Question routing: statistical, then greeting, then retrieval.
//!
//! Matching is plain substring search on the lower-cased question, so the
//! priority order is what decides ambiguous questions.

use crate::stats::answer_statistical;
use crate::types::KnowledgeRecord;

/// Phrases that mark a greeting.
pub const GREETING_KEYWORDS: [&str; 7] = [
    "hello",
    "hi",
    "hey",
    "what's up",
    "how are you",
    "good morning",
    "good evening",
];

pub const GREETING_RESPONSE: &str = "Hi there! I'm Guardiané. I'm here to help you navigate teen safety, mental health, and digital wellness. What would you like to chat about today?";

/// Where a question should be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Answered from record aggregates
    Statistical(String),
    Greeting,
    /// Needs retrieval and generation
    OpenDomain,
}

pub struct QueryRouter;

impl QueryRouter {
    pub fn route(question: &str, records: &[KnowledgeRecord]) -> Route {
        if let Some(answer) = answer_statistical(question, records) {
            tracing::info!("Routing to statistical answer");
            return Route::Statistical(answer);
        }

        if is_greeting(question) {
            tracing::info!("Routing to greeting");
            return Route::Greeting;
        }

        tracing::info!("Routing to retrieval");
        Route::OpenDomain
    }
}

pub fn is_greeting(question: &str) -> bool {
    let lower = question.to_lowercase();
    GREETING_KEYWORDS.iter().any(|greeting| lower.contains(greeting))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FaqRecord;
    use serde_json::json;

    fn numeric_records() -> Vec<KnowledgeRecord> {
        [10, 20, 30]
            .iter()
            .map(|n| {
                KnowledgeRecord::Faq(FaqRecord {
                    question: String::new(),
                    answer: String::new(),
                    fields: json!({"answer": "", "hours": n}).as_object().cloned().unwrap(),
                })
            })
            .collect()
    }

    #[test]
    fn test_greeting_regardless_of_surrounding_text() {
        assert_eq!(QueryRouter::route("hey, how's it going", &[]), Route::Greeting);
        assert_eq!(QueryRouter::route("Good Morning!", &[]), Route::Greeting);
        assert_eq!(QueryRouter::route("Hello there", &[]), Route::Greeting);
    }

    #[test]
    fn test_statistical_wins_over_greeting() {
        let route = QueryRouter::route("hello, what is the total?", &numeric_records());
        assert_eq!(route, Route::Statistical("The total is 60.".to_string()));
    }

    #[test]
    fn test_statistical_without_numbers_falls_through() {
        assert_eq!(
            QueryRouter::route("hello, what is the total?", &[]),
            Route::Greeting
        );
        assert_eq!(
            QueryRouter::route("What is the average screen time?", &[]),
            Route::OpenDomain
        );
    }

    #[test]
    fn test_open_domain() {
        assert_eq!(
            QueryRouter::route("How can I keep my teen safe online?", &numeric_records()),
            Route::OpenDomain
        );
    }
}
