use adsynth_core::{InsightSet, ThreadSummary};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Substrings (lower-case) that mark a sentence as a complaint.
const PAIN_MARKERS: &[&str] = &[
    "struggle",
    "can't",
    "cannot",
    "hard to",
    "difficult",
    "problem",
    "frustrat",
    "hate",
    "annoying",
    "overwhelm",
    "stuck",
    "distract",
    "procrastinat",
    "burn out",
    "burnout",
];

const STOP_WORDS: &[&str] = &[
    "about", "actually", "after", "again", "also", "always", "anyone", "anything", "been",
    "before", "being", "could", "does", "doing", "done", "each", "even", "every", "from",
    "getting", "going", "have", "having", "here", "into", "just", "know", "like", "make",
    "many", "more", "most", "much", "need", "never", "only", "other", "really", "same", "should",
    "some", "something", "still", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "thing", "things", "think", "this", "those", "through", "time's", "very",
    "want", "well", "were", "what", "when", "where", "which", "while", "will", "with", "would",
    "your", "you're", "yours",
];

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub max_pain_points: usize,
    pub max_trending_terms: usize,
    pub min_sentence_chars: usize,
    pub max_sentence_chars: usize,
    pub min_word_chars: usize,
    pub min_term_occurrences: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_pain_points: 5,
            max_trending_terms: 7,
            min_sentence_chars: 12,
            max_sentence_chars: 200,
            min_word_chars: 4,
            min_term_occurrences: 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InsightExtractor {
    config: ExtractorConfig,
}

impl InsightExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Derives pain points and trending terms from `threads`.
    ///
    /// Deterministic for a given input order. No threads, no insights.
    pub fn extract(&self, threads: &[ThreadSummary]) -> InsightSet {
        let insights = InsightSet {
            pain_points: self.pain_points(threads),
            trending_terms: self.trending_terms(threads),
            source_thread_ids: threads.iter().map(|thread| thread.id.clone()).collect(),
        };

        debug!(
            "Extracted {} pain points and {} trending terms from {} threads",
            insights.pain_points.len(),
            insights.trending_terms.len(),
            threads.len()
        );
        insights
    }

    fn pain_points(&self, threads: &[ThreadSummary]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut points = Vec::new();

        let sentences = threads
            .iter()
            .flat_map(ThreadSummary::texts)
            .flat_map(split_sentences);

        for sentence in sentences {
            if points.len() == self.config.max_pain_points {
                break;
            }
            if sentence.chars().count() < self.config.min_sentence_chars || !is_pain_point(&sentence)
            {
                continue;
            }

            let sentence = truncate(&sentence, self.config.max_sentence_chars);
            if seen.insert(sentence.to_lowercase()) {
                points.push(sentence);
            }
        }
        points
    }

    fn trending_terms(&self, threads: &[ThreadSummary]) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();

        for text in threads.iter().flat_map(ThreadSummary::texts) {
            let words = words(text);
            let keep = |word: &str| self.is_candidate(word);

            for (index, word) in words.iter().enumerate() {
                if !keep(word.as_str()) {
                    continue;
                }
                *counts.entry(word.clone()).or_default() += 1;

                if let Some(next) = words.get(index + 1).filter(|next| keep(next.as_str())) {
                    *counts.entry(format!("{} {}", word, next)).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .filter(|(_, count)| *count >= self.config.min_term_occurrences)
            .collect();
        ranked.sort_by(|(a_term, a_count), (b_term, b_count)| {
            b_count.cmp(a_count).then_with(|| a_term.cmp(b_term))
        });

        ranked
            .into_iter()
            .take(self.config.max_trending_terms)
            .map(|(term, _)| term)
            .collect()
    }

    fn is_candidate(&self, word: &str) -> bool {
        word.chars().count() >= self.config.min_word_chars
            && !STOP_WORDS.contains(&word)
            && !word.chars().all(|c| c.is_ascii_digit())
    }
}

/// Extracts insights with the default thresholds.
pub fn extract(threads: &[ThreadSummary]) -> InsightSet {
    InsightExtractor::default().extract(threads)
}

/// Splits on `.`, `!`, `?` and line breaks, keeping the terminator.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c != '\n' {
            current.push(c);
        }
        if matches!(c, '.' | '!' | '?' | '\n') {
            push_trimmed(&mut sentences, &mut current);
        }
    }
    push_trimmed(&mut sentences, &mut current);
    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, current: &mut String) {
    let sentence = current.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
    current.clear();
}

fn is_pain_point(sentence: &str) -> bool {
    if sentence.ends_with('?') {
        return true;
    }
    let lowered = sentence.to_lowercase().replace('\u{2019}', "'");
    PAIN_MARKERS.iter().any(|marker| lowered.contains(marker))
}

fn truncate(sentence: &str, max_chars: usize) -> String {
    if sentence.chars().count() <= max_chars {
        return sentence.to_string();
    }
    let mut truncated: String = sentence.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|word| word.trim_matches('\''))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(id: &str, title: &str, body: &str, comments: &[&str]) -> ThreadSummary {
        ThreadSummary {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            comments: comments.iter().map(|c| c.to_string()).collect(),
            score: 1,
            url: String::new(),
            num_comments: comments.len() as u32,
        }
    }

    fn sample_threads() -> Vec<ThreadSummary> {
        vec![
            thread(
                "t1",
                "How do you stop procrastinating on deep work?",
                "I keep opening my phone. Deep work sessions never last more than ten minutes.",
                &["Time blocking helped me a lot. Deep work needs a quiet room."],
            ),
            thread(
                "t2",
                "Feeling overwhelmed by my todo list",
                "Every morning I feel stuck. The todo list grows faster than I can finish it!",
                &["Try time blocking with a paper planner.", "ok"],
            ),
        ]
    }

    #[test]
    fn test_empty_input_yields_empty_insights() {
        let insights = extract(&[]);
        assert!(insights.pain_points.is_empty());
        assert!(insights.trending_terms.is_empty());
        assert!(insights.source_thread_ids.is_empty());
        assert!(insights.is_empty());
    }

    #[test]
    fn test_pain_points() {
        let insights = extract(&sample_threads());
        assert_eq!(
            insights.pain_points,
            vec![
                "How do you stop procrastinating on deep work?".to_string(),
                "Feeling overwhelmed by my todo list".to_string(),
                "Every morning I feel stuck.".to_string(),
            ]
        );
    }

    #[test]
    fn test_trending_terms_ranked_by_count_then_alphabetically() {
        let insights = extract(&sample_threads());
        assert_eq!(
            insights.trending_terms,
            vec![
                "deep".to_string(),
                "deep work".to_string(),
                "work".to_string(),
                "blocking".to_string(),
                "list".to_string(),
                "time".to_string(),
                "time blocking".to_string(),
            ]
        );
    }

    #[test]
    fn test_source_ids_cover_every_thread() {
        let insights = extract(&sample_threads());
        let ids: Vec<&str> = insights.source_thread_ids.iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_threads_without_signal_still_record_sources() {
        let insights = extract(&[thread("quiet", "Hi", "", &[])]);
        assert!(insights.pain_points.is_empty());
        assert!(insights.trending_terms.is_empty());
        assert!(!insights.is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let threads = sample_threads();
        assert_eq!(extract(&threads), extract(&threads));
    }

    #[test]
    fn test_duplicates_and_limits() {
        let body = "Why is this so hard? Why is this so hard? WHY IS THIS SO HARD? \
                    I hate mornings a lot. Meetings are a problem for me. \
                    I cannot focus at all. Email is so annoying today. Tabs distract me constantly.";
        let extractor = InsightExtractor::new(ExtractorConfig {
            max_pain_points: 3,
            ..ExtractorConfig::default()
        });

        let insights = extractor.extract(&[thread("d", "", body, &[])]);
        assert_eq!(
            insights.pain_points,
            vec![
                "Why is this so hard?".to_string(),
                "I hate mornings a lot.".to_string(),
                "Meetings are a problem for me.".to_string(),
            ]
        );
    }

    #[test]
    fn test_long_sentences_are_truncated() {
        let long = format!("I struggle with {}.", "a".repeat(300));
        let insights = extract(&[thread("l", "", &long, &[])]);
        let point = &insights.pain_points[0];
        assert_eq!(point.chars().count(), 203);
        assert!(point.ends_with("..."));
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("One. Two!\nThree? four"),
            vec!["One.", "Two!", "Three?", "four"]
        );
    }

    #[test]
    fn test_words_normalize_case_and_apostrophes() {
        assert_eq!(
            words("Can\u{2019}t STOP 'scrolling' 2024"),
            vec!["can't", "stop", "scrolling", "2024"]
        );
    }
}
