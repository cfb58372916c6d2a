//! Typing cadence for relayed responses
//!
//! Two pacing schemes feed the chat UI's typewriter effect: streamed
//! fragments are re-chunked into fixed word groups with a flat delay,
//! while full texts are written word by word with a delay scaled to word
//! length and punctuation.

use std::time::Duration;

/// Words per flushed group on the streaming tier.
pub const GROUP_SIZE: usize = 3;

/// Flat pause after each flushed word group.
pub const GROUP_DELAY: Duration = Duration::from_millis(100);

/// Delay before writing `word` on the word-by-word tiers.
///
/// The length bucket picks the base delay (50/100/150 ms); punctuation
/// adds a hold on top: 200 ms for sentence enders, 100 ms for pauses.
pub fn word_delay(word: &str) -> Duration {
    let base = if word.len() > 8 {
        150
    } else if word.len() > 4 {
        100
    } else {
        50
    };

    let hold = if word.contains(['.', '!', '?']) {
        200
    } else if word.contains([',', ':']) {
        100
    } else {
        0
    };

    Duration::from_millis(base + hold)
}

/// Buffers stream fragments and emits complete word groups.
///
/// Splitting happens on spaces only, the same delimiter the word-by-word
/// tiers use, so newlines stay glued to their word and markdown structure
/// survives re-chunking. A word is only emitted once the delimiter after
/// it has arrived; fragments ending mid-word are held.
pub struct WordGroups {
    words: Vec<String>,
    partial: String,
}

impl WordGroups {
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            partial: String::new(),
        }
    }

    /// Feed a fragment; returns any groups now ready to write, each with
    /// a trailing space.
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        for ch in fragment.chars() {
            if ch == ' ' {
                if !self.partial.is_empty() {
                    self.words.push(std::mem::take(&mut self.partial));
                }
            } else {
                self.partial.push(ch);
            }
        }

        let mut groups = Vec::new();
        while self.words.len() >= GROUP_SIZE {
            let group: Vec<String> = self.words.drain(..GROUP_SIZE).collect();
            groups.push(format!("{} ", group.join(" ")));
        }
        groups
    }

    /// Remaining buffered text, if any.
    pub fn finish(mut self) -> Option<String> {
        if !self.partial.is_empty() {
            self.words.push(self.partial);
        }
        if self.words.is_empty() {
            None
        } else {
            Some(self.words.join(" "))
        }
    }
}

impl Default for WordGroups {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_delay_buckets() {
        assert_eq!(word_delay("the"), Duration::from_millis(50));
        assert_eq!(word_delay("medium"), Duration::from_millis(100));
        assert_eq!(word_delay("elaborated"), Duration::from_millis(150));
    }

    #[test]
    fn test_word_delay_punctuation_adds() {
        // Length 9 including the final "." -> 150 + 200
        assert_eq!(word_delay("sentence."), Duration::from_millis(350));
        assert_eq!(word_delay("so,"), Duration::from_millis(150));
        assert_eq!(word_delay("note:"), Duration::from_millis(200));
        // Sentence enders win over pause marks
        assert_eq!(word_delay("wait,?"), Duration::from_millis(300));
    }

    #[test]
    fn test_word_delay_monotone() {
        // Longer bucket and stronger punctuation never shorten the delay
        let ladder = ["hm", "medium", "medium,", "medium.", "elaborated."];
        for pair in ladder.windows(2) {
            assert!(
                word_delay(pair[0]) <= word_delay(pair[1]),
                "{} should not outlast {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_groups_of_three() {
        let mut groups = WordGroups::new();
        let flushed = groups.push("one two three four ");
        assert_eq!(flushed, vec!["one two three ".to_string()]);
        assert_eq!(groups.finish(), Some("four".to_string()));
    }

    #[test]
    fn test_holds_incomplete_word() {
        let mut groups = WordGroups::new();
        assert!(groups.push("one two thr").is_empty());
        let flushed = groups.push("ee four ");
        assert_eq!(flushed, vec!["one two three ".to_string()]);
        assert_eq!(groups.finish(), Some("four".to_string()));
    }

    #[test]
    fn test_multiple_groups_in_one_push() {
        let mut groups = WordGroups::new();
        let flushed = groups.push("a b c d e f g ");
        assert_eq!(flushed, vec!["a b c ".to_string(), "d e f ".to_string()]);
        assert_eq!(groups.finish(), Some("g".to_string()));
    }

    #[test]
    fn test_newlines_stay_attached() {
        let mut groups = WordGroups::new();
        let flushed = groups.push("line1\nline2 two three ");
        assert_eq!(flushed, vec!["line1\nline2 two three ".to_string()]);
    }

    #[test]
    fn test_finish_empty() {
        let groups = WordGroups::new();
        assert_eq!(groups.finish(), None);
    }
}
