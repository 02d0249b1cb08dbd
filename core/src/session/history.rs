use crate::config::HistoryPolicy;
use crate::traits::ChatMessage;

/// Bounded conversation history. Exchanges are recorded as a user message
/// followed by an assistant message; eviction drops whole exchanges from the
/// front once the cumulative content length exceeds the policy cap. The
/// newest exchange is never evicted.
#[derive(Debug, Clone)]
pub struct History {
    policy: HistoryPolicy,
    entries: Vec<ChatMessage>,
}

impl History {
    pub fn new(policy: HistoryPolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, prompt: &str, reply: &str) {
        if !self.policy.enabled {
            return;
        }

        self.entries.push(ChatMessage::user(prompt));
        self.entries.push(ChatMessage::assistant(reply));

        while self.total_chars() > self.policy.max_chars && self.entries.len() > 2 {
            self.entries.drain(..2);
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn total_chars(&self) -> usize {
        self.entries.iter().map(|m| m.content.chars().count()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capped(max_chars: usize) -> History {
        History::new(HistoryPolicy {
            enabled: true,
            max_chars,
        })
    }

    #[test]
    fn records_exchange_in_order() {
        let mut history = capped(100);
        history.record("hi", "hello");

        assert_eq!(
            history.messages(),
            &[ChatMessage::user("hi"), ChatMessage::assistant("hello")]
        );
    }

    #[test]
    fn disabled_policy_records_nothing() {
        let mut history = History::new(HistoryPolicy {
            enabled: false,
            max_chars: 100,
        });
        history.record("hi", "hello");

        assert!(history.is_empty());
    }

    #[test]
    fn evicts_oldest_exchanges_beyond_cap() {
        let mut history = capped(20);
        history.record("aaaaa", "bbbbb"); // 10 chars
        history.record("ccccc", "ddddd"); // 20 chars
        history.record("eeeee", "fffff"); // would be 30, drops the first pair

        assert_eq!(history.len(), 4);
        assert_eq!(history.total_chars(), 20);
        assert_eq!(history.messages()[0], ChatMessage::user("ccccc"));
        assert_eq!(history.messages()[3], ChatMessage::assistant("fffff"));
    }

    #[test]
    fn newest_exchange_survives_even_when_oversized() {
        let mut history = capped(10);
        history.record("short", "reply");
        history.record("a much longer prompt than the cap allows", "and a long reply too");

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.messages()[0],
            ChatMessage::user("a much longer prompt than the cap allows")
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut history = capped(100);
        history.record("什么是黑洞", "黑洞是时空区域");

        assert_eq!(history.total_chars(), 12);
    }

    #[test]
    fn clear_empties_the_buffer() {
        let mut history = capped(100);
        history.record("hi", "hello");
        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.total_chars(), 0);
    }
}
