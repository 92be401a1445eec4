use crate::api_types::ChatMessage;
use sam_core::{ChatEntry, HistoryTail, Persona};
use std::sync::Arc;

/// A prompt ready for the chat backend, plus the turn number it was built for.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub turn_number: usize,
    pub messages: Vec<ChatMessage>,
}

/// Builds `[persona, protocol] + history + current turn` prompts.
#[derive(Debug, Clone)]
pub struct ConversationAssembler {
    persona: Arc<Persona>,
    tail: HistoryTail,
}

impl ConversationAssembler {
    pub fn new(persona: Arc<Persona>, tail: HistoryTail) -> Self {
        Self { persona, tail }
    }

    /// `[turn: N] Name (nickname): "message"`
    pub fn format_turn(turn_number: usize, name: &str, nickname: &str, message: &str) -> String {
        format!("[turn: {}] {} ({}): \"{}\"", turn_number, name, nickname, message)
    }

    /// The part of the history that goes into the prompt.
    ///
    /// With `HistoryTail::InFlightIncluded` the last entry is the message
    /// being answered and is left out; it comes back as the current turn.
    pub fn retained_history<'h>(&self, history: &'h [ChatEntry]) -> &'h [ChatEntry] {
        match self.tail {
            HistoryTail::InFlightIncluded => &history[..history.len().saturating_sub(1)],
            HistoryTail::Settled => history,
        }
    }

    pub fn assemble(
        &self,
        name: &str,
        nickname: &str,
        message: &str,
        history: &[ChatEntry],
    ) -> AssembledPrompt {
        let retained = self.retained_history(history);
        let turn_number = retained.len() + 1;

        let mut messages = Vec::with_capacity(retained.len() + 3);
        messages.push(ChatMessage::system(self.persona.personality.clone()));
        messages.push(ChatMessage::system(self.persona.protocol.clone()));
        messages.extend(retained.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(Self::format_turn(
            turn_number,
            name,
            nickname,
            message,
        )));

        AssembledPrompt {
            turn_number,
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sam_core::Role;

    fn assembler(tail: HistoryTail) -> ConversationAssembler {
        ConversationAssembler::new(Arc::new(Persona::with_personality("You are SAM.")), tail)
    }

    fn history(n: usize) -> Vec<ChatEntry> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ChatEntry::user(format!("user {}", i))
                } else {
                    ChatEntry::assistant(format!("reply {}", i))
                }
            })
            .collect()
    }

    #[test]
    fn test_empty_history_is_turn_one() {
        let prompt = assembler(HistoryTail::InFlightIncluded).assemble("Bob", "KingBobby", "hey", &[]);
        assert_eq!(prompt.turn_number, 1);
        assert_eq!(prompt.messages.len(), 3);
        assert_eq!(prompt.messages[0].role, Role::System);
        assert_eq!(prompt.messages[0].content, "You are SAM.");
        assert_eq!(prompt.messages[1].role, Role::System);
        assert!(prompt.messages[1].content.contains("[turn: (turn number)]"));
        assert_eq!(prompt.messages[2].role, Role::User);
        assert_eq!(prompt.messages[2].content, "[turn: 1] Bob (KingBobby): \"hey\"");
    }

    #[test]
    fn test_drops_in_flight_entry() {
        let hist = history(5);
        let prompt = assembler(HistoryTail::InFlightIncluded).assemble(
            "Bob",
            "KingBobby",
            "How are you feeling today?",
            &hist,
        );
        assert_eq!(prompt.turn_number, 5);
        assert_eq!(prompt.messages.len(), 7);
        // History keeps its order and roles; the fifth entry is gone
        assert_eq!(prompt.messages[2].content, "user 0");
        assert_eq!(prompt.messages[3].role, Role::Assistant);
        assert_eq!(prompt.messages[5].content, "reply 3");
        assert_eq!(
            prompt.messages[6].content,
            "[turn: 5] Bob (KingBobby): \"How are you feeling today?\""
        );
    }

    #[test]
    fn test_settled_history_kept_whole() {
        let hist = history(5);
        let prompt = assembler(HistoryTail::Settled).assemble("Bob", "Bobby", "hi", &hist);
        assert_eq!(prompt.turn_number, 6);
        assert_eq!(prompt.messages.len(), 8);
        assert_eq!(prompt.messages[6].content, "user 4");
    }

    #[test]
    fn test_single_entry_history() {
        let hist = history(1);
        let asm = assembler(HistoryTail::InFlightIncluded);
        assert!(asm.retained_history(&hist).is_empty());
        let prompt = asm.assemble("A", "a", "x", &hist);
        assert_eq!(prompt.turn_number, 1);
        assert_eq!(prompt.messages.len(), 3);
    }

    #[test]
    fn test_format_turn_keeps_quotes() {
        assert_eq!(
            ConversationAssembler::format_turn(7, "Bob", "KingBobby", "it's \"fine\""),
            "[turn: 7] Bob (KingBobby): \"it's \"fine\"\""
        );
    }
}
