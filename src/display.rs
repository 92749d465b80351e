//! Transient status text for the control panel.
//!
//! A message is shown until its deadline passes, then the panel falls back to
//! the lift state label. Setting a new message replaces both the text and the
//! deadline, so an older message can never revert a newer one.

use heapless::String as HString;

use crate::config::truncated;

/// Maximum length of a display message.
pub const MAX_MESSAGE_LEN: usize = 48;

/// Bounded display text.
pub type MessageText = HString<MAX_MESSAGE_LEN>;

/// A message with an expiry.
///
/// # Example
///
/// ```rust
/// use rs_lift::DisplayMessage;
///
/// let mut msg = DisplayMessage::new(2000);
/// msg.set("Level 1 requested", 100);
/// assert_eq!(msg.current(1000, "Going Up"), "Level 1 requested");
/// assert_eq!(msg.current(2100, "Going Up"), "Going Up");
/// ```
#[derive(Clone, Debug)]
pub struct DisplayMessage {
    text: MessageText,
    expires_at_ms: Option<u64>,
    revert_after_ms: u64,
}

impl DisplayMessage {
    /// Create an empty message slot whose messages last `revert_after_ms`.
    pub fn new(revert_after_ms: u64) -> Self {
        Self {
            text: MessageText::new(),
            expires_at_ms: None,
            revert_after_ms,
        }
    }

    /// Show `text` from `now_ms` until the revert delay elapses.
    pub fn set(&mut self, text: &str, now_ms: u64) {
        self.text = truncated(text);
        self.expires_at_ms = Some(now_ms.saturating_add(self.revert_after_ms));
    }

    /// Drop the current message immediately.
    pub fn clear(&mut self) {
        self.text.clear();
        self.expires_at_ms = None;
    }

    /// Text to show at `now_ms`; `fallback` once the message has expired.
    pub fn current<'a>(&'a self, now_ms: u64, fallback: &'a str) -> &'a str {
        match self.expires_at_ms {
            Some(deadline) if now_ms < deadline => self.text.as_str(),
            _ => fallback,
        }
    }

    /// True while a message is showing.
    pub fn is_active(&self, now_ms: u64) -> bool {
        matches!(self.expires_at_ms, Some(deadline) if now_ms < deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_shows_fallback() {
        let msg = DisplayMessage::new(2000);
        assert_eq!(msg.current(0, "Idle"), "Idle");
        assert!(!msg.is_active(0));
    }

    #[test]
    fn newer_message_resets_deadline() {
        let mut msg = DisplayMessage::new(2000);
        msg.set("Level 2 requested", 0);
        msg.set("Emergency STOP", 1500);
        assert_eq!(msg.current(2500, "Idle"), "Emergency STOP");
        assert_eq!(msg.current(3500, "Idle"), "Idle");
    }

    #[test]
    fn clear_reverts_immediately() {
        let mut msg = DisplayMessage::new(2000);
        msg.set("Manual up", 0);
        msg.clear();
        assert_eq!(msg.current(1, "Going Up"), "Going Up");
    }

    #[test]
    fn long_text_is_truncated() {
        let mut msg = DisplayMessage::new(2000);
        let long = "x".repeat(100);
        msg.set(&long, 0);
        assert_eq!(msg.current(0, "").len(), MAX_MESSAGE_LEN);
    }
}
