//! In-memory chat session: conversation context, history, and profile for
//! one user. Trip details parsed from each message stick for later turns.

use tripbot_core::{extract, ConversationContext, ConversationTurn, UserProfile};

pub struct Session {
    pub context: ConversationContext,
    pub history: Vec<ConversationTurn>,
    pub profile: UserProfile,
}

impl Session {
    pub fn new(user_id: &str) -> Self {
        Self {
            context: ConversationContext::new(user_id),
            history: Vec::new(),
            profile: UserProfile {
                user_id: user_id.to_string(),
                ..UserProfile::default()
            },
        }
    }

    /// Folds trip details found in the message into the session context.
    /// Newly stated details replace earlier ones; silence keeps them.
    pub fn absorb_message(&mut self, message: &str) {
        if let Some(destination) = extract::extract_destination(message) {
            self.context.destination = Some(destination);
        }
        if let Some(dates) = extract::extract_date_range(message) {
            self.context.travel_dates = Some(dates);
        }
        if let Some(purpose) = extract::extract_trip_purpose(message) {
            self.context.trip_purpose = Some(purpose.to_string());
        }
    }
}
