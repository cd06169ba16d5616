//! Authentication flow step that shows a user their greeting.
//!
//! The host flow engine calls [`GreetingNode::process`] once the username is
//! known. If the realm's greeting service has something for the user, the
//! node asks the host to display it and wait for an acknowledgement;
//! otherwise the flow moves straight on.

use std::sync::Arc;

use tracing::debug;

use crate::{Greetings, Realm, Result};

/// Label of the single acknowledgement option.
pub const ACKNOWLEDGE_OPTION: &str = "Ok";

/// Message category of a [`Callback::TextOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Information,
    Warning,
    Error,
}

/// Something the host must render to the user and collect a response for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    TextOutput {
        message_type: MessageType,
        message: String,
    },
    Confirmation {
        message_type: MessageType,
        options: Vec<String>,
        default_option: usize,
    },
}

/// What the flow engine should do after a node ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Continue with the next node.
    Next,
    /// Render the callbacks and call the node again with the user's answer.
    Send(Vec<Callback>),
}

/// The slice of flow state the node reads.
#[derive(Debug, Clone, Default)]
pub struct TreeContext {
    /// Username established by an earlier node, if any.
    pub username: Option<String>,
    /// Option the user picked on a returned confirmation callback.
    pub selected_option: Option<usize>,
}

impl TreeContext {
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            selected_option: None,
        }
    }

    pub fn selected(mut self, option: usize) -> Self {
        self.selected_option = Some(option);
        self
    }
}

/// Displays the realm greeting for the current user, if there is one.
pub struct GreetingNode {
    realm: Realm,
    greetings: Arc<Greetings>,
}

impl GreetingNode {
    pub fn new(realm: Realm, greetings: Arc<Greetings>) -> Self {
        Self { realm, greetings }
    }

    /// Run the node.
    ///
    /// Lookup failures are returned as errors and abort the step; they are
    /// never treated as "no greeting".
    pub async fn process(&self, context: &TreeContext) -> Result<Action> {
        if context.selected_option == Some(0) {
            return Ok(Action::Next);
        }

        let Some(username) = context.username.as_deref().filter(|u| !u.is_empty()) else {
            debug!(realm = %self.realm, "no username in flow state, skipping greeting");
            return Ok(Action::Next);
        };

        match self.greetings.get_greeting(&self.realm, username).await? {
            Some(message) => Ok(Action::Send(vec![
                Callback::TextOutput {
                    message_type: MessageType::Information,
                    message,
                },
                Callback::Confirmation {
                    message_type: MessageType::Information,
                    options: vec![ACKNOWLEDGE_OPTION.to_string()],
                    default_option: 0,
                },
            ])),
            None => Ok(Action::Next),
        }
    }
}
