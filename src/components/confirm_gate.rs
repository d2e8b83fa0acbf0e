//! Confirmation Gate
//!
//! Async yes/no prompt for destructive operations. One prompt is open at a
//! time; later requests queue behind it. Answers name the prompt they are
//! for, so a late click can never confirm a different operation.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use futures::channel::oneshot;
use log::{debug, info};

use crate::context::ViewSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromptId(u64);

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the view renders for the open prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub id: PromptId,
    pub title: String,
    pub message: String,
}

struct Pending {
    prompt: Prompt,
    reply: oneshot::Sender<bool>,
}

#[derive(Default)]
struct GateState {
    next_id: u64,
    open: Option<Pending>,
    queue: VecDeque<Pending>,
}

pub struct ConfirmationGate {
    state: RefCell<GateState>,
    sink: Rc<dyn ViewSink>,
}

impl ConfirmationGate {
    pub fn new(sink: Rc<dyn ViewSink>) -> Self {
        Self { state: RefCell::new(GateState::default()), sink }
    }

    /// Suspend until the user answers. Dismissal and a dropped gate count as "no".
    pub async fn ask(&self, title: &str, message: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let prompt = Prompt {
                id: PromptId(state.next_id),
                title: title.to_string(),
                message: message.to_string(),
            };
            debug!("[GATE] queued {} \"{}\"", prompt.id, prompt.title);
            state.queue.push_back(Pending { prompt, reply });
        }
        self.advance();
        answer.await.unwrap_or(false)
    }

    pub fn affirm(&self, id: PromptId) -> bool {
        self.answer(id, true)
    }

    pub fn cancel(&self, id: PromptId) -> bool {
        self.answer(id, false)
    }

    /// Closing the prompt without choosing
    pub fn dismiss(&self, id: PromptId) -> bool {
        self.answer(id, false)
    }

    pub fn current(&self) -> Option<Prompt> {
        self.state.borrow().open.as_ref().map(|p| p.prompt.clone())
    }

    /// Requests waiting behind the open prompt
    pub fn queued(&self) -> usize {
        self.state.borrow().queue.len()
    }

    fn answer(&self, id: PromptId, affirmed: bool) -> bool {
        let pending = {
            let mut state = self.state.borrow_mut();
            match state.open.as_ref() {
                Some(open) if open.prompt.id == id => state.open.take(),
                _ => None,
            }
        };
        let Some(pending) = pending else {
            debug!("[GATE] ignored answer for {}, not the open prompt", id);
            return false;
        };
        info!("[GATE] {} answered {}", id, if affirmed { "yes" } else { "no" });
        // Receiver may be gone; the answer is still consumed
        let _ = pending.reply.send(affirmed);
        self.advance();
        true
    }

    /// Open the next live request if nothing is open
    fn advance(&self) {
        let change = {
            let mut state = self.state.borrow_mut();
            if state.open.is_some() {
                return;
            }
            let mut next = None;
            while let Some(pending) = state.queue.pop_front() {
                if pending.reply.is_canceled() {
                    debug!("[GATE] skipped {}, caller went away", pending.prompt.id);
                    continue;
                }
                next = Some(pending);
                break;
            }
            let prompt = next.as_ref().map(|p| p.prompt.clone());
            state.open = next;
            prompt
        };
        self.sink.prompt_changed(change);
    }
}
