use super::protocol::{Answer, Request, RequestId};
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub request: Request,
    pub waited_ticks: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerMatch {
    /// The answer satisfies the oldest outstanding request, now dequeued.
    Fulfilled(Request),
    /// The answer is for some other request; the oldest one is still open.
    Mismatch { oldest: Request },
    /// A second answer to a request that was already fulfilled.
    Duplicate,
    NothingOutstanding,
}

/// Requests sent to the peer, oldest first, each held until its answer arrives.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    pending: VecDeque<PendingRequest>,
    last_fulfilled: Option<RequestId>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: Request) {
        self.pending.push_back(PendingRequest {
            request,
            waited_ticks: 0,
        });
    }

    pub fn peek(&self) -> Option<&Request> {
        self.pending.front().map(|pending| &pending.request)
    }

    /// Answers must arrive in request order.
    pub fn match_answer(&mut self, answer: &Answer) -> AnswerMatch {
        let already_fulfilled = self.last_fulfilled.is_some_and(|last| {
            last.origin == answer.id_of_request.origin && answer.id_of_request.sequence <= last.sequence
        });
        if already_fulfilled {
            return AnswerMatch::Duplicate;
        }
        match self.pending.front() {
            None => AnswerMatch::NothingOutstanding,
            Some(oldest) if oldest.request.id == answer.id_of_request => match self.pending.pop_front() {
                Some(fulfilled) => {
                    self.last_fulfilled = Some(fulfilled.request.id);
                    AnswerMatch::Fulfilled(fulfilled.request)
                }
                None => AnswerMatch::NothingOutstanding,
            },
            Some(oldest) => AnswerMatch::Mismatch {
                oldest: oldest.request.clone(),
            },
        }
    }

    /// Age the oldest request by one decide tick. Once it has waited
    /// `retry_after` ticks it is returned for re-sending and its age restarts.
    pub fn tick(&mut self, retry_after: u32) -> Option<Request> {
        let oldest = self.pending.front_mut()?;
        oldest.waited_ticks += 1;
        if oldest.waited_ticks >= retry_after.max(1) {
            oldest.waited_ticks = 0;
            return Some(oldest.request.clone());
        }
        None
    }

    pub fn is_waiting_for(&self, id: RequestId) -> bool {
        self.pending.iter().any(|pending| pending.request.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.last_fulfilled = None;
    }
}

/// Answers already given to the peer, so a re-sent request is answered again
/// without executing its command twice.
#[derive(Debug, Clone)]
pub struct AnswerLog {
    answers: BTreeMap<RequestId, Answer>,
    capacity: usize,
}

impl AnswerLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            answers: BTreeMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn remember(&mut self, answer: Answer) {
        self.answers.insert(answer.id_of_request, answer);
        while self.answers.len() > self.capacity {
            self.answers.pop_first();
        }
    }

    pub fn get(&self, id: RequestId) -> Option<&Answer> {
        self.answers.get(&id)
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}
