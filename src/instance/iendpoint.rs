// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::state::ProbeResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Interface to the HTTPS endpoint an instance publishes on the host.
pub trait IInstanceEndpoint {
    /// GET `path` on the instance published on `port`.  Never fails: a
    /// missing answer is a [`ProbeResponse::Unreachable`].
    fn probe(&self, port: u16, path: &str) -> ProbeResponse;

    /// POST `body` as JSON to `path`
    fn post_json(&self, port: u16, path: &str, body: &serde_json::Value)
        -> Result<HttpReply, Error>;
}

/// Replays canned probe responses, repeating the last one once the script
/// is exhausted.  A POST may switch to a second script.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ScriptedEndpoint {
    probes: std::cell::RefCell<std::collections::VecDeque<ProbeResponse>>,
    last: std::cell::RefCell<ProbeResponse>,
    after_post: std::cell::RefCell<Option<Vec<ProbeResponse>>>,
    posts: std::cell::RefCell<Vec<(u16, String, serde_json::Value)>>,
    reply_status: u16,
}

#[cfg(test)]
impl ScriptedEndpoint {
    pub(crate) fn new(probes: Vec<ProbeResponse>) -> Self {
        Self {
            probes: std::cell::RefCell::new(probes.into()),
            last: std::cell::RefCell::new(ProbeResponse::Unreachable("nothing scripted".to_string())),
            after_post: Default::default(),
            posts: Default::default(),
            reply_status: 200,
        }
    }

    pub(crate) fn after_post(self, probes: Vec<ProbeResponse>) -> Self {
        *self.after_post.borrow_mut() = Some(probes);
        self
    }

    pub(crate) fn replying(mut self, status: u16) -> Self {
        self.reply_status = status;
        self
    }

    pub(crate) fn posts(&self) -> Vec<(u16, String, serde_json::Value)> {
        self.posts.borrow().clone()
    }
}

#[cfg(test)]
impl IInstanceEndpoint for ScriptedEndpoint {
    fn probe(&self, _port: u16, _path: &str) -> ProbeResponse {
        if let Some(next) = self.probes.borrow_mut().pop_front() {
            *self.last.borrow_mut() = next;
        }
        self.last.borrow().clone()
    }

    fn post_json(
        &self,
        port: u16,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<HttpReply, Error> {
        self.posts
            .borrow_mut()
            .push((port, path.to_string(), body.clone()));

        if let Some(next) = self.after_post.borrow_mut().take() {
            *self.probes.borrow_mut() = next.into();
        }

        Ok(HttpReply {
            status: self.reply_status,
            body: String::new(),
        })
    }
}
