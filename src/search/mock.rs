//! Scripted page source for unit tests

use super::{PageResponse, PageSource};
use crate::error::{Error, Result};
use crate::types::{BookRecord, PageIndex};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Canned outcome for one call
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Page(PageResponse),
    Transport(&'static str),
    Status(u16),
    Malformed,
}

impl Scripted {
    fn into_result(self) -> Result<PageResponse> {
        match self {
            Scripted::Page(page) => Ok(page),
            Scripted::Transport(message) => Err(Error::transport(message)),
            Scripted::Status(status) => Err(Error::http_status(status, "")),
            Scripted::Malformed => Err(Error::parse("missing field `docs`")),
        }
    }
}

/// Page source answering from a script, falling back to generated pages
///
/// Unscripted calls return `per_page` records per page out of `total` hits,
/// keyed `"{query}:{page}:{i}"`.
#[derive(Debug)]
pub(crate) struct ScriptedSource {
    per_page: u64,
    total: u64,
    scripts: Mutex<HashMap<(String, PageIndex), VecDeque<Scripted>>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<(String, PageIndex)>>,
}

impl ScriptedSource {
    pub(crate) fn new(per_page: u64, total: u64) -> Self {
        Self {
            per_page,
            total,
            scripts: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue outcomes for successive calls of `(query, page)`
    pub(crate) fn script(&self, query: &str, page: PageIndex, outcomes: Vec<Scripted>) {
        self.scripts
            .lock()
            .unwrap()
            .entry((query.to_string(), page))
            .or_default()
            .extend(outcomes);
    }

    /// Delay every response for `query`
    pub(crate) fn delay(&self, query: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
    }

    pub(crate) fn calls(&self) -> Vec<(String, PageIndex)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The page the fallback generator returns
    pub(crate) fn generated(&self, query: &str, page: PageIndex) -> PageResponse {
        let start = u64::from(page - 1) * self.per_page;
        let count = self.per_page.min(self.total.saturating_sub(start));
        let records = (0..count)
            .map(|i| {
                BookRecord::new(
                    format!("{query}:{page}:{i}"),
                    format!("{query} #{}", start + i),
                    vec![format!("Author {i}")],
                )
            })
            .collect();
        PageResponse::new(records, self.total, start)
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, query: &str, page: PageIndex) -> Result<PageResponse> {
        self.calls.lock().unwrap().push((query.to_string(), page));

        let delay = self.delays.lock().unwrap().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&(query.to_string(), page))
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(outcome) => outcome.into_result(),
            None => Ok(self.generated(query, page)),
        }
    }
}
