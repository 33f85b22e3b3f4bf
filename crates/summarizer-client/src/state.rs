//! The client session: loaded hosts, the selection, the latest results and
//! the single outstanding analysis request.
//!
//! Every load bumps a generation counter and every dispatch carries a
//! [`Ticket`] naming the generation it was issued against. A completion is
//! only applied when its ticket is the outstanding one and its generation is
//! still current, so responses that outlive a reload are dropped.

use summarizer_core::{HostRecord, HostSummary};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Empty,
    Loaded,
    Selecting,
    Analyzing,
    Analyzed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Advisory(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Error(m) | Notice::Advisory(m) => m,
        }
    }
}

/// Handle for one outstanding dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    id: u64,
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What to send: the selected hosts in host-list order.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub ticket: Ticket,
    pub hosts: Vec<HostRecord>,
}

/// How a completion was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied { received: usize, submitted: usize },
    Stale,
}

#[derive(Debug)]
struct InFlight {
    ticket: Ticket,
    submitted: usize,
}

#[derive(Debug, Default)]
pub struct Session {
    hosts: Vec<HostRecord>,
    selection: Selection,
    results: Vec<HostSummary>,
    // Never `Analyzing`; that phase is derived from `in_flight`.
    settled: Phase,
    in_flight: Option<InFlight>,
    generation: u64,
    next_ticket: u64,
    notice: Option<Notice>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight.is_some() {
            Phase::Analyzing
        } else {
            self.settled
        }
    }

    pub fn hosts(&self) -> &[HostRecord] {
        &self.hosts
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn results(&self) -> &[HostSummary] {
        &self.results
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// The result whose `host_id` matches the host at `index`.
    pub fn summary_for(&self, index: usize) -> Option<&HostSummary> {
        let id = self.hosts.get(index)?.identity()?;
        self.results.iter().find(|s| s.host_id == id)
    }

    /// Replace the host list. Selects everything, clears results and
    /// orphans any in-flight request.
    pub fn replace_hosts(&mut self, hosts: Vec<HostRecord>) {
        if let Some(f) = self.in_flight.take() {
            debug!(ticket = f.ticket.id, "host list replaced while analysis in flight");
        }
        self.generation += 1;
        self.selection = Selection::all(hosts.len());
        self.hosts = hosts;
        self.results.clear();
        self.settled = Phase::Loaded;
        self.notice = None;
    }

    /// Apply the outcome of a load. On failure the current hosts are kept.
    pub fn load(&mut self, outcome: Result<Vec<HostRecord>, ClientError>) -> Result<usize, ClientError> {
        match outcome {
            Ok(hosts) => {
                let n = hosts.len();
                self.replace_hosts(hosts);
                Ok(n)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Flip whether host `index` is selected. Returns the new membership.
    pub fn toggle(&mut self, index: usize) -> Result<bool, ClientError> {
        self.check_index(index)?;
        let selected = self.selection.toggle(index);
        self.touch_selection();
        Ok(selected)
    }

    /// Select exactly `indices`, validating all of them first.
    pub fn select_only(&mut self, indices: &[usize]) -> Result<(), ClientError> {
        for &i in indices {
            self.check_index(i)?;
        }
        self.selection.clear();
        for &i in indices {
            if !self.selection.contains(i) {
                self.selection.toggle(i);
            }
        }
        self.touch_selection();
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.selection = Selection::all(self.hosts.len());
        self.touch_selection();
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
        self.touch_selection();
    }

    /// Drop results. Hosts and selection are untouched.
    pub fn clear_results(&mut self) {
        self.results.clear();
        if self.settled == Phase::Analyzed {
            self.settled = Phase::Selecting;
        }
    }

    /// Validate and reserve the single dispatch slot.
    pub fn begin_analysis(&mut self) -> Result<Dispatch, ClientError> {
        if self.in_flight.is_some() {
            return Err(self.fail(ClientError::Busy));
        }
        if self.settled == Phase::Empty || self.hosts.is_empty() {
            return Err(self.fail(ClientError::NothingLoaded));
        }
        if self.selection.is_empty() {
            return Err(self.fail(ClientError::EmptySelection));
        }

        let hosts: Vec<HostRecord> = self.selection.iter().filter_map(|i| self.hosts.get(i).cloned()).collect();
        self.next_ticket += 1;
        let ticket = Ticket { id: self.next_ticket, generation: self.generation };
        self.in_flight = Some(InFlight { ticket, submitted: hosts.len() });
        self.notice = None;
        debug!(ticket = ticket.id, generation = ticket.generation, hosts = hosts.len(), "dispatching analysis");
        Ok(Dispatch { ticket, hosts })
    }

    /// Apply the outcome of the request issued under `ticket`.
    pub fn complete_analysis(
        &mut self,
        ticket: Ticket,
        outcome: Result<Vec<HostSummary>, ClientError>,
    ) -> Result<Completion, ClientError> {
        let current = matches!(&self.in_flight, Some(f) if f.ticket == ticket) && ticket.generation == self.generation;
        if !current {
            debug!(ticket = ticket.id, generation = ticket.generation, "discarding stale analysis response");
            return Ok(Completion::Stale);
        }
        let submitted = self.in_flight.take().map(|f| f.submitted).unwrap_or_default();

        let items = match outcome {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "analysis failed");
                return Err(self.fail(e));
            }
        };
        let received = items.len();
        if received == 0 {
            self.notice = Some(Notice::Advisory("No analysis results returned".into()));
        } else if received < submitted {
            debug!(received, submitted, "partial analysis result");
        }
        self.results = items;
        self.settled = Phase::Analyzed;
        Ok(Completion::Applied { received, submitted })
    }

    fn check_index(&mut self, index: usize) -> Result<(), ClientError> {
        if self.hosts.is_empty() {
            return Err(self.fail(ClientError::NothingLoaded));
        }
        if index >= self.hosts.len() {
            let len = self.hosts.len();
            return Err(self.fail(ClientError::IndexOutOfRange { index, len }));
        }
        Ok(())
    }

    fn touch_selection(&mut self) {
        if self.settled != Phase::Empty {
            self.settled = Phase::Selecting;
        }
    }

    fn fail(&mut self, e: ClientError) -> ClientError {
        self.notice = Some(Notice::Error(e.to_string()));
        e
    }
}
