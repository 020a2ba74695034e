//! Link collection manager
//!
//! Holds the signed-in user's links as a read cache of the store. Local
//! state only changes after the store confirms an operation:
//!
//! - `refresh` replaces the list wholesale; on failure the old list stays
//!   (stale but available) and the status becomes `Failed`
//! - `add` puts the new link at the head, keeping newest-first order
//! - `update` replaces a link in place, without re-sorting
//! - `remove` drops a link by id
//!
//! Every refresh carries a sequence number. A completion that is not the
//! latest issued, or that belongs to an owner who is no longer signed in,
//! is discarded. Mutations match links by id, never by position, so a
//! completion that races a refresh cannot clobber the wrong entry.

use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{LinkError, StoreError};
use crate::models::{Link, LinkDraft, LinkPatch, NewLink, OwnerId};
use crate::store::LinkStore;
use crate::validation::{validate_new, validate_patch};

/// Loading state of the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Nobody is signed in
    Idle,
    /// A refresh is in flight
    Loading,
    /// The list mirrors the last successful refresh
    Ready,
    /// The last refresh failed; the list may be stale
    Failed(String),
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient notification for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.to_string(),
        }
    }
}

/// Handle for an issued refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: u64,
    owner: OwnerId,
}

impl RefreshTicket {
    /// The owner whose links should be fetched
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// The sequence number of this refresh
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What happened to a refresh completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The list was replaced
    Applied,
    /// A newer refresh or identity change superseded this one
    Discarded,
}

/// The signed-in user's links
pub struct LinkCollection<S> {
    store: S,
    owner: Option<OwnerId>,
    links: Vec<Link>,
    status: Status,
    last_error: Option<String>,
    refresh_seq: u64,
    notices: Vec<Notice>,
}

impl<S: LinkStore> LinkCollection<S> {
    /// Create an empty, signed-out collection
    pub fn new(store: S) -> Self {
        Self {
            store,
            owner: None,
            links: Vec::new(),
            status: Status::Idle,
            last_error: None,
            refresh_seq: 0,
            notices: Vec::new(),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The signed-in owner
    pub fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    /// The cached links, newest first
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Current loading state
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Message of the last failed operation, cleared when a new one starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Drain pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Find a cached link by id
    pub fn find(&self, id: Uuid) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Resolve a full id or an unambiguous id prefix against the cache
    ///
    /// Returns `None` when nothing matches or the prefix is ambiguous.
    pub fn resolve_id(&self, id_or_prefix: &str) -> Option<Uuid> {
        if let Ok(id) = Uuid::parse_str(id_or_prefix) {
            return Some(id);
        }
        match self.matching_prefix(id_or_prefix).as_slice() {
            [link] => Some(link.id),
            _ => None,
        }
    }

    /// Cached links whose id starts with `prefix`
    ///
    /// An empty prefix matches nothing.
    pub fn matching_prefix(&self, prefix: &str) -> Vec<&Link> {
        if prefix.is_empty() {
            return Vec::new();
        }
        self.links
            .iter()
            .filter(|l| l.id.to_string().starts_with(prefix))
            .collect()
    }

    // ==================== Identity ====================

    /// React to a sign-in, sign-out, or account switch
    ///
    /// A new owner starts from an empty list and triggers a refresh. Signing
    /// out clears the list and invalidates any refresh in flight.
    pub async fn on_identity_change(&mut self, owner: Option<OwnerId>) -> Result<(), LinkError> {
        if owner == self.owner {
            return Ok(());
        }

        self.links.clear();
        self.last_error = None;
        // Invalidate completions issued for the previous identity
        self.refresh_seq += 1;

        match owner {
            Some(owner) => {
                info!("Loading links for {}", owner);
                self.owner = Some(owner);
                self.refresh().await
            }
            None => {
                info!("Signed out; clearing links");
                self.owner = None;
                self.status = Status::Idle;
                Ok(())
            }
        }
    }

    /// Follow an identity channel until its provider goes away
    ///
    /// The current value is applied first. Refresh failures are recorded in
    /// the collection state and do not stop the loop.
    pub async fn follow_identity(&mut self, mut identity: watch::Receiver<Option<OwnerId>>) {
        loop {
            let owner = identity.borrow_and_update().clone();
            if let Err(e) = self.on_identity_change(owner).await {
                debug!("Identity change left collection in error state: {}", e);
            }
            if identity.changed().await.is_err() {
                break;
            }
        }
    }

    // ==================== Refresh ====================

    /// Refresh the list from the store for the signed-in owner
    pub async fn refresh(&mut self) -> Result<(), LinkError> {
        let ticket = self.begin_refresh()?;
        let result = self.store.list_by_owner(ticket.owner()).await;
        self.finish_refresh(ticket, result)?;
        Ok(())
    }

    /// Issue a refresh and mark the collection as loading
    ///
    /// The caller fetches `ticket.owner()`'s links and hands the result to
    /// `finish_refresh`.
    pub fn begin_refresh(&mut self) -> Result<RefreshTicket, LinkError> {
        let owner = self.owner.clone().ok_or(LinkError::SignedOut)?;

        self.refresh_seq += 1;
        self.status = Status::Loading;
        self.last_error = None;
        debug!("Refresh #{} for {}", self.refresh_seq, owner);

        Ok(RefreshTicket {
            seq: self.refresh_seq,
            owner,
        })
    }

    /// Apply the result of a refresh, unless it has been superseded
    ///
    /// A failed fetch that is still current marks the collection `Failed`,
    /// keeps the previous list, and returns the store error.
    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<Link>, StoreError>,
    ) -> Result<RefreshOutcome, StoreError> {
        if ticket.seq != self.refresh_seq || self.owner.as_ref() != Some(&ticket.owner) {
            debug!(
                "Discarding refresh #{} (latest is #{})",
                ticket.seq, self.refresh_seq
            );
            return Ok(RefreshOutcome::Discarded);
        }

        match result {
            Ok(links) => {
                debug!("Refresh #{} loaded {} links", ticket.seq, links.len());
                self.links = links;
                self.status = Status::Ready;
                Ok(RefreshOutcome::Applied)
            }
            Err(e) => {
                warn!("Error fetching links: {}", e);
                self.status = Status::Failed(e.to_string());
                self.fail("Failed to fetch links", "Failed to load your links");
                Err(e)
            }
        }
    }

    // ==================== Mutations ====================

    /// Validate and store a new link, then put it at the head of the list
    pub async fn add(&mut self, fields: NewLink) -> Result<Link, LinkError> {
        let owner = self.owner.clone().ok_or(LinkError::SignedOut)?;
        self.last_error = None;

        let fields = validate_new(fields).map_err(|e| {
            debug!("Rejected new link: {}", e);
            e
        })?;

        match self.store.insert(&owner, &fields).await {
            Ok(link) => {
                self.links.retain(|l| l.id != link.id);
                self.links.insert(0, link.clone());
                self.notices.push(Notice::success("Link added successfully"));
                Ok(link)
            }
            Err(e) => {
                warn!("Error adding link: {}", e);
                self.fail("Failed to add link", "Failed to add link");
                Err(e.into())
            }
        }
    }

    /// Validate and store changes to a link, replacing it in place
    pub async fn update(&mut self, id: Uuid, patch: LinkPatch) -> Result<Link, LinkError> {
        let owner = self.owner.clone().ok_or(LinkError::SignedOut)?;
        self.last_error = None;

        let patch = validate_patch(patch).map_err(|e| {
            debug!("Rejected changes to {}: {}", id, e);
            e
        })?;

        match self.store.update_by_id(id, &owner, &patch).await {
            Ok(link) => {
                if let Some(slot) = self.links.iter_mut().find(|l| l.id == link.id) {
                    *slot = link.clone();
                }
                self.notices.push(Notice::success("Link updated successfully"));
                Ok(link)
            }
            Err(e) => {
                warn!("Error updating link {}: {}", id, e);
                self.fail("Failed to update link", "Failed to update link");
                Err(e.into())
            }
        }
    }

    /// Delete a link and drop it from the list
    pub async fn remove(&mut self, id: Uuid) -> Result<(), LinkError> {
        let owner = self.owner.clone().ok_or(LinkError::SignedOut)?;
        self.last_error = None;

        match self.store.delete_by_id(id, &owner).await {
            Ok(()) => {
                self.links.retain(|l| l.id != id);
                self.notices.push(Notice::success("Link deleted successfully"));
                Ok(())
            }
            Err(e) => {
                warn!("Error deleting link {}: {}", id, e);
                self.fail("Failed to delete link", "Failed to delete link");
                Err(e.into())
            }
        }
    }

    /// Create or edit a link from the editing form
    ///
    /// A draft without an id is added; one with an id replaces every
    /// editable field of that link.
    pub async fn save(&mut self, draft: LinkDraft) -> Result<Link, LinkError> {
        match draft.into_parts() {
            (None, fields) => self.add(fields).await,
            (Some(id), fields) => self.update(id, LinkPatch::from(fields)).await,
        }
    }

    fn fail(&mut self, error: &str, notice: &str) {
        self.last_error = Some(error.to_string());
        self.notices.push(Notice::error(notice));
    }
}
