//! Command handlers

pub mod category;
pub mod config;
pub mod link;
pub mod session;

use anyhow::{bail, Result};
use tracing::debug;

use linkhub_core::{AuthProvider, Backend, Config, LinkCollection, LinkError, SessionAuth};

use crate::output::Output;

/// Load the signed-in user's links from the configured backend
pub async fn open_collection(config: &Config, output: &Output) -> Result<LinkCollection<Backend>> {
    let auth = SessionAuth::open(config)?;
    let Some(session) = auth.session() else {
        bail!("Not signed in. Run `linkhub login <user-id>` first.");
    };

    debug!("Opening {} backend for {}", config.backend, session.owner_id);
    let store = Backend::open(config, Some(session))?;
    let mut links = LinkCollection::new(store);

    let result = links.on_identity_change(auth.current_owner()).await;
    settle(&mut links, output, result)?;
    Ok(links)
}

/// Print the notices an operation raised, then hand back its result
pub fn settle<T>(
    links: &mut LinkCollection<Backend>,
    output: &Output,
    result: Result<T, LinkError>,
) -> Result<T> {
    output.print_notices(&links.take_notices());
    Ok(result?)
}
