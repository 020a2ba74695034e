//! Sign-in command handlers

use anyhow::{Context, Result};

use linkhub_core::{AuthProvider, Backend, Config, LinkCollection, Session, SessionAuth, Status};

use crate::output::Output;

/// Sign in and load the new owner's links
pub async fn login(
    config: &Config,
    user_id: String,
    email: Option<String>,
    token: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut auth = SessionAuth::open(config)?;

    let mut session = Session::new(user_id);
    session.email = email;
    session.access_token = token;

    let store = Backend::open(config, Some(&session))?;
    let mut links = LinkCollection::new(store);
    let identity = auth.subscribe();

    let greeting = format!("Signed in as {}", session.display_name());
    auth.sign_in(session).context("Failed to save session")?;
    output.success(&greeting);

    // Dropping the provider closes the channel once the sign-in is applied
    drop(auth);
    links.follow_identity(identity).await;
    output.print_notices(&links.take_notices());

    if let Status::Ready = links.status() {
        output.message(&format!("{} link(s) saved", links.links().len()));
    }
    Ok(())
}

/// Sign out and forget the stored session
pub fn logout(config: &Config, output: &Output) -> Result<()> {
    let mut auth = SessionAuth::open(config)?;
    if auth.session().is_none() {
        output.message("Not signed in.");
        return Ok(());
    }

    auth.sign_out().context("Failed to remove session")?;
    output.success("Signed out");
    Ok(())
}

/// Show who is signed in
pub fn whoami(config: &Config, output: &Output) -> Result<()> {
    let auth = SessionAuth::open(config)?;
    output.print_session(auth.session());
    Ok(())
}
