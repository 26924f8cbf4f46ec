//! The two demo flows: select and initialize
//!
//! Each flow arms a session on the controller, performs its card
//! conversation inside the ready continuation through the command-set
//! collaborator, and terminates the session with a success alert or an error
//! message. Results go to the presenter; a completion receiver lets callers
//! wait for the terminal notification.

use std::sync::{Arc, Weak};

use crossbeam_channel::{Receiver, bounded};
use tagsession::{Disposition, SessionController, TagReader};
use tracing::debug;

use crate::commands::CommandSet;
use crate::credentials::Credentials;
use crate::present::{Presenter, post};

/// Prompt shown while scanning for a card
pub const HOLD_NEAR_PROMPT: &str = "Hold your device near a Status Keycard.";

/// Alert message shown when a flow completes
pub const SUCCESS_MESSAGE: &str = "Success";

/// Error message shown when the card conversation fails
pub const READ_ERROR_MESSAGE: &str = "Read error. Please try again.";

/// Select the card applet and present its status
///
/// Returns a receiver that fires once, when the session has terminated.
pub fn run_select<R, C>(
    controller: &Arc<SessionController<R>>,
    commands: C,
    presenter: Weak<dyn Presenter>,
) -> Receiver<()>
where
    R: TagReader + 'static,
    C: CommandSet<R::Tag>,
{
    let (done_tx, done_rx) = bounded(1);

    let controller_in_ready = Arc::clone(controller);
    let presenter_on_failure = presenter.clone();
    let done_on_failure = done_tx.clone();
    controller.start(
        HOLD_NEAR_PROMPT,
        move |mut tag| {
            let mut commands = commands;
            match commands.select(&mut tag) {
                Ok(info) => {
                    debug!(%info, "applet selected");
                    controller_in_ready
                        .end_session(Disposition::Success(SUCCESS_MESSAGE.to_string()));
                    post(&presenter, &info.to_string());
                }
                Err(e) => {
                    controller_in_ready
                        .end_session(Disposition::Failure(READ_ERROR_MESSAGE.to_string()));
                    post(&presenter, &format!("Error: {e}"));
                }
            }
            let _ = done_tx.send(());
        },
        move |error| {
            post(&presenter_on_failure, &format!("Disconnected: {error}"));
            let _ = done_on_failure.send(());
        },
    );

    done_rx
}

/// Initialize the card with the given credentials
///
/// Selects the applet first, then runs the initialize command, exactly as
/// the original demo does. Returns a receiver that fires once, when the
/// session has terminated.
pub fn run_initialize<R, C>(
    controller: &Arc<SessionController<R>>,
    commands: C,
    credentials: Credentials,
    presenter: Weak<dyn Presenter>,
) -> Receiver<()>
where
    R: TagReader + 'static,
    C: CommandSet<R::Tag>,
{
    let (done_tx, done_rx) = bounded(1);

    let controller_in_ready = Arc::clone(controller);
    let presenter_on_failure = presenter.clone();
    let done_on_failure = done_tx.clone();
    controller.start(
        HOLD_NEAR_PROMPT,
        move |mut tag| {
            let mut commands = commands;
            let outcome = commands
                .select(&mut tag)
                .and_then(|_| commands.init(&mut tag, &credentials));
            match outcome {
                Ok(()) => {
                    debug!("card initialized");
                    controller_in_ready
                        .end_session(Disposition::Success(SUCCESS_MESSAGE.to_string()));
                }
                Err(e) => {
                    controller_in_ready
                        .end_session(Disposition::Failure(READ_ERROR_MESSAGE.to_string()));
                    post(&presenter, &format!("Error: {e}"));
                }
            }
            let _ = done_tx.send(());
        },
        move |error| {
            post(&presenter_on_failure, &format!("Disconnected: {error}"));
            let _ = done_on_failure.send(());
        },
    );

    done_rx
}
