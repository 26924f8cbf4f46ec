//! Demonstration card application built on the tag-session controller
//!
//! Mirrors the shape of the original mobile demo: a couple of user-facing
//! actions (select/read card status, initialize with credentials) that arm an
//! NFC-style session, talk to the card through an external command-set
//! collaborator, and hand a single human-readable result to a presenter.
//! A scripted radio simulator stands in for platform hardware.

pub mod commands;
pub mod credentials;
pub mod flows;
pub mod info;
pub mod present;
pub mod sim;

pub use commands::{CommandError, CommandSet};
pub use credentials::{Credentials, CredentialsError};
pub use flows::{
    HOLD_NEAR_PROMPT, READ_ERROR_MESSAGE, SUCCESS_MESSAGE, run_initialize, run_select,
};
pub use info::{Capabilities, Capability, CardInfo, Version};
pub use present::{ConsolePresenter, Presenter};
pub use sim::{SimCommandSet, SimReader, SimStep, SimTag};
