//! Messaging hand-off via deep link.
//!
//! The link has the shape `<scheme>://send?text=<url-encoded>&phone=<digits>`,
//! which WhatsApp and compatible apps understand.

use std::process::Command;

use lapak_core::PhoneNumber;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// The deep link could not be built or opened.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// Nothing on this device handles the link (app not installed, opener missing).
    #[error("no app available to open {scheme}:// links: {reason}")]
    Unavailable {
        /// Link scheme.
        scheme: String,
        /// What went wrong.
        reason: String,
    },

    /// The pieces did not form a valid URL.
    #[error("invalid deep link: {0}")]
    InvalidLink(#[from] url::ParseError),
}

/// Something that can open a deep link in an external app.
pub trait Messenger {
    /// Open `link`.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError::Unavailable`] if no app handles the link.
    fn open(&self, link: &Url) -> Result<(), HandoffError>;
}

impl<M: Messenger + ?Sized> Messenger for &M {
    fn open(&self, link: &Url) -> Result<(), HandoffError> {
        (**self).open(link)
    }
}

/// Build the pre-filled message link.
///
/// # Errors
///
/// Returns [`HandoffError::InvalidLink`] if `scheme` is not a valid URL scheme.
pub fn deep_link(scheme: &str, text: &str, phone: &PhoneNumber) -> Result<Url, HandoffError> {
    let raw = format!(
        "{scheme}://send?text={}&phone={}",
        urlencoding::encode(text),
        phone.digits()
    );
    Ok(Url::parse(&raw)?)
}

/// Opens links by running an external program with the link as its argument
/// (`xdg-open`, `open`, or anything configured).
#[derive(Debug, Clone)]
pub struct CommandMessenger {
    program: String,
}

impl CommandMessenger {
    /// Messenger that runs `program <link>`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Messenger for CommandMessenger {
    #[instrument(skip(self, link), fields(program = %self.program, scheme = link.scheme()))]
    fn open(&self, link: &Url) -> Result<(), HandoffError> {
        let unavailable = |reason: String| HandoffError::Unavailable {
            scheme: link.scheme().to_string(),
            reason,
        };

        let status = Command::new(&self.program)
            .arg(link.as_str())
            .status()
            .map_err(|e| unavailable(format!("failed to run {}: {e}", self.program)))?;

        if !status.success() {
            return Err(unavailable(format!("{} exited with {status}", self.program)));
        }

        debug!("Deep link opened");
        Ok(())
    }
}
