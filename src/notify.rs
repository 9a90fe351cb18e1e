//! Email notification
//!
//! Renders the per-buyer and summary messages and hands them to a [`Mailer`].
//! Sending stops at the first transport failure; nothing is retried.

use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::{debug, error};

use crate::assign::Assignment;
use crate::config::{EmailConfig, SantaConfig, TlsMode};

pub const BUYER_SUBJECT: &str = "Secret Santa";
pub const SUMMARY_SUBJECT: &str = "Secret Santa - Full list";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no sender address configured, set email.from_address or email.smtp_username")]
    MissingSender,
    #[error("participant {0} has no registered address")]
    UnknownParticipant(String),
    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error("could not build message to {recipient}: {source}")]
    Message {
        recipient: String,
        #[source]
        source: lettre::error::Error,
    },
    #[error("could not set up SMTP relay {server}: {source}")]
    Relay {
        server: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },
    #[error("SMTP delivery to {recipient} failed: {source}")]
    Smtp {
        recipient: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },
}

/// A rendered plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letter {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound transport; one call is one transmission.
pub trait Mailer {
    fn send(&mut self, letter: &Letter) -> Result<(), TransportError>;
}

pub(crate) fn parse_address(address: &str) -> Result<Address, TransportError> {
    address
        .trim()
        .parse()
        .map_err(|source| TransportError::Address {
            address: address.to_string(),
            source,
        })
}

/// SMTP delivery through lettre
pub struct SmtpMailer {
    transport: SmtpTransport,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn new(email: &EmailConfig) -> Result<Self, TransportError> {
        let address = email
            .sender_address()
            .ok_or(TransportError::MissingSender)?;
        let name = (!email.from_name.is_empty()).then(|| email.from_name.clone());
        let sender = Mailbox::new(name, parse_address(address)?);

        let relay_error = |source| TransportError::Relay {
            server: email.smtp_server.clone(),
            source,
        };
        let builder = match email.tls {
            TlsMode::Plain => SmtpTransport::builder_dangerous(email.smtp_server.as_str()),
            TlsMode::Starttls => {
                SmtpTransport::starttls_relay(&email.smtp_server).map_err(relay_error)?
            }
            TlsMode::Tls => SmtpTransport::relay(&email.smtp_server).map_err(relay_error)?,
        };

        let mut builder = builder.port(email.smtp_port);
        if email.uses_auth() {
            builder = builder.credentials(Credentials::new(
                email.smtp_username.clone(),
                email.smtp_password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            sender,
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&mut self, letter: &Letter) -> Result<(), TransportError> {
        let to = Mailbox::new(None, parse_address(&letter.to)?);
        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(letter.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(letter.body.clone())
            .map_err(|source| TransportError::Message {
                recipient: letter.to.clone(),
                source,
            })?;

        self.transport
            .send(&message)
            .map_err(|source| TransportError::Smtp {
                recipient: letter.to.clone(),
                source,
            })?;
        Ok(())
    }
}

pub fn render_buyer_message(buyer: &str, recipient: &str, signature: &str) -> String {
    format!(
        "Hi {buyer},\n\
         \n\
         Your Secret Santa recipient is {recipient}\n\
         \n\
         Please don't reply to this message, otherwise I'll know who you got!\n\
         \n\
         Thanks,\n\
         \n\
         {signature}\n"
    )
}

pub fn render_summary_message(assignment: &Assignment) -> String {
    format!(
        "In case anyone forgets, the full list of Secret Santas is as follows:\n\n{}\n",
        assignment.summary_lines().join("\n")
    )
}

/// Sends assignment emails through a borrowed [`Mailer`].
pub struct Notifier<'a, M: Mailer + ?Sized> {
    config: &'a SantaConfig,
    mailer: &'a mut M,
    sent: usize,
}

impl<'a, M: Mailer + ?Sized> Notifier<'a, M> {
    pub fn new(config: &'a SantaConfig, mailer: &'a mut M) -> Self {
        Self {
            config,
            mailer,
            sent: 0,
        }
    }

    /// Messages successfully handed to the mailer so far
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Send `body` to the registered address of `buyer`.
    pub fn send_to_buyer(&mut self, buyer: &str, body: String) -> Result<(), TransportError> {
        let config = self.config;
        let to = config
            .address_of(buyer)
            .ok_or_else(|| TransportError::UnknownParticipant(buyer.to_string()))?;
        self.deliver(Letter {
            to: to.to_string(),
            subject: BUYER_SUBJECT.to_string(),
            body,
        })
    }

    pub fn send_summary(
        &mut self,
        address: &str,
        assignment: &Assignment,
    ) -> Result<(), TransportError> {
        self.deliver(Letter {
            to: address.to_string(),
            subject: SUMMARY_SUBJECT.to_string(),
            body: render_summary_message(assignment),
        })
    }

    /// Tell every buyer who they are buying for, then mail the summary if an
    /// organiser address is configured. Returns the number of messages sent.
    pub fn notify_all(&mut self, assignment: &Assignment) -> Result<usize, TransportError> {
        let config = self.config;
        for (buyer, recipient) in assignment.iter() {
            let body = render_buyer_message(buyer, recipient, &config.email.from_name);
            self.send_to_buyer(buyer, body)?;
        }

        if let Some(address) = config.email.summary_address() {
            debug!(to = address, "sending summary email");
            self.send_summary(address, assignment)?;
        }

        Ok(self.sent)
    }

    fn deliver(&mut self, letter: Letter) -> Result<(), TransportError> {
        debug!(to = %letter.to, subject = %letter.subject, "sending email");
        if let Err(err) = self.mailer.send(&letter) {
            error!(to = %letter.to, "email send failed: {err}");
            return Err(err);
        }
        self.sent += 1;
        Ok(())
    }
}
