//! The `send` command.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use mailmate_core::assistant::FALLBACK_CATEGORY;
use mailmate_core::{
    Classifier, ContactDirectory, CredentialStore, Credentials, Dispatcher, Draft, OutgoingMail,
    SmtpTransport,
};
use mailmate_mime::Attachment;
use tracing::{info, warn};

use super::{App, LiveAssistant};
use crate::cli::SendArgs;

/// Classifies with the model when one is configured, otherwise labels
/// everything with the fallback category.
enum SendClassifier {
    Model(LiveAssistant),
    Unavailable,
}

impl Classifier for SendClassifier {
    async fn category(&self, subject: &str, body: &str) -> mailmate_core::Result<String> {
        match self {
            Self::Model(assistant) => assistant.classify(subject, body).await,
            Self::Unavailable => Ok(FALLBACK_CATEGORY.to_string()),
        }
    }
}

pub async fn send(app: &App, args: SendArgs) -> Result<()> {
    let bytes = std::fs::read(&args.draft)
        .with_context(|| format!("failed to read draft {}", args.draft.display()))?;
    let draft: Draft = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a mailmate draft", args.draft.display()))?;

    let receiver = resolve_recipient(&app.contacts(), &args.to)?;

    let (store, stored) = load_stored(app);
    let env_secret = std::env::var(&args.secret_env).ok();
    let credentials = pick_credentials(&stored, args.from.as_deref(), env_secret.as_deref())
        .with_context(|| {
            format!(
                "no sender credentials; pass --from and set ${}, or run `mailmate credentials save`",
                args.secret_env
            )
        })?;

    if args.remember {
        remember(store.as_ref(), &credentials);
    }

    let mut mail = OutgoingMail::new(credentials.identity(), receiver, draft.subject(), draft.body());
    if let Some(path) = &args.attach {
        let attachment = Attachment::from_path(path)
            .with_context(|| format!("failed to read attachment {}", path.display()))?;
        mail = mail.with_attachment(attachment);
    }

    if app.revisions().record(&draft)? {
        info!("Recorded edits to the generated draft");
    }

    let classifier = match app.assistant() {
        Ok(assistant) => SendClassifier::Model(assistant),
        Err(e) => {
            warn!("Classification unavailable: {e:#}");
            SendClassifier::Unavailable
        }
    };
    let dispatcher = Dispatcher::new(
        SmtpTransport::new(app.config.smtp.clone()),
        classifier,
        app.send_log(),
    );

    if args.delay > 0 {
        eprintln!("Sending in {} seconds (Ctrl+C to cancel)...", args.delay);
    }
    let receipt = dispatcher
        .dispatch(&credentials, &mail, Duration::from_secs(args.delay))
        .await?;

    println!(
        "Sent to {} at {} (category: {})",
        mail.receiver, receipt.timestamp, receipt.category
    );
    Ok(())
}

/// Opens the credential store and loads the remembered pair.
///
/// Neither step is fatal: without a usable key there is no store, and an
/// unreadable pair is treated as nothing stored.
fn load_stored(app: &App) -> (Option<CredentialStore>, Credentials) {
    let store = match app.credential_store() {
        Ok(store) => store,
        Err(e) => {
            warn!("Stored credentials unavailable: {e:#}");
            return (None, Credentials::default());
        }
    };

    let stored = store.load().unwrap_or_else(|e| {
        warn!("Ignoring stored credentials: {e}");
        Credentials::default()
    });
    (Some(store), stored)
}

fn remember(store: Option<&CredentialStore>, credentials: &Credentials) {
    let Some(store) = store else {
        warn!("Not remembering credentials: no encryption key");
        return;
    };
    match store.save(credentials) {
        Ok(()) => info!("Remembered credentials for {}", credentials.identity()),
        Err(e) => warn!("Could not remember credentials: {e}"),
    }
}

/// A contact name resolves through the directory; anything with an `@`
/// is taken as an address.
fn resolve_recipient(contacts: &ContactDirectory, to: &str) -> Result<String> {
    if let Some(address) = contacts.get(to)? {
        return Ok(address);
    }
    if to.contains('@') {
        return Ok(to.trim().to_string());
    }
    bail!("unknown contact \"{to}\"; add it with `mailmate contacts add`")
}

/// Combines explicit arguments with the stored pair.
///
/// The stored secret is only reused for the stored identity.
fn pick_credentials(
    stored: &Credentials,
    from: Option<&str>,
    env_secret: Option<&str>,
) -> Option<Credentials> {
    let identity = from.map_or(stored.identity(), str::trim);
    let secret = match env_secret.filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None if identity == stored.identity() => stored.secret(),
        None => "",
    };

    (!identity.is_empty() && !secret.is_empty()).then(|| Credentials::new(identity, secret))
}
