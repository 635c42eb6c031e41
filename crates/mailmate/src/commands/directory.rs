//! Contact and credential management.

use std::io::{self, BufRead};

use anyhow::{Context, Result, bail};
use mailmate_core::Credentials;

use super::App;
use crate::cli::{ContactsCmd, CredentialsCmd};

pub fn contacts(app: &App, cmd: ContactsCmd) -> Result<()> {
    let directory = app.contacts();

    match cmd {
        ContactsCmd::List => {
            let contacts = directory.list()?;
            if contacts.is_empty() {
                eprintln!("No contacts.");
            }
            for contact in contacts {
                println!("{}", contact.display());
            }
        }
        ContactsCmd::Add { name, address } => {
            directory.upsert(&name, &address)?;
            println!("Saved {name} <{address}>");
        }
        ContactsCmd::Remove { name } => {
            if directory.remove(&name)? {
                println!("Removed {name}");
            } else {
                eprintln!("No contact named {name}");
            }
        }
    }
    Ok(())
}

pub fn credentials(app: &App, cmd: CredentialsCmd) -> Result<()> {
    let store = app.credential_store()?;

    match cmd {
        CredentialsCmd::Save {
            identity,
            secret_env,
        } => {
            let secret = match std::env::var(&secret_env) {
                Ok(secret) if !secret.is_empty() => secret,
                _ => read_secret_line(&secret_env)?,
            };
            store.save(&Credentials::new(identity.trim(), secret))?;
            println!("Credentials for {} saved.", identity.trim());
        }
        CredentialsCmd::Show => {
            let credentials = store.load()?;
            if credentials.is_empty() {
                println!("No stored credentials.");
            } else {
                println!("identity: {}", credentials.identity());
                println!("secret:   (stored, {} characters)", credentials.secret().chars().count());
            }
        }
        CredentialsCmd::Forget => {
            store.clear()?;
            println!("Stored credentials removed.");
        }
    }
    Ok(())
}

fn read_secret_line(secret_env: &str) -> Result<String> {
    eprintln!("${secret_env} is not set; enter the app password on stdin:");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read app password")?;

    let secret = line.trim_end_matches(['\r', '\n']).to_string();
    if secret.is_empty() {
        bail!("no app password given");
    }
    Ok(secret)
}
