//! Dispatch and send-log behavior through the public API.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use mailmate_core::send_log::TIMESTAMP_FORMAT;
use mailmate_core::{
    Classifier, Credentials, Dispatcher, Error, LogEntry, MailError, MailTransport, OutgoingMail,
    Result, SendLog,
};

struct StubTransport {
    reject: bool,
    calls: AtomicUsize,
}

impl StubTransport {
    const fn new(reject: bool) -> Self {
        Self {
            reject,
            calls: AtomicUsize::new(0),
        }
    }
}

impl MailTransport for StubTransport {
    async fn send(
        &self,
        _credentials: &Credentials,
        _mail: &OutgoingMail,
    ) -> std::result::Result<(), MailError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            Err(MailError::Rejected("SMTP error 550: mailbox unavailable".into()))
        } else {
            Ok(())
        }
    }
}

struct KeywordClassifier;

impl Classifier for KeywordClassifier {
    async fn category(&self, subject: &str, _body: &str) -> Result<String> {
        Ok(if subject.contains("homework") { "School" } else { "Work" }.to_string())
    }
}

fn at(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).unwrap()
}

#[tokio::test]
async fn failed_send_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let log = SendLog::new(dir.path().join("sent_log.csv"));
    let dispatcher = Dispatcher::new(StubTransport::new(true), KeywordClassifier, log.clone());

    let mail = OutgoingMail::new("me@example.com", "nobody@example.com", "Hello", "Hi");
    let err = dispatcher
        .dispatch(&Credentials::new("me@example.com", "pw"), &mail, Duration::ZERO)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Mail(MailError::Rejected(_))));
    assert_eq!(err.to_string(), "SMTP error 550: mailbox unavailable");
    assert!(log.query(None).unwrap().is_empty());
}

#[tokio::test]
async fn successful_sends_are_appended_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = SendLog::new(dir.path().join("sent_log.csv"));
    let dispatcher = Dispatcher::new(StubTransport::new(false), KeywordClassifier, log.clone());
    let creds = Credentials::new("me@example.com", "pw");

    for (to, subject) in [
        ("prof@uni.example", "homework 3"),
        ("boss@corp.example", "status"),
        ("prof@uni.example", "homework 4"),
    ] {
        let mail = OutgoingMail::new("me@example.com", to, subject, "body");
        dispatcher.dispatch(&creds, &mail, Duration::ZERO).await.unwrap();
    }

    let subjects: Vec<_> = log
        .query(None)
        .unwrap()
        .into_iter()
        .map(|e| e.subject)
        .collect();
    assert_eq!(subjects, ["homework 3", "status", "homework 4"]);

    assert_eq!(log.query(Some("uni")).unwrap().len(), 2);
    let categories = log.category_counts().unwrap();
    assert_eq!(categories["School"], 2);
    assert_eq!(categories["Work"], 1);
}

#[test]
fn daily_counts_group_by_date() {
    let dir = tempfile::tempdir().unwrap();
    let log = SendLog::new(dir.path().join("sent_log.csv"));

    for ts in [
        "2025-01-01 08:00:00",
        "2025-01-01 17:45:10",
        "2025-01-02 09:15:00",
    ] {
        log.append(&LogEntry::new(
            at(ts),
            "me@example.com",
            "you@example.com",
            "subject",
            "body",
            "Work",
        ))
        .unwrap();
    }

    assert_eq!(
        log.daily_counts().unwrap(),
        vec![
            (NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 2),
            (NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(), 1),
        ]
    );
}

#[test]
fn long_body_preview_is_truncated_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let log = SendLog::new(dir.path().join("sent_log.csv"));
    let body = "あ".repeat(120);

    log.append(&LogEntry::new(
        at("2025-02-03 04:05:06"),
        "me@example.com",
        "you@example.com",
        "long",
        &body,
        "Personal",
    ))
    .unwrap();

    let entries = log.query(None).unwrap();
    assert_eq!(entries[0].body_preview, format!("{}...", "あ".repeat(100)));
}
