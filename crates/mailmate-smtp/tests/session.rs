//! Scripted SMTP sessions.
//!
//! These tests drive the client against `tokio-test` mock streams that
//! replay server replies and assert the exact bytes the client sends.

#![allow(clippy::unwrap_used)]

use mailmate_smtp::{Address, Client, Error};
use tokio_test::io::Builder;

const GREETING: &[u8] = b"220 smtp.example.com ESMTP ready\r\n";

fn addr(s: &str) -> Address {
    Address::new(s).unwrap()
}

#[tokio::test]
async fn test_plain_auth_and_send() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"EHLO localhost\r\n")
        .read(b"250-smtp.example.com at your service\r\n250-AUTH LOGIN PLAIN\r\n250 8BITMIME\r\n")
        .write(b"AUTH PLAIN AHVzZXJAZXhhbXBsZS5jb20AcHcxMjM=\r\n")
        .read(b"235 2.7.0 Accepted\r\n")
        .write(b"MAIL FROM:<user@example.com> BODY=8BITMIME\r\n")
        .read(b"250 2.1.0 OK\r\n")
        .write(b"RCPT TO:<friend@example.com>\r\n")
        .read(b"250 2.1.5 OK\r\n")
        .write(b"DATA\r\n")
        .read(b"354 Go ahead\r\n")
        .write(b"Subject: Hi\r\n\r\n..leading dot\r\nbye\r\n.\r\n")
        .read(b"250 2.0.0 OK queued\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 2.0.0 closing connection\r\n")
        .build();

    let client = Client::greet(mock).await.unwrap();
    assert_eq!(client.server_info().hostname, "smtp.example.com");

    let client = client.ehlo("localhost").await.unwrap();
    assert!(client.server_info().supports_8bitmime());

    let mut client = client
        .authenticate("user@example.com", "pw123")
        .await
        .unwrap();

    client
        .send_mail(
            &addr("user@example.com"),
            &[addr("friend@example.com")],
            b"Subject: Hi\n\n.leading dot\nbye\n",
        )
        .await
        .unwrap();

    client.quit().await.unwrap();
}

#[tokio::test]
async fn test_login_auth_fallback() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"EHLO localhost\r\n")
        .read(b"250-smtp.example.com\r\n250 AUTH LOGIN\r\n")
        .write(b"AUTH LOGIN\r\n")
        .read(b"334 VXNlcm5hbWU6\r\n")
        .write(b"dXNlcg==\r\n")
        .read(b"334 UGFzc3dvcmQ6\r\n")
        .write(b"c2VjcmV0\r\n")
        .read(b"235 Authentication successful\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Bye\r\n")
        .build();

    let client = Client::greet(mock)
        .await
        .unwrap()
        .ehlo("localhost")
        .await
        .unwrap();
    let client = client.authenticate("user", "secret").await.unwrap();
    client.quit().await.unwrap();
}

#[tokio::test]
async fn test_bad_credentials_surface_server_text() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"EHLO localhost\r\n")
        .read(b"250-smtp.example.com\r\n250 AUTH PLAIN\r\n")
        .write(b"AUTH PLAIN AHUAcA==\r\n")
        .read(b"535 5.7.8 Username and Password not accepted\r\n")
        .build();

    let client = Client::greet(mock)
        .await
        .unwrap()
        .ehlo("localhost")
        .await
        .unwrap();
    let err = client.authenticate("u", "p").await.unwrap_err();

    assert!(err.is_auth_failure());
    assert_eq!(
        err.to_string(),
        "SMTP error 535: 5.7.8 Username and Password not accepted"
    );
}

#[tokio::test]
async fn test_rejected_recipient_resets_transaction() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"EHLO localhost\r\n")
        .read(b"250-smtp.example.com\r\n250 AUTH PLAIN\r\n")
        .write(b"AUTH PLAIN AHUAcA==\r\n")
        .read(b"235 OK\r\n")
        .write(b"MAIL FROM:<u@example.com>\r\n")
        .read(b"250 OK\r\n")
        .write(b"RCPT TO:<nobody@example.com>\r\n")
        .read(b"550 5.1.1 No such user\r\n")
        .write(b"RSET\r\n")
        .read(b"250 OK\r\n")
        .build();

    let client = Client::greet(mock)
        .await
        .unwrap()
        .ehlo("localhost")
        .await
        .unwrap();
    let mut client = client.authenticate("u", "p").await.unwrap();

    let err = client
        .send_mail(&addr("u@example.com"), &[addr("nobody@example.com")], b"x")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Reply { code: 550, .. }));
}

#[tokio::test]
async fn test_no_supported_auth_mechanism() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"EHLO localhost\r\n")
        .read(b"250-smtp.example.com\r\n250 AUTH XOAUTH2\r\n")
        .build();

    let client = Client::greet(mock)
        .await
        .unwrap()
        .ehlo("localhost")
        .await
        .unwrap();
    let err = client.authenticate("u", "p").await.unwrap_err();
    assert!(matches!(err, Error::NotSupported(_)));
}

#[tokio::test]
async fn test_oversized_message_is_refused_locally() {
    let mock = Builder::new()
        .read(GREETING)
        .write(b"EHLO localhost\r\n")
        .read(b"250-smtp.example.com\r\n250-SIZE 10\r\n250 AUTH PLAIN\r\n")
        .write(b"AUTH PLAIN AHUAcA==\r\n")
        .read(b"235 OK\r\n")
        .build();

    let client = Client::greet(mock)
        .await
        .unwrap()
        .ehlo("localhost")
        .await
        .unwrap();
    let mut client = client.authenticate("u", "p").await.unwrap();

    let err = client
        .send_mail(
            &addr("u@example.com"),
            &[addr("v@example.com")],
            b"this message is far too long",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MessageTooLarge { limit: 10, .. }));
}

#[tokio::test]
async fn test_unavailable_greeting() {
    let mock = Builder::new()
        .read(b"421 Service not available\r\n")
        .build();

    let err = Client::greet(mock).await.unwrap_err();
    assert!(matches!(err, Error::Reply { code: 421, .. }));
}
