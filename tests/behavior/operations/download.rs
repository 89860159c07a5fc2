use crate::*;
use futures::TryStreamExt;
use libtest_mimic::Trial;
use remotefs::client::Action;
use remotefs::config::ClientConfig;
use remotefs::error::{ErrorKind, Result};

pub fn tests(config: &ClientConfig, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        config,
        test_get_returns_content,
        test_get_streams_lazily,
        test_get_without_content_is_empty,
        test_get_failure_reports_cause
    ));
}

pub async fn test_get_returns_content(config: ClientConfig) -> Result<()> {
    let (client, transport) = stub_client(&config);
    transport.reply(
        Action::Get,
        Reply::Complete(vec![Scripted::Content(b"ABC".to_vec())]),
    );

    let stream = client.get("/x.txt").await?;
    assert_eq!(stream.read_to_end().await?, b"ABC");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, Action::Get);
    assert!(sent[0].payload.is_none());
    assert_eq!(
        transport.opened()[0].get("uri"),
        Some("sftp://a:b@h:22/x.txt")
    );
    Ok(())
}

pub async fn test_get_streams_lazily(config: ClientConfig) -> Result<()> {
    let (client, transport) = stub_client(&config);
    transport.reply(
        Action::Get,
        Reply::Complete(vec![Scripted::Content(b"chunk".to_vec())]),
    );

    let mut stream = client.get("/x.txt").await?;
    let mut collected = Vec::new();
    while let Some(chunk) = stream.try_next().await? {
        collected.extend_from_slice(&chunk);
    }
    assert_eq!(collected, b"chunk");
    Ok(())
}

pub async fn test_get_without_content_is_empty(config: ClientConfig) -> Result<()> {
    let (client, _transport) = stub_client(&config);

    let stream = client.get("/empty").await?;
    assert!(stream.read_to_end().await?.is_empty());
    Ok(())
}

pub async fn test_get_failure_reports_cause(config: ClientConfig) -> Result<()> {
    let (client, transport) = stub_client(&config);
    transport.reply(
        Action::Get,
        Reply::Fail(vec![], "550 No such file".to_string()),
    );

    let err = client.get("/missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.to_string(), "GET failed: 550 No such file");
    Ok(())
}
