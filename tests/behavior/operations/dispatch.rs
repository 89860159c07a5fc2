use crate::*;
use libtest_mimic::Trial;
use remotefs::client::constants::{FTP_PASSIVE_MODE, PROPERTY_DESTINATION, PROPERTY_URI};
use remotefs::client::{Action, InputContent};
use remotefs::config::ClientConfig;
use remotefs::error::{ErrorKind, Result};
use remotefs::RemoteFsClient;

pub fn tests(config: &ClientConfig, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        config,
        test_unsupported_protocol_never_reaches_transport,
        test_open_failure_skips_send,
        test_uri_matches_endpoint_url,
        test_percent_signs_reach_transport_intact,
        test_endpoint_properties_are_not_mutated,
        test_size_forces_passive_mode,
        test_only_rename_sets_destination,
        test_one_connector_per_call
    ));
}

pub async fn test_unsupported_protocol_never_reaches_transport(config: ClientConfig) -> Result<()> {
    let transport = StubTransport::default();
    let mut http = config.clone();
    http.protocol = "http".to_string();

    let err = match RemoteFsClient::with_transport(&http, transport.clone()) {
        Ok(_) => panic!("http endpoint must be rejected"),
        Err(err) => err,
    };
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(err.to_string(), "only FTP, SFTP and FTPS are supported");
    assert!(transport.opened().is_empty());
    assert!(transport.sent().is_empty());
    Ok(())
}

pub async fn test_open_failure_skips_send(config: ClientConfig) -> Result<()> {
    let (client, transport) = stub_client(&config);
    transport.refuse_open("connection refused");

    let err = client.delete("/x").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("connection refused"));
    assert!(transport.sent().is_empty());
    Ok(())
}

pub async fn test_uri_matches_endpoint_url(config: ClientConfig) -> Result<()> {
    let (client, transport) = stub_client(&config);
    let paths = ["/x.txt", "/my dir/a#b?.txt", "relative/path", ""];

    for path in paths {
        client.delete(path).await?;
    }

    let opened = transport.opened();
    assert_eq!(opened.len(), paths.len());
    for (properties, path) in opened.iter().zip(paths) {
        assert_eq!(
            properties.get(PROPERTY_URI),
            Some(client.endpoint().url(path)?.as_str())
        );
    }
    assert_eq!(
        opened[0].get(PROPERTY_URI),
        Some("sftp://a:b@h:22/x.txt")
    );
    Ok(())
}

pub async fn test_percent_signs_reach_transport_intact(_config: ClientConfig) -> Result<()> {
    let config = ClientConfig::new("ftp", "h")
        .with_port(21)
        .with_basic_auth("a%41", "p%");
    let (client, transport) = stub_client(&config);

    client.delete("/sale/50%20off.txt").await?;

    let opened = transport.opened();
    let uri = opened[0].get(PROPERTY_URI).unwrap();
    assert_eq!(uri, "ftp://a%2541:p%25@h:21/sale/50%2520off.txt");

    let parsed = url::Url::parse(uri).unwrap();
    assert_eq!(urlencoding::decode(parsed.username()).unwrap(), "a%41");
    assert_eq!(
        urlencoding::decode(parsed.password().unwrap()).unwrap(),
        "p%"
    );
    assert_eq!(
        urlencoding::decode(parsed.path()).unwrap(),
        "/sale/50%20off.txt"
    );
    Ok(())
}

pub async fn test_endpoint_properties_are_not_mutated(config: ClientConfig) -> Result<()> {
    let (client, _transport) = stub_client(&config);
    let before = client.endpoint().properties().clone();

    client.size("/x").await?;
    client.rename("/a", "/b").await?;
    client.put("/c", InputContent::text("c")).await?;

    assert_eq!(client.endpoint().properties(), &before);
    assert!(!before.contains_key(PROPERTY_URI));
    assert!(!before.contains_key(PROPERTY_DESTINATION));
    Ok(())
}

pub async fn test_size_forces_passive_mode(config: ClientConfig) -> Result<()> {
    let (client, transport) = stub_client(&config);
    transport.reply(Action::Size, Reply::Complete(vec![Scripted::Size(3)]));

    assert_eq!(client.size("/x").await?, 3);
    let opened = transport.opened();
    assert_eq!(opened[0].get(FTP_PASSIVE_MODE), Some("true"));
    Ok(())
}

pub async fn test_only_rename_sets_destination(config: ClientConfig) -> Result<()> {
    let (client, transport) = stub_client(&config);

    client.rename("/a.txt", "/b.txt").await?;
    client.delete("/a.txt").await?;
    client.mkdir("/d").await?;
    client.put("/a.txt", InputContent::text("x")).await?;

    let opened = transport.opened();
    assert_eq!(
        opened[0].get(PROPERTY_DESTINATION),
        Some(client.endpoint().url("/b.txt")?.as_str())
    );
    assert!(opened[1..]
        .iter()
        .all(|properties| !properties.contains_key(PROPERTY_DESTINATION)));
    Ok(())
}

pub async fn test_one_connector_per_call(config: ClientConfig) -> Result<()> {
    let (client, transport) = stub_client(&config);

    let first = client.mkdir("/d1");
    let second = client.mkdir("/d2");
    second.await?;
    first.await?;

    let actions: Vec<_> = transport.sent().iter().map(|sent| sent.action).collect();
    assert_eq!(actions, [Action::Mkdir, Action::Mkdir]);
    assert_eq!(transport.opened().len(), 2);
    Ok(())
}
