use crate::*;
use libtest_mimic::Trial;
use remotefs::client::Action;
use remotefs::config::ClientConfig;
use remotefs::error::{ErrorKind, Result};

pub fn tests(config: &ClientConfig, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        config,
        test_list_keeps_transport_order,
        test_list_empty_directory,
        test_list_rejects_foreign_messages
    ));
}

pub async fn test_list_keeps_transport_order(config: ClientConfig) -> Result<()> {
    let (client, transport) = stub_client(&config);
    let entries = vec![
        file_info("/d/a", 1, false),
        file_info("/d/b", 2, false),
        file_info("/d/c", 0, true),
    ];
    transport.reply(
        Action::List,
        Reply::Complete(vec![
            Scripted::Entries(entries[..1].to_vec()),
            Scripted::Entries(entries[1..].to_vec()),
        ]),
    );

    let listed = client.list("/d").await?;
    assert_eq!(listed, entries);
    let names: Vec<_> = listed.iter().map(|info| info.path.as_str()).collect();
    assert_eq!(names, ["/d/a", "/d/b", "/d/c"]);
    assert!(listed[2].is_directory);
    Ok(())
}

pub async fn test_list_empty_directory(config: ClientConfig) -> Result<()> {
    let (client, _transport) = stub_client(&config);

    assert!(client.list("/empty").await?.is_empty());
    Ok(())
}

pub async fn test_list_rejects_foreign_messages(config: ClientConfig) -> Result<()> {
    let (client, transport) = stub_client(&config);
    transport.reply(Action::List, Reply::Complete(vec![Scripted::Size(1)]));

    let err = client.list("/d").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    Ok(())
}
