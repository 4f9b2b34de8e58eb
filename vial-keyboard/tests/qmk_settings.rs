//! QMK settings discovery, fetch and push against a scripted keyboard

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::FakeKeyboard;
use vial_keyboard::settings::{self, SettingsSchema};
use vial_keyboard::{KeyboardError, KeyboardInfo, KeyboardInterface};
use vial_transport::mock::MockTransport;
use vial_transport::ViaSession;

fn vial6() -> KeyboardInfo {
    KeyboardInfo {
        vial_proto: Some(6),
        ..Default::default()
    }
}

fn gets(transport: &MockTransport) -> Vec<u16> {
    transport
        .sent()
        .iter()
        .filter(|r| r[0] == 0xFE && r[1] == 0x0A)
        .map(|r| u16::from_le_bytes([r[2], r[3]]))
        .collect()
}

#[tokio::test]
async fn discovery_spans_pages() {
    let mut fake = FakeKeyboard::new(1, 1, 1);
    fake.qsids = (1..=20).collect();
    let transport = fake.into_transport();
    let session = ViaSession::with_transport(transport.clone());

    let ids = settings::query_supported(&session).await.unwrap();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());

    let pages: Vec<Vec<u8>> = transport.sent().iter().map(|r| r[..4].to_vec()).collect();
    assert_eq!(pages, vec![vec![0xFE, 0x09, 0, 0], vec![0xFE, 0x09, 16, 0]]);
}

#[tokio::test]
async fn empty_list_yields_no_ids() {
    let session = ViaSession::with_transport(FakeKeyboard::new(1, 1, 1).into_transport());
    assert!(settings::query_supported(&session).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_schema_qsids_are_fetched() {
    let mut fake = FakeKeyboard::new(1, 1, 1);
    fake.qsids = vec![7, 999, 21, 8];
    fake.settings = BTreeMap::from([(7, 200), (21, 0x0180), (8, 0b0101), (999, 1)]);
    let transport = fake.into_transport();
    let kb = KeyboardInterface::new(Arc::new(ViaSession::with_transport(transport.clone())));
    let schema = SettingsSchema::builtin().unwrap();

    let values = kb.load_settings(&vial6(), &schema).await.unwrap();
    assert_eq!(values, BTreeMap::from([(7, 200), (21, 0x0180), (8, 0b0101)]));
    assert_eq!(gets(&transport), vec![7, 21, 8]);
}

#[tokio::test]
async fn refused_reads_are_skipped() {
    let mut fake = FakeKeyboard::new(1, 1, 1);
    fake.qsids = vec![7, 18];
    fake.settings = BTreeMap::from([(7, 175)]);
    let kb = KeyboardInterface::new(Arc::new(ViaSession::with_transport(fake.into_transport())));
    let schema = SettingsSchema::builtin().unwrap();

    let values = kb.load_settings(&vial6(), &schema).await.unwrap();
    assert_eq!(values, BTreeMap::from([(7, 175)]));
}

#[tokio::test]
async fn push_sends_le_qsid_and_value() {
    let transport = FakeKeyboard::new(1, 1, 1).into_transport();
    let kb = KeyboardInterface::new(Arc::new(ViaSession::with_transport(transport.clone())));
    let info = KeyboardInfo {
        settings: Some(BTreeMap::from([(5, 0x12345678)])),
        ..vial6()
    };

    kb.push_setting(&info, 5).await.unwrap();
    let sent = transport.sent();
    assert_eq!(sent[0][..8], [0xFE, 0x0B, 0x05, 0x00, 0x78, 0x56, 0x34, 0x12]);
}

#[tokio::test]
async fn push_without_settings_fails() {
    let transport = FakeKeyboard::new(1, 1, 1).into_transport();
    let kb = KeyboardInterface::new(Arc::new(ViaSession::with_transport(transport.clone())));

    let err = kb.push_setting(&vial6(), 1).await.unwrap_err();
    assert!(matches!(err, KeyboardError::NoSettings));
    assert_eq!(err.to_string(), "No settings available to push");
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test]
async fn reset_and_version_gate() {
    let transport = FakeKeyboard::new(1, 1, 1).into_transport();
    let kb = KeyboardInterface::new(Arc::new(ViaSession::with_transport(transport.clone())));
    let schema = SettingsSchema::builtin().unwrap();

    kb.reset_settings().await.unwrap();
    assert_eq!(transport.sent()[0][..2], [0xFE, 0x0C]);

    let old = KeyboardInfo {
        vial_proto: Some(3),
        ..Default::default()
    };
    assert!(matches!(
        kb.load_settings(&old, &schema).await,
        Err(KeyboardError::NotSupported(_))
    ));
    assert_eq!(transport.sent_count(), 1);
}
