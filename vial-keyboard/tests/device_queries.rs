//! Integration tests against a real keyboard.
//!
//! These tests require a Vial keyboard to be connected.
//! Run with: cargo test -p vial-keyboard --test device_queries -- --ignored --nocapture

use std::sync::Arc;

use vial_keyboard::{KeyboardInfo, KeyboardInterface, SettingsSchema};
use vial_transport::{DeviceFilter, HidDiscovery, ViaSession};

async fn open_keyboard() -> KeyboardInterface {
    let session = Arc::new(ViaSession::new());
    session
        .open(&HidDiscovery::new(), &[DeviceFilter::default()], None)
        .await
        .expect("No keyboard found, plug in a Vial device");
    KeyboardInterface::new(session)
}

#[tokio::test(flavor = "multi_thread")]
#[ignore] // requires hardware
async fn load_real_keyboard() {
    let kb = open_keyboard().await;
    let info = kb.load(KeyboardInfo::default()).await.expect("load failed");

    println!(
        "kbid={:?} via={:?} vial={:?} matrix={}x{} layers={}",
        info.kbid, info.via_proto, info.vial_proto, info.rows, info.cols, info.layers
    );
    assert!(info.is_loaded());
    assert!(info.rows > 0 && info.cols > 0);
}

#[tokio::test(flavor = "multi_thread")]
#[ignore] // requires hardware
async fn read_real_settings() {
    let kb = open_keyboard().await;
    let info = kb.load(KeyboardInfo::default()).await.expect("load failed");
    if !info.capabilities().has_qmk_settings() {
        println!("Vial protocol {:?} has no QMK settings", info.vial_proto);
        return;
    }

    let schema = SettingsSchema::builtin().unwrap();
    let values = kb.load_settings(&info, &schema).await.expect("settings");
    for (qsid, value) in &values {
        println!("qsid {qsid:>3} = {value}");
    }

    kb.session().close().await;
    assert!(!kb.session().is_open().await);
}
