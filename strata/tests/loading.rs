//! Async template loading and the loading indicator.

mod common;

use common::{Harness, LATENCY, plain};
use strata::{Args, LayerError};

#[tokio::test(start_paused = true)]
async fn test_indicator_starts_hidden() {
    let h = Harness::new();
    assert!(!h.layers.is_loading());
    assert!(!h.loading.is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_manual_show_and_hide_nest() {
    let h = Harness::new();

    h.layers.show_loading();
    h.layers.show_loading();
    h.layers.hide_loading();
    assert!(h.loading.is_visible());

    h.layers.hide_loading();
    assert!(!h.loading.is_visible());

    // Extra hides are ignored.
    h.layers.hide_loading();
    h.layers.show_loading();
    assert!(h.loading.is_visible());
    h.layers.hide_loading();
    assert!(!h.loading.is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_loading_guard() {
    let h = Harness::new();
    {
        let _guard = h.layers.loading();
        assert!(h.layers.is_loading());
    }
    assert!(!h.layers.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_async_open_shows_indicator_while_loading() {
    let h = Harness::new();
    h.remote_dialog("DlgShop", plain("DlgShop"));

    let layers = h.layers.clone();
    let open = tokio::spawn(async move { layers.open_dialog_async("DlgShop", Args::new()).await });

    tokio::time::sleep(LATENCY / 2).await;
    assert!(h.loading.is_visible());
    assert!(h.dialogs.is_empty());

    let dialog = open.await.unwrap().unwrap();
    assert!(!h.loading.is_visible());
    assert!(h.dialogs.contains(dialog.node()));
    assert!(h.resources.is_cached("prefab/dialog/DlgShop"));
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_loads_share_indicator() {
    let h = Harness::new();
    h.remote_dialog("DlgShop", plain("DlgShop"));
    h.remote_dialog("DlgBag", plain("DlgBag"));

    let (shop, bag) = tokio::join!(
        h.layers.open_dialog_async("DlgShop", Args::new()),
        async {
            tokio::time::sleep(LATENCY / 2).await;
            assert!(h.loading.is_visible());
            h.layers.open_dialog_async("DlgBag", Args::new()).await
        }
    );

    assert!(shop.is_ok());
    assert!(bag.is_ok());
    assert!(!h.loading.is_visible());
    assert_eq!(h.dialogs.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_async_open_missing_template() {
    let h = Harness::new();

    let err = h
        .layers
        .open_dialog_async("DlgMissing", Args::new())
        .await
        .unwrap_err();

    assert_eq!(err, LayerError::not_found("prefab/dialog/DlgMissing"));
    assert!(h.dialogs.is_empty());
    assert!(!h.loading.is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_unique_async_open_dedups_in_flight() {
    let h = Harness::new();
    h.remote_dialog("DlgShop", plain("DlgShop"));

    let (first, second) = tokio::join!(
        h.layers.open_unique_dialog_async("DlgShop", Args::new()),
        h.layers.open_unique_dialog_async("DlgShop", Args::new()),
    );

    let opened = [first.unwrap(), second.unwrap()]
        .into_iter()
        .filter(Option::is_some)
        .count();
    assert_eq!(opened, 1);
    assert_eq!(h.layers.find_dialogs("DlgShop").len(), 1);
    assert_eq!(h.resources.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unique_async_open_skips_when_open() {
    let h = Harness::new();
    h.cache_dialog("DlgShop", plain("DlgShop"));
    h.layers.open_dialog("DlgShop", Args::new()).unwrap();

    let opened = h
        .layers
        .open_unique_dialog_async("DlgShop", Args::new())
        .await
        .unwrap();

    assert!(opened.is_none());
    assert_eq!(h.resources.fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unique_async_open_rechecks_after_load() {
    let h = Harness::new();
    h.cache_dialog("DlgShop", plain("DlgShop"));

    let layers = h.layers.clone();
    let open = tokio::spawn(async move {
        layers
            .open_unique_dialog_async("DlgShop", Args::new())
            .await
    });
    tokio::time::sleep(LATENCY / 2).await;
    h.layers.open_dialog("DlgShop", Args::new()).unwrap();

    assert!(open.await.unwrap().unwrap().is_none());
    assert_eq!(h.layers.find_dialogs("DlgShop").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_caller_does_not_cancel_load() {
    let h = Harness::new();
    h.remote_dialog("DlgShop", plain("DlgShop"));

    let open = h.layers.open_dialog_async("DlgShop", Args::new());
    let timed_out = tokio::time::timeout(LATENCY / 2, open).await;
    assert!(timed_out.is_err());

    tokio::time::sleep(LATENCY).await;
    assert!(h.layers.find_dialog("DlgShop").is_some());
    assert!(!h.loading.is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_error_handler_sees_failures() {
    let h = Harness::new();
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    {
        let seen = seen.clone();
        h.layers.on_error(move |err| seen.lock().unwrap().push(err.clone()));
    }

    let _ = h.layers.open_dialog("DlgMissing", Args::new());
    let _ = h.layers.open_dialog_async("", Args::new()).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            LayerError::not_found("prefab/dialog/DlgMissing"),
            LayerError::EmptyIdentifier,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_identifiers_rejected() {
    let h = Harness::new();

    assert_eq!(h.layers.enter_main("").unwrap_err(), LayerError::EmptyIdentifier);
    assert_eq!(
        h.layers.open_dialog("", Args::new()).unwrap_err(),
        LayerError::EmptyIdentifier
    );
    assert_eq!(
        h.layers
            .open_unique_dialog_async("", Args::new())
            .await
            .unwrap_err(),
        LayerError::EmptyIdentifier
    );
    assert!(h.main.is_empty());
    assert!(!h.layers.is_loading());
}
