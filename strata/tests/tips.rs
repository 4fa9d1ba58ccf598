//! Tip pooling, deduplication and timing.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{Harness, LATENCY};
use strata::config::TipDefaults;
use strata::headless::template;
use strata::{Animator, Instance, LayerConfig, LayerError, NodeId, TipData, TipView, Tween, Vec2};

/// Default hold plus fade, with some slack.
const TIP_LIFETIME: Duration = Duration::from_millis(1600);

#[tokio::test(start_paused = true)]
async fn test_show_tip() {
    let h = Harness::new().with_tip_template();

    h.layers.show_tip("Saved").await.unwrap();

    assert_eq!(h.tips.visible_with_text("Saved"), 1);
    assert_eq!(h.layers.tips().created(), 1);
    assert_eq!(h.layers.tips().available(), 0);
    assert!(h.layers.tips().is_showing("Saved"));
}

#[tokio::test(start_paused = true)]
async fn test_tip_is_recycled_and_reused() {
    let h = Harness::new().with_tip_template();
    h.layers.show_tip("First").await.unwrap();
    let node = h.tips.nodes()[0].id;

    tokio::time::sleep(TIP_LIFETIME).await;

    assert_eq!(h.layers.tips().available(), 1);
    assert!(!h.layers.tips().is_showing("First"));
    let idle = h.tips.node(node).unwrap();
    assert!(!idle.active);
    assert_eq!(idle.opacity, 0.0);

    h.layers.show_tip("Second").await.unwrap();

    assert_eq!(h.layers.tips().created(), 1);
    assert_eq!(h.layers.tips().available(), 0);
    let reused = h.tips.node(node).unwrap();
    assert!(reused.active);
    assert_eq!(reused.opacity, 1.0);
    assert_eq!(reused.text.as_deref(), Some("Second"));
    assert_eq!(h.resources.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unique_tip_shown_once() {
    let h = Harness::new().with_tip_template();

    h.layers.show_tip(TipData::new("Saved").unique()).await.unwrap();
    h.layers.show_tip(TipData::new("Saved").unique()).await.unwrap();

    assert_eq!(h.tips.visible_with_text("Saved"), 1);
    assert_eq!(h.layers.tips().created(), 1);

    tokio::time::sleep(TIP_LIFETIME).await;
    h.layers.show_tip(TipData::new("Saved").unique()).await.unwrap();

    assert_eq!(h.tips.visible_with_text("Saved"), 1);
    assert_eq!(h.layers.tips().created(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unique_tip_dedups_while_loading() {
    let h = Harness::new().with_tip_template();

    let (a, b) = tokio::join!(
        h.layers.show_tip(TipData::new("Saved").unique()),
        h.layers.show_tip(TipData::new("Saved").unique()),
    );

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(h.tips.visible_with_text("Saved"), 1);
    assert_eq!(h.layers.tips().created(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_plain_tips_may_repeat() {
    let h = Harness::new().with_tip_template();

    h.layers.show_tip("Hit").await.unwrap();
    h.layers.show_tip("Hit").await.unwrap();

    assert_eq!(h.tips.visible_with_text("Hit"), 2);
    assert_eq!(h.layers.tips().created(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_tip_timing_and_motion() {
    let h = Harness::new().with_tip_template();
    let start = Vec2::new(0.0, -40.0);
    let end = Vec2::new(0.0, 40.0);

    h.layers
        .show_tip(
            TipData::new("Level up")
                .duration(Duration::from_secs(3))
                .fade(Duration::from_secs(1))
                .start(start)
                .end(end),
        )
        .await
        .unwrap();
    let node = h.tips.nodes()[0].id;
    assert_eq!(h.tips.node(node).unwrap().position, start);
    assert_eq!(h.tips.top(), Some(node));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.layers.tips().available(), 0);
    assert!(h.layers.tips().is_showing("Level up"));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(h.layers.tips().available(), 1);
    assert_eq!(h.tips.node(node).unwrap().position, end);
}

#[tokio::test(start_paused = true)]
async fn test_missing_tip_template() {
    let h = Harness::new();

    let err = h.layers.show_tip(TipData::new("Saved").unique()).await.unwrap_err();

    assert_eq!(err, LayerError::not_found("prefab/tip"));
    assert!(!h.layers.tips().is_showing("Saved"));
    assert!(h.tips.is_empty());
    assert!(!h.loading.is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_tip_fetch_shows_indicator() {
    let h = Harness::new().with_tip_template();

    let layers = h.layers.clone();
    let show = tokio::spawn(async move { layers.show_tip("Saved").await });
    tokio::time::sleep(LATENCY / 2).await;
    assert!(h.loading.is_visible());

    show.await.unwrap().unwrap();
    assert!(!h.loading.is_visible());
}

/// Animator whose tweens fail partway through.
struct BrokenTween;

#[async_trait]
impl Animator for BrokenTween {
    fn play(&self, _node: NodeId, _clip: &str) {}

    async fn finished(&self, _node: NodeId) {}

    async fn tween(&self, _node: NodeId, _tween: Tween) {
        tokio::time::sleep(Duration::from_millis(10)).await;
        panic!("tween failed");
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_dismissal_releases_text() {
    let h = Harness::with_animator(Arc::new(BrokenTween)).with_tip_template();

    h.layers.show_tip(TipData::new("Saved").unique()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(!h.layers.tips().is_showing("Saved"));
    assert!(h.tips.is_empty());
    assert_eq!(h.layers.tips().created(), 0);
    assert_eq!(h.layers.tips().available(), 0);

    h.layers.show_tip(TipData::new("Saved").unique()).await.unwrap();
    assert_eq!(h.tips.visible_with_text("Saved"), 1);
    assert_eq!(h.tips.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_instantiate_releases_text() {
    let h = Harness::new();
    h.resources
        .cache("prefab/tip", template(|| panic!("broken prefab")));

    let err = h
        .layers
        .show_tip(TipData::new("Saved").unique())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LayerError::TaskFailed {
            message: "broken prefab".to_string()
        }
    );
    assert!(!h.layers.tips().is_showing("Saved"));
    assert!(!h.loading.is_visible());
    assert!(h.tips.is_empty());
}

struct BrokenView;

impl TipView for BrokenView {
    fn set_text(&mut self, _text: &str) {
        panic!("layout failed");
    }
}

#[tokio::test(start_paused = true)]
async fn test_failing_view_still_recycles() {
    let h = Harness::new();
    h.resources
        .cache("prefab/tip", template(|| Instance::new("Tip").tip(BrokenView)));

    h.layers.show_tip(TipData::new("Saved").unique()).await.unwrap();
    assert!(h.layers.tips().is_showing("Saved"));

    tokio::time::sleep(TIP_LIFETIME).await;
    assert!(!h.layers.tips().is_showing("Saved"));
    assert_eq!(h.layers.tips().available(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_configured_tip_positions() {
    let start = Vec2::new(0.0, -20.0);
    let end = Vec2::new(0.0, 60.0);
    let config = LayerConfig::new().with_tip_defaults(TipDefaults {
        start,
        end,
        ..TipDefaults::default()
    });
    let h = Harness::with_config(config).with_tip_template();

    h.layers.show_tip("Saved").await.unwrap();
    let node = h.tips.nodes()[0].id;
    assert_eq!(h.tips.node(node).unwrap().position, start);

    tokio::time::sleep(TIP_LIFETIME).await;
    assert_eq!(h.tips.node(node).unwrap().position, end);
}
