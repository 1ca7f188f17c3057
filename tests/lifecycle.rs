mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use slotvisor::{
    Callback, LifecycleKind, Outcome, Plugin, RuntimeError, SlotConfig, SlotError, SlotId,
    SlotState, SurfaceEvent,
};

#[tokio::test(flavor = "current_thread")]
async fn test_explicit_resolve_completes_render() -> anyhow::Result<()> {
    let h = Harness::silent(&[]);
    let id = h.orchestrator.queue("top", SlotConfig::new().with_url("/a.js"))?;
    let (cb, mut rx) = channel_cb();
    h.orchestrator.render("top", cb)?;

    h.orchestrator.resolve(&id)?;

    let out = next(&mut rx).await;
    assert!(out.is_ok());
    assert_eq!(out.slot.rendered.times, 1);
    assert_eq!(out.slot.state, SlotState::Resolved);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_resolve_without_render_in_flight_is_ignored() -> anyhow::Result<()> {
    let h = Harness::silent(&[]);
    let id = h.orchestrator.queue("top", SlotConfig::new().with_url("/a.js"))?;

    h.orchestrator.resolve(&id)?;

    let slot = h.orchestrator.slot(&id).await?.expect("live");
    assert_eq!(slot.state, SlotState::Created);
    assert_eq!(slot.rendered.times, 0);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_fail_runs_fail_hook_and_callbacks() -> anyhow::Result<()> {
    let h = Harness::silent(&[]);
    let hooked = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hooked);
    h.orchestrator.config(
        "top",
        SlotConfig::new().with_fail(move |outcome: &Outcome| {
            assert!(outcome.error.is_some());
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )?;
    let id = h.orchestrator.queue("top", SlotConfig::new().with_url("/a.js"))?;
    let (cb, mut rx) = channel_cb();
    h.orchestrator.render("top", cb)?;

    h.orchestrator.fail(&id, "no fill")?;

    let out = next(&mut rx).await;
    match out.error {
        Some(SlotError::Failed { ref reason, .. }) => assert_eq!(&**reason, "no fill"),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(out.slot.state, SlotState::Failed);
    assert_eq!(out.slot.rendered.times, 0);
    assert_eq!(hooked.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_fail_before_render_leaves_slot_queued() -> anyhow::Result<()> {
    let h = Harness::echoing(&[]);
    let hooked = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hooked);
    let id = h.orchestrator.queue(
        "top",
        SlotConfig::new()
            .with_url("/a.js")
            .with_fail(move |_: &Outcome| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
    )?;

    h.orchestrator.fail(&id, "too early")?;
    let slot = h.orchestrator.slot(&id).await?.expect("live");
    assert_eq!(slot.state, SlotState::Created);
    assert_eq!(hooked.load(Ordering::SeqCst), 0);

    let (cb, mut rx) = channel_cb();
    h.orchestrator.render("top", cb)?;
    let out = next(&mut rx).await;
    assert!(out.is_ok());
    assert_eq!(out.slot.last_state, Some(SlotState::Active));
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_done_hook_runs_on_every_resolution() -> anyhow::Result<()> {
    let h = Harness::echoing(&[]);
    let done = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&done);
    h.orchestrator.queue(
        "top",
        SlotConfig::new()
            .with_url("/a.js")
            .with_done(move |_: &Outcome| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
    )?;

    let (cb, mut rx) = channel_cb();
    h.orchestrator.render("top", cb.clone())?;
    next(&mut rx).await;
    h.orchestrator.refresh("top", cb)?;
    next(&mut rx).await;

    assert_eq!(done.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_surface_failure_reports_map_to_states() -> anyhow::Result<()> {
    let h = Harness::silent(&[]);
    let timed = h.orchestrator.queue("a", SlotConfig::new().with_url("/a.js"))?;
    let rejected = h.orchestrator.queue("b", SlotConfig::new().with_url("/b.js"))?;
    let failed = h.orchestrator.queue("c", SlotConfig::new().with_url("/c.js"))?;

    let (cb, mut rx) = channel_cb();
    for name in ["a", "b", "c"] {
        h.orchestrator.render(name, cb.clone())?;
    }
    h.orchestrator.len().await?;

    h.bus.publish(SurfaceEvent::timed_out(timed.clone()));
    h.bus.publish(SurfaceEvent::rejected(rejected.clone(), "blocked"));
    h.bus.publish(SurfaceEvent::failed(failed.clone(), "script error"));

    let first = next(&mut rx).await;
    assert!(matches!(first.error, Some(SlotError::TimedOut { .. })));
    assert_eq!(first.slot.state, SlotState::TimedOut);
    assert!(first.error.as_ref().is_some_and(SlotError::is_retryable));

    let second = next(&mut rx).await;
    assert!(matches!(second.error, Some(SlotError::Rejected { .. })));
    assert_eq!(second.slot.state, SlotState::Rejected);

    let third = next(&mut rx).await;
    assert!(matches!(third.error, Some(SlotError::Failed { .. })));
    assert_eq!(third.slot.state, SlotState::Failed);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_timed_out_slot_renders_again() -> anyhow::Result<()> {
    let h = Harness::silent(&[]);
    let id = h.orchestrator.queue("top", SlotConfig::new().with_url("/a.js"))?;
    let (cb, mut rx) = channel_cb();
    h.orchestrator.render("top", cb.clone())?;
    h.orchestrator.len().await?;
    h.bus.publish(SurfaceEvent::timed_out(id.clone()));
    next(&mut rx).await;

    h.frames.set_echo(true);
    h.orchestrator.render("top", cb)?;

    let out = next(&mut rx).await;
    assert!(out.is_ok());
    assert_eq!(out.slot.last_state, Some(SlotState::Reactivated));
    assert_eq!(h.frames.journal().creates(&id), 2);
    assert_eq!(h.frames.journal().detaches(&id), 1);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_events_for_unknown_slots_are_ignored() -> anyhow::Result<()> {
    let h = Harness::echoing(&[]);
    let id = h.orchestrator.queue("top", SlotConfig::new().with_url("/a.js"))?;

    h.bus.publish(SurfaceEvent::rendered(SlotId::from_raw("nope-1"), 1, 1));
    h.bus.publish(SurfaceEvent::timed_out(SlotId::from_raw("nope-2")));
    tokio::task::yield_now().await;

    let slots = h.orchestrator.slots("top").await?;
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].id, id);
    assert_eq!(slots[0].state, SlotState::Created);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_panicking_callback_does_not_stop_others() -> anyhow::Result<()> {
    let h = Harness::echoing(&[]);
    h.orchestrator.queue("top", SlotConfig::new().with_url("/a.js"))?;

    h.orchestrator
        .render("top", Callback::new(|_: &Outcome| panic!("callback bug")))?;
    let (cb, mut rx) = channel_cb();
    h.orchestrator.render("top", cb)?;

    assert!(next(&mut rx).await.is_ok());
    assert_eq!(h.orchestrator.len().await?, 1);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_plugins_observe_lifecycle() -> anyhow::Result<()> {
    let (recorder, mut events) = Recorder::new();
    let h = Harness::with_plugins(&["gone"], vec![recorder as Arc<dyn Plugin>]);

    h.orchestrator.queue("top", SlotConfig::new().with_url("/a.js"))?;
    h.orchestrator.queue(
        "side",
        SlotConfig::new().with_container("gone").with_url("/b.js"),
    )?;
    h.page.remove("gone");

    let (cb, mut rx) = channel_cb();
    h.orchestrator.render("top", cb.clone())?;
    next(&mut rx).await;
    h.orchestrator.render("side", cb)?;
    next(&mut rx).await;

    h.orchestrator.shutdown().await;

    let mut seen = Vec::new();
    while let Ok(ev) = events.try_recv() {
        seen.push((ev.slot.name.clone(), ev.kind, ev.error.is_some()));
    }
    assert_eq!(
        seen,
        vec![
            ("top".to_string(), LifecycleKind::Queued, false),
            ("side".to_string(), LifecycleKind::Queued, false),
            ("top".to_string(), LifecycleKind::BeforeRender, false),
            ("top".to_string(), LifecycleKind::AfterRender, false),
            ("side".to_string(), LifecycleKind::AfterRender, true),
        ]
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_shutdown_detaches_surfaces_and_closes_handle() -> anyhow::Result<()> {
    let h = Harness::silent(&[]);
    let id = h.orchestrator.queue("top", SlotConfig::new().with_url("/a.js"))?;
    let (cb, mut rx) = channel_cb();
    h.orchestrator.render("top", cb)?;
    h.orchestrator.len().await?;

    h.orchestrator.shutdown().await;

    assert_eq!(h.frames.journal().detaches(&id), 1);
    assert_eq!(
        h.orchestrator.render("top", Callback::noop()),
        Err(RuntimeError::Closed)
    );
    assert!(matches!(h.orchestrator.len().await, Err(RuntimeError::Closed)));
    // Pending callbacks are dropped, never fired.
    assert!(rx.recv().await.is_none());
    Ok(())
}
