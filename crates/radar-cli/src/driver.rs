use crate::demo;
use radar_core::{ControlMessage, RadarResult, StoreChange};
use radar_dom::{Document, History};
use radar_engine::{Clipboard, Engine, PointerPosition, Viewport};
use radar_store::SettingsStore;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tracing::info;

/// Clipboard that just reports what would have been copied.
struct LogClipboard;

impl Clipboard for LogClipboard {
    fn write_text(&mut self, text: &str) -> RadarResult<()> {
        info!(text = text, "copied referrer name");
        Ok(())
    }
}

pub async fn run_simulation(
    engine: Engine,
    store: Box<dyn SettingsStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    tokio::select! {
        result = script(engine, store) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("simulation interrupted");
            Ok(())
        }
    }
}

async fn script(
    mut engine: Engine,
    mut store: Box<dyn SettingsStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    engine.set_clipboard(Box::new(LogClipboard));

    let mut doc = demo::demo_page();
    let mut history = History::new("https://www.linkedin.com/jobs/search/");
    let changes = store.subscribe();

    engine.update_database(&mut doc, store.load_database()?);
    engine.start(&mut doc, &history, Instant::now());
    report(&engine, &doc, "initial scan");

    pump(&mut engine, &mut doc, &mut history, &changes, Duration::from_millis(1200)).await;

    // A framework re-render silently drops one badge; reconciliation puts it
    // back on the next debounced pass.
    if let Some((_, entry)) = engine.tracker().entries().into_iter().next() {
        doc.remove(entry.badge);
        info!("host re-render removed an injected badge");
    }
    pump(&mut engine, &mut doc, &mut history, &changes, Duration::from_millis(600)).await;
    report(&engine, &doc, "after rehydration repair");

    // Infinite scroll appends another result.
    demo::job_card(&mut doc, "Amazon", "Data Engineer");
    info!("infinite scroll appended a result card");
    pump(&mut engine, &mut doc, &mut history, &changes, Duration::from_millis(600)).await;
    report(&engine, &doc, "after scroll batch");

    // Open the first badge's tooltip and copy a referrer name.
    let badge = doc
        .all_elements()
        .into_iter()
        .find(|n| doc.has_class(*n, &engine.config().badge_class));
    if let Some(badge) = badge {
        let pointer = PointerPosition {
            page_x: 160.0,
            page_y: 90.0,
        };
        let viewport = Viewport {
            width: 1280.0,
            height: 800.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        };
        engine.handle_click(&mut doc, badge, pointer, viewport, Instant::now());
        let copy = engine
            .tooltip()
            .active()
            .and_then(|t| {
                doc.descendants(t)
                    .into_iter()
                    .find(|n| doc.has_class(*n, "referral-radar-copy-btn"))
            });
        if let Some(copy) = copy {
            engine.handle_click(&mut doc, copy, pointer, viewport, Instant::now());
        }
    }
    pump(&mut engine, &mut doc, &mut history, &changes, Duration::from_millis(2200)).await;

    // Client-side navigation swaps the whole result list.
    for child in doc.children(doc.body()).to_vec() {
        doc.remove(child);
    }
    demo::job_card(&mut doc, "Meta", "Research Scientist");
    demo::job_card(&mut doc, "Stripe", "Payments Engineer");
    history.push_state("https://www.linkedin.com/jobs/view/4012");
    info!("client-side navigation to a job view");
    pump(&mut engine, &mut doc, &mut history, &changes, Duration::from_millis(1800)).await;
    report(&engine, &doc, "after navigation rescan");

    // The settings panel saves an updated contact list.
    let mut db = store.load_database()?;
    if db.referrers("STRIPE").is_empty() {
        let value = serde_json::to_value(&db)?;
        let mut map = value.as_object().cloned().unwrap_or_default();
        map.insert(
            "STRIPE".to_string(),
            serde_json::json!([{"name": "Priya N.", "note": "Joined last spring"}]),
        );
        db = radar_core::CompanyDatabase::from_value(serde_json::Value::Object(map))?;
    }
    store.save_database(&db)?;
    info!("settings store saved an updated database");
    pump(&mut engine, &mut doc, &mut history, &changes, Duration::from_millis(600)).await;
    report(&engine, &doc, "after database update");

    // The popup toggles the overlay off.
    engine.handle_control(
        &mut doc,
        &history,
        &ControlMessage::UpdateMode { mode: false },
        Instant::now(),
    );
    report(&engine, &doc, "after overlay off");

    Ok(())
}

/// Pumps the engine for `duration`: forward store changes, drain the
/// observer and navigation sources, fire due deadlines, and sleep until the
/// next one.
async fn pump(
    engine: &mut Engine,
    doc: &mut Document,
    history: &mut History,
    changes: &Receiver<StoreChange>,
    duration: Duration,
) {
    let end = Instant::now() + duration;
    loop {
        for change in changes.try_iter() {
            engine.handle_store_change(doc, history, &change, Instant::now());
        }
        engine.process(doc, history, Instant::now());
        let now = Instant::now();
        if now >= end {
            break;
        }
        let next = engine.next_deadline().unwrap_or(end).min(end);
        let wait = next
            .saturating_duration_since(now)
            .max(Duration::from_millis(10));
        tokio::time::sleep(wait).await;
    }
}

fn report(engine: &Engine, doc: &Document, stage: &str) {
    let badges = doc
        .all_elements()
        .into_iter()
        .filter(|n| doc.has_class(*n, &engine.config().badge_class))
        .count();
    info!(
        stage = stage,
        badges = badges,
        tracked = engine.tracker().len(),
        running = engine.is_running(),
        "simulation checkpoint"
    );
}
