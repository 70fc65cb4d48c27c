use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}, mpsc};
use std::thread;
use tiny_http::{Request, Response};

use graphite_nn::{train_model, EpochStats, ModelBundle, TrainConfig};

use crate::handlers::{html_escape, render_flash_html};
use crate::render::{render_page, Page};
use crate::state::{FlashMessage, Hyperparams, SharedState, TrainingStatus};
use crate::util::http::{form_get, parse_form};

// ---------------------------------------------------------------------------
// GET /train
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();
    let flash = st.take_flash();
    let mask = st.tab_unlock_mask();
    let hp = st.hyperparams.clone();
    let ds = st
        .dataset
        .as_ref()
        .map(|d| (d.train_images.len(), d.test_images.len(), d.source_name.clone()));
    let history = st.epoch_history.clone();

    let (show_form, show_live, show_done, show_failed) = match st.training {
        TrainingStatus::Idle => (true, false, false, false),
        TrainingStatus::Running { .. } => (false, true, false, false),
        TrainingStatus::Done { .. } => (false, false, true, false),
        TrainingStatus::Failed { .. } => (false, false, false, true),
    };
    let is_running = matches!(st.training, TrainingStatus::Running { .. });

    let total_epochs = match &st.training {
        TrainingStatus::Running { total_epochs, .. } => *total_epochs,
        _ => hp.epochs,
    };

    let done_badge = match &st.training {
        TrainingStatus::Done { was_stopped: true, .. } => "Stopped",
        TrainingStatus::Done { was_stopped: false, .. } => "Done",
        _ => "",
    };
    let done_stats_html = build_done_stats(&st.training, &history);
    let download_link = build_download_link(&st.training);
    let fail_reason = match &st.training {
        TrainingStatus::Failed { reason } => reason.clone(),
        _ => String::new(),
    };
    drop(st);

    let data_summary = ds
        .map(|(train_n, test_n, src)| {
            format!(
                r#"<table class="summary-table">
  <tr><th>Dataset</th><td>{src}</td></tr>
  <tr><th>Training images</th><td>{train_n}</td></tr>
  <tr><th>Test images</th><td>{test_n}</td></tr>
</table>"#,
                src = html_escape(&src),
                train_n = train_n,
                test_n = test_n
            )
        })
        .unwrap_or_else(|| {
            r#"<p class="hint">No dataset loaded yet — visit the Dataset tab first.</p>"#.into()
        });

    let flash_html = render_flash_html(flash.as_ref());
    let hide = |show: bool| if show { "" } else { "hidden" };

    crate::routes::html_response(render_page(Page::Train, mask, is_running, |tmpl| {
        tmpl.replace("{{FLASH_TRAIN}}", &flash_html)
            .replace("{{TRAIN_FORM_HIDE}}", hide(show_form))
            .replace("{{TRAIN_LIVE_HIDE}}", hide(show_live))
            .replace("{{TRAIN_DONE_HIDE}}", hide(show_done))
            .replace("{{TRAIN_FAILED_HIDE}}", hide(show_failed))
            .replace("{{TRAIN_DATA_SUMMARY}}", &data_summary)
            .replace("{{TRAIN_TOTAL_EPOCHS}}", &total_epochs.to_string())
            .replace("{{HP_NAME}}", &html_escape(&hp.model_name))
            .replace("{{HP_EPOCHS}}", &hp.epochs.to_string())
            .replace("{{HP_LR}}", &hp.learning_rate.to_string())
            .replace("{{HP_BATCH}}", &hp.batch_size.to_string())
            .replace("{{HP_HIDDEN}}", &hp.hidden_size.to_string())
            .replace("{{TRAIN_STATUS_BADGE}}", done_badge)
            .replace("{{TRAIN_DONE_STATS}}", &done_stats_html)
            .replace("{{TRAIN_DOWNLOAD_LINK}}", &download_link)
            .replace("{{TRAIN_FAIL_REASON}}", &html_escape(&fail_reason))
    }))
}

fn build_done_stats(training: &TrainingStatus, history: &[EpochStats]) -> String {
    let (accuracy, elapsed, saved_path) = match training {
        TrainingStatus::Done { accuracy, elapsed_total_ms, model_path, was_stopped } => {
            let elapsed = if *was_stopped {
                format!("stopped after epoch {}", history.len())
            } else {
                format!("{:.1}s", *elapsed_total_ms as f64 / 1000.0)
            };
            (format!("{:.2}%", accuracy * 100.0), elapsed, model_path.clone())
        }
        _ => ("—".into(), "—".into(), String::new()),
    };
    let last_loss = history
        .last()
        .map(|s| format!("{:.6}", s.train_loss))
        .unwrap_or_else(|| "—".into());

    format!(
        r#"<div class="metrics-row">
  <div class="metric-card"><div class="val">{accuracy}</div><div class="lbl">Test accuracy</div></div>
  <div class="metric-card"><div class="val">{last_loss}</div><div class="lbl">Final train loss</div></div>
  <div class="metric-card"><div class="val">{elapsed}</div><div class="lbl">Total time</div></div>
</div>
<p class="hint">Saved to <code>{path}</code></p>"#,
        accuracy = accuracy,
        last_loss = last_loss,
        elapsed = elapsed,
        path = html_escape(&saved_path),
    )
}

fn build_download_link(training: &TrainingStatus) -> String {
    match training {
        TrainingStatus::Done { model_path, .. } => {
            let stem = std::path::Path::new(model_path)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("model");
            format!(
                r#"<a href="/models/{stem}/download" class="btn btn-secondary">Download model JSON</a>"#,
                stem = html_escape(stem)
            )
        }
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// POST /train/start
// ---------------------------------------------------------------------------

pub fn handle_start(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    let pairs = parse_form(&body);

    let hp = Hyperparams {
        model_name: sanitize_name(form_get(&pairs, "model_name").unwrap_or("digits")),
        epochs: parse_field(&pairs, "epochs", 10).clamp(1, 500),
        learning_rate: form_get(&pairs, "learning_rate")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0.05),
        batch_size: parse_field(&pairs, "batch_size", 32).clamp(1, 4096),
        hidden_size: parse_field(&pairs, "hidden_size", 128).clamp(8, 512),
    };

    let mut st = state.lock().unwrap();
    if st.dataset.is_none() {
        st.flash = Some(FlashMessage::error("Load a dataset before training."));
        drop(st);
        return crate::routes::redirect("/train");
    }
    if matches!(st.training, TrainingStatus::Running { .. }) {
        drop(st);
        return crate::routes::redirect("/train");
    }

    let ds = st.dataset.clone().unwrap();
    st.hyperparams = hp.clone();

    let (tx, rx) = mpsc::channel::<EpochStats>();
    let stop_flag = Arc::new(AtomicBool::new(false));
    let epoch_rx = Arc::new(Mutex::new(rx));

    st.training = TrainingStatus::Running {
        stop_flag: stop_flag.clone(),
        epoch_rx: epoch_rx.clone(),
        total_epochs: hp.epochs,
    };
    st.epoch_history.clear();
    st.trained = None;
    drop(st);

    // Spawn the background training thread. Progress flows through the
    // channel; the SSE handler on the other end relays it to the browser.
    let state_clone = state.clone();
    thread::spawn(move || {
        let mut config = TrainConfig::new(hp.epochs, hp.learning_rate, hp.batch_size, hp.hidden_size);
        config.stop_flag = Some(stop_flag.clone());

        let t_start = std::time::Instant::now();
        let result = train_model(
            &ds.train_images,
            &ds.train_labels,
            &ds.test_images,
            &ds.test_labels,
            &config,
            &mut rand::thread_rng(),
            |stats| {
                let _ = tx.send(stats.clone());
            },
        );
        let elapsed_total_ms = t_start.elapsed().as_millis() as u64;
        let was_stopped = stop_flag.load(Ordering::Relaxed);

        let mut st = state_clone.lock().unwrap();

        // Drain any stats the SSE handler has not picked up yet so the
        // history is complete even when no browser was listening.
        let remaining: Vec<EpochStats> = {
            if let TrainingStatus::Running { epoch_rx, .. } = &st.training {
                let rx_guard = epoch_rx.lock().unwrap();
                let mut buf = Vec::new();
                while let Ok(s) = rx_guard.try_recv() {
                    buf.push(s);
                }
                buf
            } else {
                Vec::new()
            }
        };
        st.epoch_history.extend(remaining);

        match result {
            Ok(model) => {
                let model_path = format!("trained_models/{}.json", hp.model_name);
                let _ = std::fs::create_dir_all("trained_models");
                let bundle = ModelBundle::new(&model.params, &model.metadata);
                match bundle.save_json(&model_path) {
                    Ok(()) => {
                        st.training = TrainingStatus::Done {
                            model_path,
                            elapsed_total_ms,
                            was_stopped,
                            accuracy: model.metadata.accuracy,
                        };
                        st.trained = Some((model.params, model.metadata));
                    }
                    Err(e) => {
                        st.training = TrainingStatus::Failed {
                            reason: format!(
                                "Training finished but saving to '{}' failed: {}",
                                model_path, e
                            ),
                        };
                    }
                }
            }
            Err(reason) => {
                st.training = TrainingStatus::Failed { reason };
            }
        }
    });

    crate::routes::redirect("/train")
}

fn parse_field(pairs: &[(String, String)], key: &str, default: usize) -> usize {
    form_get(pairs, key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn sanitize_name(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "digits".to_owned() } else { cleaned }
}

// ---------------------------------------------------------------------------
// POST /train/stop
// ---------------------------------------------------------------------------

pub fn handle_stop(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    if let TrainingStatus::Running { stop_flag, .. } = &st.training {
        stop_flag.store(true, Ordering::Relaxed);
    }
    drop(st);
    crate::routes::redirect("/train")
}
