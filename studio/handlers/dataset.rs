use std::io::{Cursor, Read};
use tiny_http::{Request, Response};

use graphite_nn::data::idx::{parse_idx_images, parse_idx_labels};
use graphite_nn::data::synthetic::synthetic_dataset;

use crate::handlers::{html_escape, render_flash_html};
use crate::render::{render_page, Page};
use crate::state::{DatasetState, FlashMessage, SharedState};
use crate::util::http::{extract_boundary, form_get, multipart_file, multipart_text, parse_form};

const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

// ---------------------------------------------------------------------------
// GET /dataset
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();
    let flash = st.take_flash();
    let mask = st.tab_unlock_mask();
    let ds = st.dataset.clone();
    drop(st);

    crate::routes::html_response(build_dataset_page(&ds, None, flash, mask))
}

// ---------------------------------------------------------------------------
// POST /dataset/builtin — generate synthetic digits
// ---------------------------------------------------------------------------

pub fn handle_builtin(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    let pairs = parse_form(&body);

    let train_per_class: usize = form_get(&pairs, "train_per_class")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(100)
        .clamp(1, 2000);
    let test_per_class: usize = form_get(&pairs, "test_per_class")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(20)
        .clamp(1, 500);

    let mut rng = rand::thread_rng();
    let (train_images, train_labels) = synthetic_dataset(train_per_class, &mut rng);
    let (test_images, test_labels) = synthetic_dataset(test_per_class, &mut rng);

    let source_name = format!(
        "Synthetic digits ({} train / {} test)",
        train_images.len(),
        test_images.len()
    );

    let mut st = state.lock().unwrap();
    st.dataset = Some(DatasetState {
        train_images,
        train_labels,
        test_images,
        test_labels,
        source_name,
    });
    st.flash = Some(FlashMessage::success("Synthetic dataset generated."));
    drop(st);

    crate::routes::redirect("/dataset")
}

// ---------------------------------------------------------------------------
// POST /dataset/upload-idx — MNIST IDX file pairs
// ---------------------------------------------------------------------------

pub fn handle_upload_idx(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let boundary = match extract_boundary(&content_type) {
        Some(b) => b,
        None => return show_error(&state, "Invalid multipart request."),
    };

    let mut body: Vec<u8> = Vec::new();
    let _ = request.as_reader().read_to_end(&mut body);
    if body.len() > MAX_UPLOAD_BYTES {
        return show_error(&state, "Upload exceeds the 64 MB limit.");
    }

    let train_image_bytes = match multipart_file(&body, &boundary, "train_images") {
        Some(b) => b,
        None => return show_error(&state, "No training image file was uploaded."),
    };
    let train_label_bytes = match multipart_file(&body, &boundary, "train_labels") {
        Some(b) => b,
        None => return show_error(&state, "No training label file was uploaded."),
    };

    let (train_images, train_labels) =
        match parse_pair(&train_image_bytes, &train_label_bytes, "training") {
            Ok(pair) => pair,
            Err(e) => return show_error(&state, &e),
        };

    // Test pair is optional; without it the tail 10% of the training set is
    // held out.
    let test_image_bytes = multipart_file(&body, &boundary, "test_images");
    let test_label_bytes = multipart_file(&body, &boundary, "test_labels");

    let (train_images, train_labels, test_images, test_labels) =
        match (test_image_bytes, test_label_bytes) {
            (Some(ib), Some(lb)) => {
                let (test_images, test_labels) = match parse_pair(&ib, &lb, "test") {
                    Ok(pair) => pair,
                    Err(e) => return show_error(&state, &e),
                };
                (train_images, train_labels, test_images, test_labels)
            }
            _ => {
                let holdout = (train_images.len() / 10).max(1);
                if train_images.len() <= holdout {
                    return show_error(&state, "Training set too small to hold out a test split.");
                }
                let split = train_images.len() - holdout;
                let mut images = train_images;
                let mut labels = train_labels;
                let test_images = images.split_off(split);
                let test_labels = labels.split_off(split);
                (images, labels, test_images, test_labels)
            }
        };

    let hint = multipart_text(&body, &boundary, "source_name").unwrap_or_default();
    let source_name = if hint.trim().is_empty() {
        format!("IDX upload ({} train / {} test)", train_images.len(), test_images.len())
    } else {
        hint.trim().to_owned()
    };

    let mut st = state.lock().unwrap();
    st.dataset = Some(DatasetState {
        train_images,
        train_labels,
        test_images,
        test_labels,
        source_name,
    });
    st.flash = Some(FlashMessage::success("IDX dataset loaded."));
    drop(st);

    crate::routes::redirect("/dataset")
}

fn parse_pair(
    image_bytes: &[u8],
    label_bytes: &[u8],
    which: &str,
) -> Result<(Vec<Vec<f64>>, Vec<usize>), String> {
    let images = parse_idx_images(image_bytes).map_err(|e| format!("{} images: {}", which, e))?;
    let labels = parse_idx_labels(label_bytes).map_err(|e| format!("{} labels: {}", which, e))?;
    if images.len() != labels.len() {
        return Err(format!(
            "{} pair mismatch: {} images but {} labels",
            which,
            images.len(),
            labels.len()
        ));
    }
    Ok((images, labels))
}

// ---------------------------------------------------------------------------
// Page builder
// ---------------------------------------------------------------------------

fn show_error(state: &SharedState, msg: &str) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    let mask = st.tab_unlock_mask();
    let ds = st.dataset.clone();
    drop(st);
    crate::routes::html_response(build_dataset_page(&ds, Some(msg), None, mask))
}

fn build_dataset_page(
    ds: &Option<DatasetState>,
    error: Option<&str>,
    flash: Option<FlashMessage>,
    tab_unlock: u8,
) -> String {
    let flash_html = render_flash_html(flash.as_ref());
    let error_html = error
        .map(|e| format!(r#"<div class="flash flash-error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();

    let summary_html = ds.as_ref().map(build_summary_html).unwrap_or_default();

    render_page(Page::Dataset, tab_unlock, false, |tmpl| {
        tmpl.replace("{{FLASH_DATASET}}", &flash_html)
            .replace("{{DS_ERROR}}", &error_html)
            .replace("{{DS_SUMMARY}}", &summary_html)
    })
}

fn build_summary_html(ds: &DatasetState) -> String {
    let mut class_counts = [0usize; 10];
    for &label in &ds.train_labels {
        class_counts[label] += 1;
    }
    let counts: String = class_counts
        .iter()
        .enumerate()
        .map(|(digit, count)| format!("<tr><td>{}</td><td>{}</td></tr>", digit, count))
        .collect();

    format!(
        r#"<div class="card"><h2>Loaded dataset</h2>
<table class="summary-table">
  <tr><th>Source</th><td>{source}</td></tr>
  <tr><th>Training images</th><td>{train_n}</td></tr>
  <tr><th>Test images</th><td>{test_n}</td></tr>
</table>
<h3>Training examples per digit</h3>
<table class="preview-table">
  <thead><tr><th>Digit</th><th>Count</th></tr></thead>
  <tbody>{counts}</tbody>
</table>
</div>"#,
        source = html_escape(&ds.source_name),
        train_n = ds.train_images.len(),
        test_n = ds.test_images.len(),
        counts = counts,
    )
}
