use std::io::{Cursor, Read};
use tiny_http::{Request, Response};

use graphite_nn::{ModelBundle, NetworkParams, Prediction};

use crate::handlers::html_escape;
use crate::render::{render_page, Page};
use crate::state::SharedState;
use crate::util::http::{extract_boundary, form_get, multipart_file, multipart_text, parse_form};
use crate::util::image::digit_image_to_input;

// ---------------------------------------------------------------------------
// GET /test  and  GET /test?model=NAME
// ---------------------------------------------------------------------------

pub fn handle_get(query: String, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    let mask = st.tab_unlock_mask();
    drop(st);

    let q_pairs = parse_form(&query);
    let selected = form_get(&q_pairs, "model").unwrap_or("").to_owned();

    crate::routes::html_response(build_test_page(&selected, "", mask))
}

// ---------------------------------------------------------------------------
// POST /test/infer
// ---------------------------------------------------------------------------

pub fn handle_infer(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    let mask = st.tab_unlock_mask();
    drop(st);

    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let boundary = match extract_boundary(&content_type) {
        Some(b) => b,
        None => return crate::routes::html_response(build_test_page("", &error_html("Invalid multipart request."), mask)),
    };

    let mut body: Vec<u8> = Vec::new();
    let _ = request.as_reader().read_to_end(&mut body);

    let model_name = multipart_text(&body, &boundary, "model").unwrap_or_default();

    let result_html = match multipart_file(&body, &boundary, "image_file") {
        Some(bytes) => run_inference(&model_name, &bytes),
        None => error_html("No image file was uploaded."),
    };

    crate::routes::html_response(build_test_page(&model_name, &result_html, mask))
}

fn run_inference(model_name: &str, image_bytes: &[u8]) -> String {
    let params = match load_model(model_name) {
        Ok(p) => p,
        Err(e) => return error_html(&e),
    };
    let input = match digit_image_to_input(image_bytes) {
        Ok(v) => v,
        Err(e) => return error_html(&format!("Image decode error: {}", e)),
    };
    match params.predict_with_confidence(&input) {
        Ok(prediction) => format_prediction(&prediction),
        Err(e) => error_html(&e),
    }
}

fn load_model(model_name: &str) -> Result<NetworkParams, String> {
    if model_name.is_empty() {
        return Err("Select a model first.".to_owned());
    }
    let path = format!("trained_models/{}.json", model_name);
    let bundle = ModelBundle::load_json(&path)
        .map_err(|e| format!("Could not load model '{}': {}", model_name, e))?;
    let (params, _metadata) = bundle.into_parts()?;
    Ok(params)
}

// ---------------------------------------------------------------------------
// Output formatting
// ---------------------------------------------------------------------------

fn format_prediction(prediction: &Prediction) -> String {
    let best = prediction.digit;
    let best_conf = prediction.confidence[best];

    let mut sorted: Vec<usize> = (0..prediction.confidence.len()).collect();
    sorted.sort_by(|&a, &b| prediction.confidence[b].partial_cmp(&prediction.confidence[a]).unwrap());

    let rows: String = sorted
        .iter()
        .map(|&digit| {
            let p = prediction.confidence[digit];
            let width = (p * 260.0) as u32;
            let dim = if digit != best { " dim" } else { "" };
            format!(
                r#"<tr><td class="digit-cell">{}</td><td><div class="bar-wrap"><div class="bar-fill{}" style="width:{}px"></div></div></td><td class="prob-pct">{:.1}%</td></tr>"#,
                digit,
                dim,
                width,
                p * 100.0
            )
        })
        .collect();

    format!(
        r#"<div class="result-card"><h2>Result</h2>
<div class="prediction-hero">{best}</div>
<div class="prediction-sub">Confidence: {conf:.1}%</div>
<table class="prob-table">
  <thead><tr><th>Digit</th><th>Confidence</th><th></th></tr></thead>
  <tbody>{rows}</tbody>
</table></div>"#,
        best = best,
        conf = best_conf * 100.0,
        rows = rows
    )
}

fn error_html(msg: &str) -> String {
    format!(
        r#"<div class="result-card"><h2>Error</h2><div class="error-box">{}</div></div>"#,
        html_escape(msg)
    )
}

// ---------------------------------------------------------------------------
// Page builder
// ---------------------------------------------------------------------------

fn build_test_page(selected: &str, result_html: &str, tab_unlock: u8) -> String {
    let models = list_models();
    let model_options = if models.is_empty() {
        r#"<option disabled>No models found in trained_models/</option>"#.to_owned()
    } else {
        models
            .iter()
            .map(|name| {
                let sel = if name == selected { " selected" } else { "" };
                format!(
                    "<option value=\"{}\"{}>{}</option>",
                    html_escape(name),
                    sel,
                    html_escape(name)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    render_page(Page::Test, tab_unlock, false, |tmpl| {
        tmpl.replace("{{MODEL_OPTIONS}}", &model_options)
            .replace("{{TEST_RESULT_SECTION}}", result_html)
    })
}

fn list_models() -> Vec<String> {
    match std::fs::read_dir("trained_models") {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .flatten()
                .filter_map(|e| {
                    let path = e.path();
                    if path.extension().and_then(|s| s.to_str()) == Some("json") {
                        path.file_stem().and_then(|s| s.to_str()).map(|s| s.to_owned())
                    } else {
                        None
                    }
                })
                .collect();
            names.sort();
            names
        }
        Err(_) => vec![],
    }
}

// ---------------------------------------------------------------------------
// POST /test/import-model
// ---------------------------------------------------------------------------

pub fn handle_import_model(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    let mask = st.tab_unlock_mask();
    drop(st);

    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let boundary = match extract_boundary(&content_type) {
        Some(b) => b,
        None => {
            return crate::routes::html_response(build_test_page(
                "",
                &error_html("Invalid multipart request."),
                mask,
            ))
        }
    };

    let mut body: Vec<u8> = Vec::new();
    let _ = request.as_reader().read_to_end(&mut body);

    let file_bytes = match multipart_file(&body, &boundary, "model_file") {
        Some(b) => b,
        None => {
            return crate::routes::html_response(build_test_page(
                "",
                &error_html("No JSON file was uploaded."),
                mask,
            ))
        }
    };

    // Must deserialize into a bundle with valid shapes before it is saved.
    let bundle: ModelBundle = match serde_json::from_slice(&file_bytes) {
        Ok(b) => b,
        Err(_) => {
            return crate::routes::html_response(build_test_page(
                "",
                &error_html("Uploaded file is not a graphite-nn model bundle."),
                mask,
            ))
        }
    };
    if let Err(e) = bundle.into_parts() {
        return crate::routes::html_response(build_test_page(
            "",
            &error_html(&format!("Model bundle is invalid: {}", e)),
            mask,
        ));
    }

    let raw_name = multipart_text(&body, &boundary, "model_name").unwrap_or_default();
    let sanitized: String = raw_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    let model_name = if sanitized.is_empty() { "imported_model".to_owned() } else { sanitized };

    let model_path = format!("trained_models/{}.json", model_name);
    if std::fs::create_dir_all("trained_models").is_err()
        || std::fs::write(&model_path, &file_bytes).is_err()
    {
        return crate::routes::html_response(build_test_page(
            "",
            &error_html(&format!("Could not write model to '{}'.", model_path)),
            mask,
        ));
    }

    crate::routes::redirect(&format!("/test?model={}", model_name))
}
