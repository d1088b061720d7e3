// C ABI over a process-wide engine. Loading finishes before the engine is published,
// so every call that sees it sees fully loaded artifacts.
use crate::config::DataConfig;
use crate::core::engine::InferenceEngine;
use crate::persistence::load_context;
use log::{error, info};
use serde_json::json;
use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::OnceLock;

static ENGINE: OnceLock<InferenceEngine> = OnceLock::new();

fn init_engine(data_dir: Option<&str>) -> Result<(), String> {
    if ENGINE.get().is_some() {
        return Ok(());
    }
    let config = match data_dir {
        Some(dir) => DataConfig::from_dir(Path::new(dir)),
        None => DataConfig::resolve(None).map_err(|e| e.to_string())?,
    };
    let context = load_context(&config).map_err(|e| e.to_string())?;
    // A concurrent init may have won; its engine is equally valid.
    let _ = ENGINE.set(InferenceEngine::new(context));
    info!("predictor engine initialized from {:?}", config.training_path.parent());
    Ok(())
}

fn predict_json(request: &str) -> String {
    let Some(engine) = ENGINE.get() else {
        return json!({ "error": "engine not initialized" }).to_string();
    };
    let symptoms: Vec<String> = match serde_json::from_str(request) {
        Ok(s) => s,
        Err(e) => return json!({ "error": format!("expected a JSON array of symptoms: {e}") }).to_string(),
    };
    match engine.predict(&symptoms) {
        Ok(result) => serde_json::to_string(&result)
            .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string()),
        Err(e) => {
            error!("prediction failed: {}", e);
            json!({ "error": e.to_string() }).to_string()
        }
    }
}

fn into_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Loads artifacts from `data_dir` (or the configured default when null).
/// Returns 0 on success, -1 on failure. Calling it again after success is a no-op.
///
/// # Safety
/// `data_dir` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn predictor_init(data_dir: *const c_char) -> i32 {
    let dir = if data_dir.is_null() {
        None
    } else {
        match CStr::from_ptr(data_dir).to_str() {
            Ok(s) => Some(s.to_owned()),
            Err(_) => return -1,
        }
    };
    let result = catch_unwind(AssertUnwindSafe(|| init_engine(dir.as_deref())));
    match result {
        Ok(Ok(())) => 0,
        Ok(Err(e)) => {
            error!("predictor initialization failed: {}", e);
            -1
        }
        Err(_) => {
            error!("panic during predictor initialization");
            -1
        }
    }
}

/// Takes a JSON array of symptom identifiers and returns a JSON prediction
/// or `{"error": ...}`. Free the result with `predictor_free_string`.
///
/// # Safety
/// `symptoms_json` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn predictor_predict(symptoms_json: *const c_char) -> *mut c_char {
    if symptoms_json.is_null() {
        return into_c_string(json!({ "error": "null request" }).to_string());
    }
    let request = CStr::from_ptr(symptoms_json).to_string_lossy().into_owned();
    let response = catch_unwind(AssertUnwindSafe(|| predict_json(&request))).unwrap_or_else(|_| {
        error!("panic in predictor_predict");
        json!({ "error": "internal panic" }).to_string()
    });
    into_c_string(response)
}

/// # Safety
/// `s` must be null or a pointer returned by `predictor_predict` that was not freed yet.
#[no_mangle]
pub unsafe extern "C" fn predictor_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
