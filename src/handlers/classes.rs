//! Supported ornament categories

use axum::Json;
use serde::Serialize;

use crate::labels::{OrnamentClass, CLASSES};

#[derive(Debug, Serialize)]
pub struct ClassesResponse {
    pub count: usize,
    pub classes: &'static [OrnamentClass],
}

pub async fn list() -> Json<ClassesResponse> {
    Json(ClassesResponse {
        count: CLASSES.len(),
        classes: &CLASSES,
    })
}
