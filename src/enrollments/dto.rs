use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub progress: i32,
}

pub(crate) fn progress_in_bounds(progress: i32) -> bool {
    (0..=100).contains(&progress)
}
