use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateLessonRequest {
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub position: i32,
    #[serde(default)]
    pub duration_seconds: i32,
}
