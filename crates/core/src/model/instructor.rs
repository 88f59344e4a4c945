/// Placeholder shown when the instructor table leaves a required field blank.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Contact card of the person running the quizzes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorProfile {
    pub name: String,
    pub photo_url: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub contacts: String,
    /// Lines joined with `\n`; blank lines are kept.
    pub description: String,
}

impl Default for InstructorProfile {
    fn default() -> Self {
        Self {
            name: NOT_SPECIFIED.to_string(),
            photo_url: None,
            audio_url: None,
            video_url: None,
            contacts: NOT_SPECIFIED.to_string(),
            description: String::new(),
        }
    }
}

impl InstructorProfile {
    /// Media links in the order they are presented.
    pub fn media(&self) -> impl Iterator<Item = &str> {
        [&self.photo_url, &self.video_url, &self.audio_url]
            .into_iter()
            .filter_map(|url| url.as_deref())
    }
}
