/// Named event channels published by the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    DownloadStarted,
    DownloadProgress,
    DownloadFinished,
    TestEvent,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::DownloadStarted,
        Topic::DownloadProgress,
        Topic::DownloadFinished,
        Topic::TestEvent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Topic::DownloadStarted => "download-started",
            Topic::DownloadProgress => "download-progress",
            Topic::DownloadFinished => "download-finished",
            Topic::TestEvent => "test-event",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|topic| topic.name() == name)
    }

    /// Status text for one delivered payload.
    pub fn describe(self, payload: &str) -> String {
        match self {
            Topic::DownloadStarted => format!("download started: {payload}"),
            Topic::DownloadProgress => format!("download progress: {payload}%"),
            Topic::DownloadFinished => format!("download finished: {payload}"),
            Topic::TestEvent => format!("received event: {payload}"),
        }
    }
}
