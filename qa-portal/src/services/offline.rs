//! Canned replies for the offline chat widget. No network access.

use chrono::{DateTime, Local, TimeZone};

pub const EMPTY_MESSAGE_REPLY: &str = "Please type a message so I can help.";

const TESTING_REPLY: &str = "Software testing checks that an application behaves as expected \
by exercising it against requirements and looking for defects before users do.";

const AUTOMATION_REPLY: &str = "Automation testing uses scripts and tools such as Selenium, \
Playwright or pytest to run repeatable checks quickly, usually as part of a CI pipeline.";

/// Keyword-rule responder used when no model is involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineResponder;

impl OfflineResponder {
    pub fn respond(&self, message: &str, display_name: Option<&str>) -> String {
        self.respond_at(message, display_name, Local::now())
    }

    /// Same as [`respond`](Self::respond) with an explicit clock reading.
    pub fn respond_at<Tz>(
        &self,
        message: &str,
        display_name: Option<&str>,
        now: DateTime<Tz>,
    ) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        if message.trim().is_empty() {
            return EMPTY_MESSAGE_REPLY.to_string();
        }

        let lowered = message.to_lowercase();

        if lowered.contains("hello") || lowered.contains("hi") {
            let name = display_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or("there");
            format!("Hello, {}! How can I help with your testing today?", name)
        } else if lowered.contains("time") {
            format!("The current time is {}.", now.format("%Y-%m-%d %H:%M:%S"))
        } else if lowered.contains("date") {
            format!("Today's date is {}.", now.format("%B %d, %Y"))
        } else if lowered.contains("testing") {
            TESTING_REPLY.to_string()
        } else if lowered.contains("automation") {
            AUTOMATION_REPLY.to_string()
        } else {
            format!("(offline response) You said: {}", message)
        }
    }
}
