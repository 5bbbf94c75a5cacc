use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ConvertError;

/// Engine the service uses to fetch a remote input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    #[default]
    Auto,
    Video,
    File,
    Website,
    Screenshot,
    ScreenshotPdf,
}

impl Engine {
    pub const ALL: [Engine; 6] = [
        Engine::Auto,
        Engine::Video,
        Engine::File,
        Engine::Website,
        Engine::Screenshot,
        Engine::ScreenshotPdf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Auto => "auto",
            Engine::Video => "video",
            Engine::File => "file",
            Engine::Website => "website",
            Engine::Screenshot => "screenshot",
            Engine::ScreenshotPdf => "screenshot_pdf",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Engine::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| ConvertError::InvalidEngine(s.to_string()))
    }
}

/// One input of a job, tagged on `type` the way the service expects it.
///
/// Only [`Input::Upload`] needs client-side work: its bytes are pushed to the
/// job's upload server. Every other variant is fetched by the service itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    /// A local file to upload.
    Upload { source: PathBuf },

    /// A URL the service downloads.
    Remote {
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        engine: Option<Engine>,
    },

    /// The id of an output produced by a previous job.
    InputId { source: Uuid },

    /// A file picked from Google Drive.
    GdrivePicker {
        source: String,
        #[serde(default)]
        filename: String,
        #[serde(default)]
        content_type: String,
        credentials: Map<String, Value>,
    },

    /// A file stored with a cloud provider.
    Cloud {
        source: String,
        #[serde(default)]
        parameters: Map<String, Value>,
        #[serde(default)]
        credentials: Map<String, Value>,
    },
}

impl Input {
    pub fn upload(path: impl Into<PathBuf>) -> Self {
        Input::Upload {
            source: path.into(),
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Input::Remote {
            source: url.into(),
            engine: None,
        }
    }

    pub fn remote_with_engine(url: impl Into<String>, engine: Engine) -> Self {
        Input::Remote {
            source: url.into(),
            engine: Some(engine),
        }
    }

    pub fn input_id(id: Uuid) -> Self {
        Input::InputId { source: id }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Input::Upload { .. } => "upload",
            Input::Remote { .. } => "remote",
            Input::InputId { .. } => "input_id",
            Input::GdrivePicker { .. } => "gdrive_picker",
            Input::Cloud { .. } => "cloud",
        }
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, Input::Upload { .. })
    }
}

/// Split inputs into (uploads, everything the service fetches itself),
/// preserving their order.
pub fn partition_inputs(inputs: Vec<Input>) -> (Vec<Input>, Vec<Input>) {
    inputs.into_iter().partition(Input::is_upload)
}
