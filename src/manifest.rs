use serde::{Deserialize, Serialize};

/// Name of the meta tag the host platform's discovery mechanism reads.
pub const FRAME_META_NAME: &str = "fc:frame";

/// Static declaration of the app to the embedding platform: name, thumbnail,
/// launch URL, splash appearance. Pure configuration; the embedder serves it
/// via page metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniAppManifest {
    pub version: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub button: LaunchButton,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchButton {
    pub title: String,
    pub action: LaunchAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "splashImageUrl")]
    pub splash_image_url: String,
    #[serde(rename = "splashBackgroundColor")]
    pub splash_background_color: String,
}

impl MiniAppManifest {
    pub fn new(
        name: impl Into<String>,
        button_title: impl Into<String>,
        launch_url: impl Into<String>,
        image_url: impl Into<String>,
        splash_image_url: impl Into<String>,
        splash_background_color: impl Into<String>,
    ) -> Self {
        MiniAppManifest {
            version: "next".to_string(),
            image_url: image_url.into(),
            button: LaunchButton {
                title: button_title.into(),
                action: LaunchAction {
                    kind: "launch_frame".to_string(),
                    name: name.into(),
                    url: launch_url.into(),
                    splash_image_url: splash_image_url.into(),
                    splash_background_color: splash_background_color.into(),
                },
            },
        }
    }

    /// Content for the `fc:frame` meta tag.
    pub fn frame_meta(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_meta_has_the_discovery_shape() {
        let manifest = MiniAppManifest::new(
            "CastPoll",
            "Open CastPoll",
            "https://castpoll.app",
            "https://castpoll.app/thumbnail.png",
            "https://castpoll.app/splash.svg",
            "#ffffff",
        );
        let meta = manifest.frame_meta().unwrap();
        let value: serde_json::Value = serde_json::from_str(&meta).unwrap();

        assert_eq!(value["version"], "next");
        assert_eq!(value["button"]["action"]["type"], "launch_frame");
        assert_eq!(value["button"]["action"]["name"], "CastPoll");
        assert_eq!(value["button"]["action"]["splashBackgroundColor"], "#ffffff");
        assert!(value["imageUrl"].is_string());

        let back: MiniAppManifest = serde_json::from_str(&meta).unwrap();
        assert_eq!(back, manifest);
    }
}
