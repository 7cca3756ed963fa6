//! Outgoing message kinds. Rich templates serialize to the field map Viber's `send_message` expects.

use serde_json::{json, Map, Value};

/// Everything the driver can send. Plain text is handled by the payload builder; every other
/// kind contributes its own fields through [`OutgoingMessage::template_fields`].
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingMessage {
    Text(String),
    Contact(ContactTemplate),
    File(FileTemplate),
    Keyboard(KeyboardTemplate),
    Link(LinkTemplate),
    Location(LocationTemplate),
    Picture(PictureTemplate),
    Video(VideoTemplate),
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Field map of a rich template; `None` for plain text.
    pub fn template_fields(&self) -> Option<Map<String, Value>> {
        let value = match self {
            Self::Text(_) => return None,
            Self::Contact(t) => t.to_json(),
            Self::File(t) => t.to_json(),
            Self::Keyboard(t) => t.to_json(),
            Self::Link(t) => t.to_json(),
            Self::Location(t) => t.to_json(),
            Self::Picture(t) => t.to_json(),
            Self::Video(t) => t.to_json(),
        };
        match value {
            Value::Object(map) => Some(map),
            _ => Some(Map::new()),
        }
    }
}

impl From<&str> for OutgoingMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for OutgoingMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Share a contact card.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactTemplate {
    pub name: String,
    pub phone_number: String,
}

impl ContactTemplate {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "type": "contact",
            "contact": { "name": self.name, "phone_number": self.phone_number },
        })
    }
}

/// File attachment. `size` is in bytes and required by Viber.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTemplate {
    pub url: String,
    pub size: u64,
    pub file_name: String,
}

impl FileTemplate {
    pub fn new(url: impl Into<String>, size: u64, file_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            size,
            file_name: file_name.into(),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "type": "file",
            "media": self.url,
            "size": self.size,
            "file_name": self.file_name,
        })
    }
}

/// A reply button of a custom keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardButton {
    pub text: String,
    /// Sent back as the message text when pressed (for `reply`) or opened (for `open-url`).
    pub action_body: String,
    pub action_type: String,
    pub text_size: String,
    pub columns: Option<u8>,
    pub rows: Option<u8>,
    pub bg_color: Option<String>,
}

impl KeyboardButton {
    pub fn reply(text: impl Into<String>, action_body: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action_body: action_body.into(),
            action_type: "reply".to_string(),
            text_size: "regular".to_string(),
            columns: None,
            rows: None,
            bg_color: None,
        }
    }

    pub fn open_url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            action_type: "open-url".to_string(),
            ..Self::reply(text, url)
        }
    }

    pub fn size(mut self, columns: u8, rows: u8) -> Self {
        self.columns = Some(columns);
        self.rows = Some(rows);
        self
    }

    pub fn bg_color(mut self, color: impl Into<String>) -> Self {
        self.bg_color = Some(color.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut button = json!({
            "ActionType": self.action_type,
            "ActionBody": self.action_body,
            "Text": self.text,
            "TextSize": self.text_size,
        });
        if let Some(c) = self.columns {
            button["Columns"] = json!(c);
        }
        if let Some(r) = self.rows {
            button["Rows"] = json!(r);
        }
        if let Some(ref color) = self.bg_color {
            button["BgColor"] = json!(color);
        }
        button
    }
}

/// Text message with a custom keyboard attached.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardTemplate {
    pub text: String,
    pub buttons: Vec<KeyboardButton>,
    pub default_height: bool,
}

impl KeyboardTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
            default_height: false,
        }
    }

    pub fn button(mut self, button: KeyboardButton) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn default_height(mut self, default_height: bool) -> Self {
        self.default_height = default_height;
        self
    }

    fn to_json(&self) -> Value {
        let buttons: Vec<Value> = self.buttons.iter().map(KeyboardButton::to_json).collect();
        json!({
            "type": "text",
            "text": self.text,
            "keyboard": {
                "Type": "keyboard",
                "DefaultHeight": self.default_height,
                "Buttons": buttons,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkTemplate {
    pub url: String,
}

impl LinkTemplate {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn to_json(&self) -> Value {
        json!({ "type": "url", "media": self.url })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationTemplate {
    pub lat: f64,
    pub lon: f64,
}

impl LocationTemplate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    fn to_json(&self) -> Value {
        json!({
            "type": "location",
            "location": { "lat": self.lat, "lon": self.lon },
        })
    }
}

/// Image with a caption. Viber limits the caption to 120 characters; not enforced here.
#[derive(Debug, Clone, PartialEq)]
pub struct PictureTemplate {
    pub url: String,
    pub text: String,
    pub thumbnail: Option<String>,
}

impl PictureTemplate {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            thumbnail: None,
        }
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut v = json!({ "type": "picture", "text": self.text, "media": self.url });
        if let Some(ref t) = self.thumbnail {
            v["thumbnail"] = json!(t);
        }
        v
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoTemplate {
    pub url: String,
    pub size: u64,
    /// Seconds.
    pub duration: Option<u32>,
    pub thumbnail: Option<String>,
}

impl VideoTemplate {
    pub fn new(url: impl Into<String>, size: u64) -> Self {
        Self {
            url: url.into(),
            size,
            duration: None,
            thumbnail: None,
        }
    }

    pub fn duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut v = json!({ "type": "video", "media": self.url, "size": self.size });
        if let Some(d) = self.duration {
            v["duration"] = json!(d);
        }
        if let Some(ref t) = self.thumbnail {
            v["thumbnail"] = json!(t);
        }
        v
    }
}
