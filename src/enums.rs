use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for Value {
            fn from(value: $name) -> Self {
                Value::String(value.as_str().to_string())
            }
        }
    };
}

string_enum!(ImageGravity {
    Center => "center",
    TopLeft => "top-left",
    Top => "top",
    TopRight => "top-right",
    Left => "left",
    Right => "right",
    BottomLeft => "bottom-left",
    Bottom => "bottom",
    BottomRight => "bottom-right",
});

string_enum!(ImageFormat {
    Jpg => "jpg",
    Jpeg => "jpeg",
    Gif => "gif",
    Png => "png",
    Webp => "webp",
});

string_enum!(Compression {
    None => "none",
    Gzip => "gzip",
    Zstd => "zstd",
});
