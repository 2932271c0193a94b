use std::fmt;

use crate::source::Item;

/// What a component would present. There is no renderer; `Display` gives a
/// plain-text rendition for logs and assertions.
#[derive(Clone, Debug, PartialEq)]
pub enum View {
    Text(String),
    /// Loading placeholder for the named item.
    Fallback { name: String },
    Data(Item),
    Error { message: String },
    Button { label: String },
    Swatch { color: Option<&'static str> },
    Column(Vec<View>),
}

impl View {
    pub fn text(s: impl Into<String>) -> Self {
        View::Text(s.into())
    }

    pub fn button(label: impl Into<String>) -> Self {
        View::Button {
            label: label.into(),
        }
    }

    /// Labels of all buttons in this subtree, in order.
    pub fn buttons(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_buttons(&mut out);
        out
    }

    fn collect_buttons<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            View::Button { label } => out.push(label),
            View::Column(children) => {
                for child in children {
                    child.collect_buttons(out);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Text(s) => f.write_str(s),
            View::Fallback { name } => write!(f, "Loading {name}..."),
            View::Data(item) => write!(f, "{} #{} (hp {})", item.name, item.number, item.hp),
            View::Error { message } => write!(f, "There was an error: {message}"),
            View::Button { label } => write!(f, "[{label}]"),
            View::Swatch { color } => write!(f, "<box {}>", color.unwrap_or("none")),
            View::Column(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
        }
    }
}
