//! A box whose color follows the viewport width.

use crate::media::{MediaEnvironment, use_media};
use crate::view::View;

pub const BIG: &str = "(min-width: 1000px)";
pub const MEDIUM: &str = "(max-width: 999px) and (min-width: 700px)";
pub const SMALL: &str = "(max-width: 699px)";

pub fn color_box(env: &MediaEnvironment) -> View {
    let is_big = use_media(env, BIG, false);
    let is_medium = use_media(env, MEDIUM, false);
    let is_small = use_media(env, SMALL, false);
    let color = if is_big {
        Some("green")
    } else if is_medium {
        Some("yellow")
    } else if is_small {
        Some("red")
    } else {
        None
    };
    View::Swatch { color }
}
