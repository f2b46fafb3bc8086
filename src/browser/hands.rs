//! Pose-provider bridge. The page bootstrap forwards each hand-tracking
//! result as a `hands-results` event on `window` whose detail carries
//! `image` and `multiHandLandmarks`.

use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::CustomEvent;

use crate::error::BrowserError;
use crate::state::landmark::{HandFrame, HandLandmarks, NormPoint};

pub const HANDS_EVENT: &str = "hands-results";

/// Decodes the JSON form of `multiHandLandmarks`. Hands without exactly 21
/// points are dropped; order of the remaining hands is preserved.
pub fn decode_hands(json: &str) -> Vec<HandLandmarks> {
    let raw: Vec<Vec<NormPoint>> = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "unreadable hand landmarks");
            return Vec::new();
        }
    };
    raw.iter()
        .enumerate()
        .filter_map(|(slot, points)| {
            let hand = HandLandmarks::from_slice(points);
            if hand.is_none() {
                warn!(slot, points = points.len(), "skipping malformed hand");
            }
            hand
        })
        .collect()
}

fn decode_detail(detail: &JsValue) -> Option<HandFrame<JsValue>> {
    let image = js_sys::Reflect::get(detail, &JsValue::from_str("image")).ok()?;
    if image.is_undefined() || image.is_null() {
        return None;
    }
    let landmarks = js_sys::Reflect::get(detail, &JsValue::from_str("multiHandLandmarks")).ok()?;
    let hands = if landmarks.is_undefined() || landmarks.is_null() {
        Vec::new()
    } else {
        js_sys::JSON::stringify(&landmarks)
            .ok()
            .and_then(|s| s.as_string())
            .map(|json| decode_hands(&json))
            .unwrap_or_default()
    };
    Some(HandFrame::new(image, hands))
}

/// Keeps the `hands-results` listener attached until dropped.
pub struct HandsListener {
    window: web_sys::Window,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl HandsListener {
    pub fn attach<F>(mut on_frame: F) -> Result<Self, BrowserError>
    where
        F: FnMut(HandFrame<JsValue>) + 'static,
    {
        let window = super::window()?;
        let callback = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let Some(event) = event.dyn_ref::<CustomEvent>() else {
                return;
            };
            match decode_detail(&event.detail()) {
                Some(frame) => on_frame(frame),
                None => warn!("hands event without a camera image"),
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        window.add_event_listener_with_callback(HANDS_EVENT, callback.as_ref().unchecked_ref())?;
        Ok(Self { window, callback })
    }
}

impl Drop for HandsListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback(HANDS_EVENT, self.callback.as_ref().unchecked_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_json(points: usize, x: f64) -> String {
        let pts: Vec<String> = (0..points)
            .map(|_| format!(r#"{{"x":{x},"y":0.5,"z":-0.01}}"#))
            .collect();
        format!("[{}]", pts.join(","))
    }

    #[test]
    fn decodes_two_hands_in_order() {
        let json = format!("[{},{}]", hand_json(21, 0.1), hand_json(21, 0.9));
        let hands = decode_hands(&json);
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[0].points()[0].x, 0.1);
        assert_eq!(hands[1].points()[20].x, 0.9);
    }

    #[test]
    fn short_hands_are_skipped() {
        let json = format!("[{},{}]", hand_json(20, 0.1), hand_json(21, 0.3));
        let hands = decode_hands(&json);
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].points()[0].x, 0.3);
    }

    #[test]
    fn garbage_yields_no_hands() {
        assert!(decode_hands("not json").is_empty());
        assert!(decode_hands("[]").is_empty());
    }
}
