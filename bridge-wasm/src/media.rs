//! `HTMLAudioElement`-backed media.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    media::{
        MediaBackend, MediaElement, MediaErrorCode, MediaEvent, MediaListener, PlayRejection,
        ReadyState,
    },
};
use futures::channel::oneshot;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlAudioElement};

use crate::error::js_message;

const FORWARDED_EVENTS: &[&str] = &[
    "loadstart",
    "canplay",
    "canplaythrough",
    "playing",
    "pause",
    "ended",
    "waiting",
    "stalled",
    "timeupdate",
    "error",
];

type EventClosure = Closure<dyn FnMut(Event)>;

#[derive(Debug, Default)]
pub struct HtmlAudioBackend;

impl HtmlAudioBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl MediaBackend for HtmlAudioBackend {
    fn create_element(&self) -> Arc<dyn MediaElement> {
        Arc::new(HtmlAudio::new())
    }

    /// Load `url` into a detached element with `preload="auto"` and wait for
    /// `canplaythrough`.
    async fn prefetch(&self, url: &str) -> BridgeResult<()> {
        let audio = HtmlAudioElement::new()
            .map_err(|err| BridgeError::NotAvailable(js_message(&err)))?;
        audio.set_preload("auto");

        let (tx, rx) = oneshot::channel::<Result<(), String>>();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let ready_tx = Rc::clone(&tx);
        let on_ready = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            if let Some(tx) = ready_tx.borrow_mut().take() {
                let _ = tx.send(Ok(()));
            }
        });
        let error_tx = Rc::clone(&tx);
        let failed = audio.clone();
        let on_error = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let reason = failed
                .error()
                .map(|e| MediaErrorCode::from_code(e.code()).to_string())
                .unwrap_or_else(|| "unknown media error".to_string());
            if let Some(tx) = error_tx.borrow_mut().take() {
                let _ = tx.send(Err(reason));
            }
        });

        audio.set_oncanplaythrough(Some(on_ready.as_ref().unchecked_ref()));
        audio.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        audio.set_src(url);

        let outcome = rx.await;
        audio.set_oncanplaythrough(None);
        audio.set_onerror(None);

        match outcome {
            Ok(Ok(())) => {
                debug!(url, "Audio preloaded");
                Ok(())
            }
            Ok(Err(reason)) => Err(BridgeError::Media(format!("{}: {}", url, reason))),
            Err(_) => Err(BridgeError::Media(format!("{}: preload abandoned", url))),
        }
    }

    fn can_play_type(&self, mime: &str) -> bool {
        HtmlAudioElement::new()
            .map(|audio| !audio.can_play_type(mime).is_empty())
            .unwrap_or(false)
    }
}

// =============================================================================
// Element
// =============================================================================

/// One `<audio>` element with its DOM listeners.
///
/// `element` is `None` when the document refused to create one; every
/// operation then degrades to a no-op and `play` is rejected.
pub struct HtmlAudio {
    element: Option<HtmlAudioElement>,
    listener: Rc<RefCell<Option<MediaListener>>>,
    closures: RefCell<Vec<(&'static str, EventClosure)>>,
}

impl HtmlAudio {
    fn new() -> Self {
        let element = match HtmlAudioElement::new() {
            Ok(element) => {
                element.set_preload("none");
                Some(element)
            }
            Err(err) => {
                warn!(error = %js_message(&err), "Could not create audio element");
                None
            }
        };
        let audio = Self {
            element,
            listener: Rc::new(RefCell::new(None)),
            closures: RefCell::new(Vec::new()),
        };
        audio.attach();
        audio
    }

    fn attach(&self) {
        let Some(element) = &self.element else {
            return;
        };
        let mut closures = self.closures.borrow_mut();
        for &name in FORWARDED_EVENTS {
            let listener = Rc::clone(&self.listener);
            let source = element.clone();
            let closure = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                let Some(event) = translate(name, &source) else {
                    return;
                };
                let current = listener.borrow().clone();
                if let Some(callback) = current {
                    callback(event);
                }
            });
            if element
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
                .is_ok()
            {
                closures.push((name, closure));
            }
        }
    }
}

fn translate(name: &str, element: &HtmlAudioElement) -> Option<MediaEvent> {
    Some(match name {
        "loadstart" => MediaEvent::LoadStart,
        "canplay" => MediaEvent::CanPlay,
        "canplaythrough" => MediaEvent::CanPlayThrough,
        "playing" => MediaEvent::Playing,
        "pause" => MediaEvent::Paused,
        "ended" => MediaEvent::Ended,
        "waiting" => MediaEvent::Waiting,
        "stalled" => MediaEvent::Stalled,
        "timeupdate" => MediaEvent::TimeUpdate(element.current_time()),
        "error" => MediaEvent::Error(
            element
                .error()
                .map(|e| MediaErrorCode::from_code(e.code()))
                .unwrap_or(MediaErrorCode::Unknown),
        ),
        _ => return None,
    })
}

fn rejection(err: &JsValue) -> PlayRejection {
    match err.dyn_ref::<web_sys::DomException>().map(|e| e.name()) {
        Some(name) if name == "NotAllowedError" => PlayRejection::NotAllowed,
        Some(name) if name == "NotSupportedError" => PlayRejection::NotSupported,
        Some(name) if name == "AbortError" => PlayRejection::Aborted,
        _ => PlayRejection::Other(js_message(err)),
    }
}

#[async_trait(?Send)]
impl MediaElement for HtmlAudio {
    fn set_source(&self, url: &str) {
        if let Some(element) = &self.element {
            element.set_preload("auto");
            element.set_src(url);
            element.load();
        }
    }

    fn source(&self) -> Option<String> {
        self.element
            .as_ref()
            .and_then(|element| element.get_attribute("src"))
    }

    fn clear_source(&self) {
        if let Some(element) = &self.element {
            let _ = element.remove_attribute("src");
            element.load();
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.element
            .as_ref()
            .map(|element| ReadyState::from_code(element.ready_state()))
            .unwrap_or(ReadyState::HaveNothing)
    }

    async fn play(&self) -> Result<(), PlayRejection> {
        let Some(element) = &self.element else {
            return Err(PlayRejection::NotSupported);
        };
        let promise = element.play().map_err(|err| rejection(&err))?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| rejection(&err))
    }

    fn pause(&self) {
        if let Some(element) = &self.element {
            let _ = element.pause();
        }
    }

    fn current_time(&self) -> f64 {
        self.element.as_ref().map_or(0.0, |e| e.current_time())
    }

    fn set_current_time(&self, seconds: f64) {
        if let Some(element) = &self.element {
            element.set_current_time(seconds);
        }
    }

    fn duration(&self) -> Option<f64> {
        self.element
            .as_ref()
            .map(|e| e.duration())
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    fn volume(&self) -> f64 {
        self.element.as_ref().map_or(1.0, |e| e.volume())
    }

    fn set_volume(&self, volume: f64) {
        if let Some(element) = &self.element {
            element.set_volume(volume.clamp(0.0, 1.0));
        }
    }

    fn muted(&self) -> bool {
        self.element.as_ref().is_some_and(|e| e.muted())
    }

    fn set_muted(&self, muted: bool) {
        if let Some(element) = &self.element {
            element.set_muted(muted);
        }
    }

    fn error_code(&self) -> Option<MediaErrorCode> {
        match &self.element {
            Some(element) => element.error().map(|e| MediaErrorCode::from_code(e.code())),
            None => Some(MediaErrorCode::SrcNotSupported),
        }
    }

    fn set_listener(&self, listener: Option<MediaListener>) {
        *self.listener.borrow_mut() = listener;
    }
}

impl Drop for HtmlAudio {
    fn drop(&mut self) {
        let Some(element) = &self.element else {
            return;
        };
        let _ = element.pause();
        for (name, closure) in self.closures.borrow_mut().drain(..) {
            let _ = element
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}
