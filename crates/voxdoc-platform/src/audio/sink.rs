//! Audio sink backed by a single detached `HtmlAudioElement`.
//!
//! The element's lifecycle callbacks (canplay / ended / error) are
//! installed once and forwarded into the channel of whichever
//! rendition is current. Starting a new rendition replaces the sender,
//! which closes the previous rendition's stream; that is how the
//! playback controller observes its interruption.

use std::cell::{Cell, RefCell};
use std::pin::Pin;
use std::rc::Rc;

use futures::channel::mpsc::{self, UnboundedSender};
use futures::Stream;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use voxdoc_core::ports::{AudioSinkPort, SinkEvent};
use voxdoc_types::{audio::PlaybackErrorKind, Result};

use crate::{js_error_text, js_interop};

type CurrentSender = Rc<RefCell<Option<UnboundedSender<SinkEvent>>>>;

pub struct HtmlAudioSink {
    element: HtmlAudioElement,
    current: CurrentSender,
    playing: Rc<Cell<bool>>,
}

impl HtmlAudioSink {
    pub fn new() -> Result<Self> {
        let element = HtmlAudioElement::new().map_err(js_interop)?;
        let current: CurrentSender = Rc::new(RefCell::new(None));
        let playing = Rc::new(Cell::new(false));

        {
            let current = current.clone();
            let playing = playing.clone();
            let oncanplay = Closure::wrap(Box::new(move |_: web_sys::Event| {
                playing.set(true);
                if let Some(tx) = current.borrow().as_ref() {
                    let _ = tx.unbounded_send(SinkEvent::Loaded);
                }
            }) as Box<dyn FnMut(web_sys::Event)>);
            element.set_oncanplay(Some(oncanplay.as_ref().unchecked_ref()));
            oncanplay.forget();
        }

        {
            let current = current.clone();
            let playing = playing.clone();
            let onended = Closure::wrap(Box::new(move |_: web_sys::Event| {
                playing.set(false);
                // Taking the sender closes the stream after Ended
                let sender = current.borrow_mut().take();
                if let Some(tx) = sender {
                    let _ = tx.unbounded_send(SinkEvent::Ended);
                }
            }) as Box<dyn FnMut(web_sys::Event)>);
            element.set_onended(Some(onended.as_ref().unchecked_ref()));
            onended.forget();
        }

        {
            let current = current.clone();
            let playing = playing.clone();
            let element_for_error = element.clone();
            let onerror = Closure::wrap(Box::new(move |_: web_sys::Event| {
                playing.set(false);
                let kind = element_for_error
                    .error()
                    .map(|e| map_media_error(e.code()))
                    .unwrap_or(PlaybackErrorKind::Decode);
                let sender = current.borrow_mut().take();
                if let Some(tx) = sender {
                    let _ = tx.unbounded_send(SinkEvent::Error(kind));
                }
            }) as Box<dyn FnMut(web_sys::Event)>);
            element.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onerror.forget();
        }

        Ok(Self {
            element,
            current,
            playing,
        })
    }
}

impl AudioSinkPort for HtmlAudioSink {
    fn play(&self, url: &str) -> Pin<Box<dyn Stream<Item = SinkEvent>>> {
        let (tx, rx) = mpsc::unbounded();

        // Replacing the sender is the interrupt: the superseded
        // rendition's stream closes without another event
        let _ = self.element.pause();
        *self.current.borrow_mut() = Some(tx);
        self.playing.set(false);
        self.element.set_src(url);

        match self.element.play() {
            Ok(promise) => {
                let current = self.current.clone();
                let playing = self.playing.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = JsFuture::from(promise).await {
                        playing.set(false);
                        let sender = current.borrow_mut().take();
                        if let Some(tx) = sender {
                            let _ = tx.unbounded_send(SinkEvent::Error(map_play_rejection(&e)));
                        }
                    }
                });
            }
            Err(e) => {
                let sender = self.current.borrow_mut().take();
                if let Some(tx) = sender {
                    let _ = tx.unbounded_send(SinkEvent::Error(map_play_rejection(&e)));
                }
            }
        }

        Box::pin(rx)
    }

    fn stop(&self) {
        self.current.borrow_mut().take();
        let _ = self.element.pause();
        self.element.set_current_time(0.0);
        self.playing.set(false);
    }

    fn is_playing(&self) -> bool {
        self.playing.get()
    }
}

/// MediaError codes per the HTML spec
fn map_media_error(code: u16) -> PlaybackErrorKind {
    match code {
        1 => PlaybackErrorKind::Aborted,          // MEDIA_ERR_ABORTED
        2 => PlaybackErrorKind::Network,          // MEDIA_ERR_NETWORK
        3 => PlaybackErrorKind::Decode,           // MEDIA_ERR_DECODE
        4 => PlaybackErrorKind::FormatUnsupported, // MEDIA_ERR_SRC_NOT_SUPPORTED
        _ => PlaybackErrorKind::Decode,
    }
}

/// `play()` rejections carry a DOMException name
fn map_play_rejection(error: &JsValue) -> PlaybackErrorKind {
    let text = js_error_text(error);
    if text.starts_with("NotAllowedError") {
        PlaybackErrorKind::PermissionDenied
    } else if text.starts_with("NotSupportedError") {
        PlaybackErrorKind::FormatUnsupported
    } else if text.starts_with("AbortError") {
        PlaybackErrorKind::Aborted
    } else {
        log::warn!("Unclassified play() rejection: {}", text);
        PlaybackErrorKind::Decode
    }
}
