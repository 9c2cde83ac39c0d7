//! Microphone capture via getUserMedia + MediaRecorder.
//!
//! The device is held only between `start` and `stop`/`cancel`: every
//! track is stopped the instant capture ends, before the captured
//! bytes are even assembled, so nothing is held across the network
//! round-trip that follows.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobEvent, MediaRecorder, MediaStream, MediaStreamConstraints, MediaStreamTrack};

use voxdoc_core::ports::CapturePort;
use voxdoc_types::{Result, VoxError};

use crate::{js_error_text, js_interop};

struct ActiveCapture {
    recorder: MediaRecorder,
    stream: MediaStream,
    chunks: Rc<RefCell<Vec<Blob>>>,
    stopped: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
pub struct MediaRecorderCapture {
    active: RefCell<Option<ActiveCapture>>,
}

impl MediaRecorderCapture {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl CapturePort for MediaRecorderCapture {
    async fn start(&self) -> Result<()> {
        if self.active.borrow().is_some() {
            return Ok(());
        }

        let window =
            web_sys::window().ok_or_else(|| VoxError::Capture("no window".to_string()))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|_| VoxError::Capture("media devices unavailable".to_string()))?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::TRUE);
        constraints.set_video(&JsValue::FALSE);

        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(capture_error)?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(capture_error)?
            .dyn_into()
            .map_err(|_| VoxError::Capture("getUserMedia returned no stream".to_string()))?;

        let recorder = match MediaRecorder::new_with_media_stream(&stream) {
            Ok(recorder) => recorder,
            Err(e) => {
                release_tracks(&stream);
                return Err(capture_error(e));
            }
        };

        let chunks: Rc<RefCell<Vec<Blob>>> = Rc::new(RefCell::new(Vec::new()));
        {
            let chunks = chunks.clone();
            let ondata = Closure::wrap(Box::new(move |event: BlobEvent| {
                if let Some(blob) = event.data() {
                    chunks.borrow_mut().push(blob);
                }
            }) as Box<dyn FnMut(BlobEvent)>);
            recorder.set_ondataavailable(Some(ondata.as_ref().unchecked_ref()));
            ondata.forget();
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        {
            let stop_tx = Rc::new(RefCell::new(Some(stop_tx)));
            let onstop = Closure::wrap(Box::new(move |_: web_sys::Event| {
                if let Some(tx) = stop_tx.borrow_mut().take() {
                    let _ = tx.send(());
                }
            }) as Box<dyn FnMut(web_sys::Event)>);
            recorder.set_onstop(Some(onstop.as_ref().unchecked_ref()));
            onstop.forget();
        }

        if let Err(e) = recorder.start() {
            release_tracks(&stream);
            return Err(capture_error(e));
        }

        *self.active.borrow_mut() = Some(ActiveCapture {
            recorder,
            stream,
            chunks,
            stopped: Some(stop_rx),
        });
        log::info!("Microphone capture armed");
        Ok(())
    }

    async fn stop(&self) -> Result<Vec<u8>> {
        let Some(mut active) = self.active.borrow_mut().take() else {
            return Err(VoxError::Capture("no recording in progress".to_string()));
        };
        let stopped = active.stopped.take();
        let _ = active.recorder.stop();
        release_tracks(&active.stream);

        // The final dataavailable arrives before the stop event
        if let Some(stopped) = stopped {
            let _ = stopped.await;
        }

        let parts = js_sys::Array::new();
        for blob in active.chunks.borrow().iter() {
            parts.push(blob);
        }
        let blob = Blob::new_with_blob_sequence(parts.as_ref()).map_err(js_interop)?;
        let buffer = JsFuture::from(blob.array_buffer())
            .await
            .map_err(js_interop)?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        log::info!("Captured {} bytes of audio", bytes.len());
        Ok(bytes)
    }

    fn cancel(&self) {
        if let Some(active) = self.active.borrow_mut().take() {
            let _ = active.recorder.stop();
            release_tracks(&active.stream);
        }
    }

    fn is_capturing(&self) -> bool {
        self.active.borrow().is_some()
    }
}

fn release_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        let track: MediaStreamTrack = track.unchecked_into();
        track.stop();
    }
}

fn capture_error(value: JsValue) -> VoxError {
    let text = js_error_text(&value);
    if text.starts_with("NotAllowedError") {
        VoxError::Capture("microphone permission denied".to_string())
    } else {
        VoxError::Capture(text)
    }
}
