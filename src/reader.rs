use std::{
    io::{ErrorKind, Read, Write},
    iter::FusedIterator,
};

use bytes::{Buf, Bytes};

use crate::{
    cursor::FrameCursor,
    error::Result,
    frame::Frame,
    options::ReaderOptions,
};

/// Reads consecutive frames from a byte stream.
///
/// A stream that ends between two frames ends cleanly. A stream that ends
/// inside a frame yields `TruncatedFrame`.
pub struct FrameReader<R> {
    inner: R,
    cursor: FrameCursor,
    read_buf: Vec<u8>,

    // Read but not yet consumed by the cursor.
    pending: Bytes,
    frames_read: u64,

    // Set on end of stream or on the first error.
    done: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_options(inner, ReaderOptions::default())
    }

    pub fn with_options(inner: R, options: ReaderOptions) -> Self {
        Self {
            inner,
            cursor: FrameCursor::with_options(&options),
            read_buf: vec![0; options.read_buf_size.max(1)],
            pending: Bytes::new(),
            frames_read: 0,
            done: false,
        }
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Next frame of the stream.
    ///
    /// After the stream ends or any error is returned, every further call
    /// returns `Ok(None)`.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.done {
            return Ok(None);
        }
        let res = self.read_frame();
        if !matches!(res, Ok(Some(_))) {
            self.done = true;
        }
        res
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if self.pending.has_remaining() {
                if let Some(frame) = self.cursor.feed(&mut self.pending)? {
                    self.cursor.reset();
                    self.frames_read += 1;
                    tracing::trace!(
                        "frame {} read, event code: {:#06x}, len: {}",
                        self.frames_read,
                        frame.header().event_code(),
                        frame.len()
                    );
                    return Ok(Some(frame));
                }
            }

            let n = match self.inner.read(&mut self.read_buf) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                tracing::debug!("end of stream after {} frames", self.frames_read);
                self.cursor.finish()?;
                return Ok(None);
            }
            self.pending = Bytes::copy_from_slice(&self.read_buf[..n]);
        }
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

impl<R: Read> FusedIterator for FrameReader<R> {}

pub fn write_frame(w: &mut impl Write, frame: &Frame) -> Result<()> {
    w.write_all(frame.as_bytes())?;
    Ok(())
}
