use anyhow::{Context, Result};
use log::info;
use rustfft::num_complex::Complex32;
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

pub const BLOCK_LEN: usize = 64;

const IQ_OFFSET: f32 = 127.0;
const IQ_SCALE: f32 = 1e-3;

/// Reader for interleaved unsigned 8-bit I/Q samples as written by rtl-sdr.
pub struct IqReader<R: Read> {
    inner: R,
    raw: Vec<u8>,
    total_samples: u64,
}

pub fn open_file<P: AsRef<Path>>(path: P) -> Result<IqReader<Box<dyn Read>>> {
    let path = path.as_ref();
    info!("Reading samples from {}", path.display());
    let file = File::open(path)
        .with_context(|| format!("Could not open {} for reading", path.display()))?;
    let inner: Box<dyn Read> = Box::new(BufReader::new(file));
    Ok(IqReader::new(inner))
}

pub fn open_stdin() -> IqReader<Box<dyn Read>> {
    info!("Reading samples from stdin");
    let inner: Box<dyn Read> = Box::new(BufReader::new(io::stdin()));
    IqReader::new(inner)
}

impl<R: Read> IqReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, raw: Vec::new(), total_samples: 0 }
    }

    /// Fills `buf` with complex samples and returns how many were decoded.
    /// Anything shorter than `buf.len()` means the stream has ended.
    pub fn read_block(&mut self, buf: &mut [Complex32]) -> io::Result<usize> {
        self.raw.resize(buf.len() * 2, 0);

        let mut filled = 0;
        while filled < self.raw.len() {
            match self.inner.read(&mut self.raw[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        let count = filled / 2;
        for (sample, pair) in buf.iter_mut().zip(self.raw[..count * 2].chunks_exact(2)) {
            *sample = iq_to_complex(pair[0], pair[1]);
        }
        self.total_samples += count as u64;
        Ok(count)
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }
}

pub fn iq_to_complex(i: u8, q: u8) -> Complex32 {
    Complex32::new((i as f32 - IQ_OFFSET) * IQ_SCALE, (q as f32 - IQ_OFFSET) * IQ_SCALE)
}
