//! MFCC extraction: framing, spectra, Mel filterbank, log energies and DCT.

pub mod cepstrum;
pub mod delta;
pub mod energy;
pub mod error;
pub mod features;
pub mod filterbank;
pub mod framer;
pub mod pipeline;
pub mod spectrum;
pub mod window;

pub use error::DspError;
pub use pipeline::{MfccExtractor, extract_mfcc};
