//! ACM command implementation.

use std::path::{Path, PathBuf};
use vaultarc_acm::{AcmDecoder, AcmOptions};

/// Arguments of the `acm` command.
pub struct AcmArgs<'a> {
    pub input: &'a Path,
    pub output: Option<&'a Path>,
    pub channels: Option<u16>,
    pub stored_channels: bool,
    pub raw: bool,
    pub wavc: bool,
}

impl AcmArgs<'_> {
    fn options(&self) -> AcmOptions {
        let channels = if self.stored_channels {
            None
        } else {
            self.channels.or(AcmOptions::default().channels)
        };
        AcmOptions::default()
            .with_channels(channels)
            .with_wave_header(!self.raw)
            .with_accept_wavc(self.wavc)
    }

    fn output_path(&self) -> PathBuf {
        match self.output {
            Some(path) => path.to_path_buf(),
            None => self
                .input
                .with_extension(if self.raw { "raw" } else { "wav" }),
        }
    }
}

pub fn cmd_acm(args: &AcmArgs) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(args.input)?;
    let mut decoder = AcmDecoder::new(&data, args.options())?;
    let header = *decoder.header();

    println!("Input: {}", args.input.display());
    println!("  Samples: {}", header.num_samples);
    println!(
        "  Channels: {} (stored {})",
        header.channels, header.stored_channels
    );
    println!("  Sample rate: {} Hz", header.sample_rate);
    println!("  Level: {} ({} subbands)", header.level, header.num_subbands());
    println!("  Duration: {:.2} s", header.duration_secs());

    let bytes = decoder.to_bytes()?;
    let output = args.output_path();
    std::fs::write(&output, &bytes)?;
    println!("Wrote {} ({} bytes)", output.display(), bytes.len());

    Ok(())
}
