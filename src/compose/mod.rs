use anyhow::Context;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::IntoSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

use crate::acquire::scan_downloads;
use crate::Result;

/// Sample rate of the rendered mashup (44.1 kHz stereo PCM)
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Summary of a finished composition, for logs and the final status line.
#[derive(Debug, Clone, Copy)]
pub struct CompositeStats {
    /// Number of source clips that made it into the mashup
    pub clip_count: usize,

    /// Rendered duration in seconds
    pub duration_secs: f64,
}

/// Decodes every recognized file in a download directory, truncates each to
/// the requested clip duration, concatenates them in file-name order, and
/// renders one 16-bit stereo WAV.
///
/// Unreadable or undecodable files are skipped with a warning; the stage
/// fails only when nothing at all could be decoded, and it fails without
/// writing an output file.
pub struct AudioCompositor {
    clip_duration_secs: u32,
    target_sample_rate: u32,
}

impl AudioCompositor {
    pub fn new(clip_duration_secs: u32) -> Self {
        Self {
            clip_duration_secs,
            target_sample_rate: TARGET_SAMPLE_RATE,
        }
    }

    /// Build the mashup from `download_dir` and render it to `output_path`.
    pub fn compose(&self, download_dir: &Path, output_path: &Path) -> Result<CompositeStats> {
        let assets = scan_downloads(download_dir)?;

        if assets.is_empty() {
            anyhow::bail!(
                "no downloaded audio found in {}",
                download_dir.display()
            );
        }

        let mut composite: Vec<f32> = Vec::new();
        let mut clip_count = 0usize;

        for asset in &assets {
            match self.decode_clip(&asset.path) {
                Ok(samples) => {
                    tracing::debug!(
                        "Appending {} ({:.2}s)",
                        asset.path.display(),
                        samples.len() as f64 / 2.0 / self.target_sample_rate as f64
                    );
                    composite.extend_from_slice(&samples);
                    clip_count += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {:#}", asset.path.display(), e);
                }
            }
        }

        if composite.is_empty() {
            anyhow::bail!(
                "none of the {} downloaded file(s) could be decoded",
                assets.len()
            );
        }

        self.render_wav(&composite, output_path)?;

        let stats = CompositeStats {
            clip_count,
            duration_secs: composite.len() as f64 / 2.0 / self.target_sample_rate as f64,
        };

        tracing::info!(
            "Rendered {} clip(s), {:.2}s total, to {}",
            stats.clip_count,
            stats.duration_secs,
            output_path.display()
        );

        Ok(stats)
    }

    /// Decode one source file into interleaved stereo f32 at the target
    /// sample rate, truncated to the first `clip_duration_secs` seconds. A
    /// source shorter than the clip duration is kept whole.
    fn decode_clip(&self, path: &Path) -> Result<Vec<f32>> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension() {
            hint.with_extension(ext.to_str().unwrap_or(""));
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .context("Failed to probe audio format")?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .context("No audio tracks found in file")?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let native_sample_rate = codec_params
            .sample_rate
            .context("Sample rate not specified in codec params")?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .context("Failed to create decoder")?;

        // Frames to keep at the native rate; decoding stops once reached.
        let max_frames = self.clip_duration_secs as u64 * native_sample_rate as u64;

        let mut samples: Vec<f32> = Vec::new();
        let mut frames_done = 0u64;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => return Err(e).context("Failed to read packet"),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = decoder.decode(&packet).context("Failed to decode packet")?;
            let stereo = to_stereo_f32(&decoded);
            let frames_in_packet = (stereo.len() / 2) as u64;

            let keep = frames_in_packet.min(max_frames - frames_done);
            samples.extend_from_slice(&stereo[..(keep * 2) as usize]);
            frames_done += keep;

            if frames_done >= max_frames {
                break;
            }
        }

        if native_sample_rate != self.target_sample_rate {
            tracing::debug!(
                "Resampling {} from {} Hz to {} Hz",
                path.display(),
                native_sample_rate,
                self.target_sample_rate
            );
            samples = self
                .resample_stereo(samples, native_sample_rate)
                .context("Failed to resample audio")?;
        }

        Ok(samples)
    }

    /// Resample interleaved stereo PCM to the target rate using sinc
    /// interpolation, processed in a single chunk sized to the input.
    fn resample_stereo(&self, samples: Vec<f32>, source_rate: u32) -> Result<Vec<f32>> {
        if samples.is_empty() {
            return Ok(samples);
        }

        let num_frames = samples.len() / 2;

        let mut left = Vec::with_capacity(num_frames);
        let mut right = Vec::with_capacity(num_frames);
        for i in 0..num_frames {
            left.push(samples[i * 2]);
            right.push(samples[i * 2 + 1]);
        }

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let resample_ratio = self.target_sample_rate as f64 / source_rate as f64;

        let mut resampler = SincFixedIn::<f32>::new(resample_ratio, 2.0, params, num_frames, 2)
            .context("Failed to create resampler")?;

        let output_channels = resampler
            .process(&[left, right], None)
            .context("Resampling failed")?;

        let output_frames = output_channels[0].len();
        let mut output = Vec::with_capacity(output_frames * 2);
        for i in 0..output_frames {
            output.push(output_channels[0][i]);
            output.push(output_channels[1][i]);
        }

        Ok(output)
    }

    /// Render interleaved stereo f32 samples to a 16-bit PCM WAV file.
    fn render_wav(&self, samples: &[f32], output_path: &Path) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: self.target_sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(output_path, spec)
            .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;

        for &sample in samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * i16::MAX as f32) as i16)?;
        }

        writer.finalize().context("Failed to finalize output file")?;
        Ok(())
    }
}

/// Convert a decoded buffer of any sample format into interleaved stereo
/// f32. Mono is duplicated to both channels; anything above stereo keeps the
/// first two channels.
fn to_stereo_f32(decoded: &AudioBufferRef<'_>) -> Vec<f32> {
    match decoded {
        AudioBufferRef::U8(buf) => interleave_stereo(buf),
        AudioBufferRef::U16(buf) => interleave_stereo(buf),
        AudioBufferRef::U24(buf) => interleave_stereo(buf),
        AudioBufferRef::U32(buf) => interleave_stereo(buf),
        AudioBufferRef::S8(buf) => interleave_stereo(buf),
        AudioBufferRef::S16(buf) => interleave_stereo(buf),
        AudioBufferRef::S24(buf) => interleave_stereo(buf),
        AudioBufferRef::S32(buf) => interleave_stereo(buf),
        AudioBufferRef::F32(buf) => interleave_stereo(buf),
        AudioBufferRef::F64(buf) => interleave_stereo(buf),
    }
}

fn interleave_stereo<S>(buf: &AudioBuffer<S>) -> Vec<f32>
where
    S: Sample + IntoSample<f32>,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    let mut output = Vec::with_capacity(frames * 2);

    let left = buf.chan(0);
    let right = if channels > 1 { buf.chan(1) } else { buf.chan(0) };

    for i in 0..frames {
        output.push(left[i].into_sample());
        output.push(right[i].into_sample());
    }

    output
}
