//! Interactive calibration session and scaling-factor resolution.

use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, BufReader, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::{CalibrationSample, CalibrationState, RawChannels, ScaledColor};
use crate::sensor::{IlluminatedSensor, Sensor, SensorError};
use crate::services::{CalibrationEngine, CalibrationStore};

/// Operator's answer to a placement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptReply {
    /// Reference is under the sensor; take the readings
    Ready,
    /// Leave this reference out
    Skip,
    /// Stop calibrating altogether
    Abort,
}

/// Front end that asks the operator to place a reference card.
pub trait SamplePrompt {
    /// Blocks until the operator answers for `reference` (`index` of `total`,
    /// zero based).
    fn request_sample(
        &mut self,
        reference: &CalibrationSample,
        index: usize,
        total: usize,
    ) -> Result<PromptReply>;
}

/// Line-based prompt on a terminal.
///
/// Enter means ready, `s` skips, `q` aborts. End of input aborts.
#[derive(Debug)]
pub struct ConsolePrompt<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl ConsolePrompt<BufReader<std::io::Stdin>, std::io::Stdout> {
    /// Prompt on stdin/stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    /// Prompt reading from `input` and writing to `output`.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Gives back the output writer.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> SamplePrompt for ConsolePrompt<R, W> {
    fn request_sample(
        &mut self,
        reference: &CalibrationSample,
        index: usize,
        total: usize,
    ) -> Result<PromptReply> {
        loop {
            write!(
                self.output,
                "[{}/{}] Place the {} ({:.1}% reflectance) under the sensor, then press Enter \
                 (s = skip, q = abort): ",
                index + 1,
                total,
                reference.label,
                reference.known_reflectance_pct
            )
            .context("Failed to write calibration prompt")?;
            self.output.flush().context("Failed to flush calibration prompt")?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("Failed to read calibration answer")?;
            if read == 0 {
                return Ok(PromptReply::Abort);
            }

            match line.trim().to_ascii_lowercase().as_str() {
                "" | "y" | "yes" => return Ok(PromptReply::Ready),
                "s" | "skip" => return Ok(PromptReply::Skip),
                "q" | "quit" | "abort" => return Ok(PromptReply::Abort),
                other => {
                    writeln!(self.output, "Unrecognized answer '{other}'")
                        .context("Failed to write calibration prompt")?;
                }
            }
        }
    }
}

/// How the scaling factor should be obtained at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationMode {
    /// Use the persisted factor, calibrating only when there is none
    #[default]
    Auto,
    /// Calibrate even if a factor is persisted
    Force,
    /// Use the default factor without calibrating or loading
    Skip,
}

/// Result of an interactive calibration run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionOutcome {
    /// All references handled, factor derived
    Completed(f64),
    /// Operator aborted before the end
    Aborted,
}

/// Walks the operator through every reference and derives the factor.
///
/// Sensor errors propagate. The engine is left `Calibrated` on completion and
/// `Uncalibrated` on abort.
pub fn run_session<S, P>(
    engine: &mut CalibrationEngine,
    sensor: &mut S,
    prompt: &mut P,
) -> Result<SessionOutcome>
where
    S: Sensor + ?Sized,
    P: SamplePrompt + ?Sized,
{
    let total = engine.references().len();
    let mut pending = engine.begin().cloned();
    let mut index = 0;

    while let Some(reference) = pending {
        match prompt.request_sample(&reference, index, total)? {
            PromptReply::Ready => {
                engine.measure(sensor)?;
            }
            PromptReply::Skip => {
                engine.skip_sample()?;
            }
            PromptReply::Abort => {
                engine.abort();
                return Ok(SessionOutcome::Aborted);
            }
        }
        index += 1;
        pending = engine.pending_request().cloned();
    }

    let state = engine.finish()?;
    Ok(SessionOutcome::Completed(state.scaling_factor))
}

/// Determines the scaling factor for this process.
///
/// - `Skip`: the engine's default factor, nothing loaded or saved
/// - `Auto`: the persisted factor, or a fresh calibration if none is usable
/// - `Force`: always a fresh calibration
///
/// A completed calibration is persisted; a save failure is logged and the
/// derived factor is still used. An aborted calibration falls back to the
/// persisted factor, then to the default.
pub fn resolve_scaling_factor<S, P>(
    mode: CalibrationMode,
    store: &CalibrationStore,
    engine: &mut CalibrationEngine,
    sensor: &mut S,
    prompt: &mut P,
) -> Result<f64>
where
    S: Sensor + ?Sized,
    P: SamplePrompt + ?Sized,
{
    match mode {
        CalibrationMode::Skip => {
            info!(
                "Calibration skipped; using default scaling factor {}",
                engine.default_factor()
            );
            return Ok(engine.default_factor());
        }
        CalibrationMode::Auto => {
            if let Some(state) = store.load() {
                info!(
                    "Loaded scaling factor {:.4} from {}",
                    state.scaling_factor,
                    store.path().display()
                );
                return Ok(state.scaling_factor);
            }
            info!("No usable calibration found; starting calibration");
        }
        CalibrationMode::Force => info!("Recalibration requested"),
    }

    match run_session(engine, sensor, prompt)? {
        SessionOutcome::Completed(factor) => {
            let state = CalibrationState::new(factor);
            match store.save(&state) {
                Ok(()) => info!("Calibration saved to {}", store.path().display()),
                Err(e) => warn!("Failed to save calibration: {:#}", e),
            }
            Ok(factor)
        }
        SessionOutcome::Aborted => {
            let factor = store
                .load()
                .map_or_else(|| engine.default_factor(), |state| state.scaling_factor);
            warn!("Calibration aborted; using scaling factor {}", factor);
            Ok(factor)
        }
    }
}

/// Guarded sensor shared between the calibration thread and the task that
/// may have to switch the LEDs off while the operator has not answered yet.
struct SharedSensor<S: Sensor>(Arc<Mutex<IlluminatedSensor<S>>>);

impl<S: Sensor> SharedSensor<S> {
    fn lock(&self) -> Result<MutexGuard<'_, IlluminatedSensor<S>>, SensorError> {
        self.0
            .lock()
            .map_err(|_| SensorError::ReadFailed("sensor lock poisoned".to_string()))
    }
}

impl<S: Sensor> Sensor for SharedSensor<S> {
    fn read_raw_channels(&mut self) -> Result<RawChannels, SensorError> {
        self.lock()?.read_raw_channels()
    }

    fn read_scaled(&mut self) -> Result<ScaledColor, SensorError> {
        self.lock()?.read_scaled()
    }

    fn set_illumination(&mut self, on: bool) -> Result<(), SensorError> {
        self.lock()?.set_illumination(on)
    }
}

/// Runs [`resolve_scaling_factor`] on its own thread so an interrupt can end
/// it while the prompt is blocked on the operator.
///
/// Returns the factor and the still-lit sensor, or `None` when `cancel` fired
/// first, in which case the LEDs have already been switched off. A plain
/// thread is used so that exiting never waits for an unanswered prompt.
pub async fn resolve_scaling_factor_until_cancelled<S, P>(
    mode: CalibrationMode,
    store: CalibrationStore,
    mut engine: CalibrationEngine,
    sensor: IlluminatedSensor<S>,
    mut prompt: P,
    cancel: &CancellationToken,
) -> Result<Option<(f64, IlluminatedSensor<S>)>>
where
    S: Sensor + Send + 'static,
    P: SamplePrompt + Send + 'static,
{
    let shared = Arc::new(Mutex::new(sensor));
    let handle = SharedSensor(Arc::clone(&shared));
    let (tx, rx) = oneshot::channel();

    std::thread::Builder::new()
        .name("calibration".to_string())
        .spawn(move || {
            let mut handle = handle;
            let result = resolve_scaling_factor(mode, &store, &mut engine, &mut handle, &mut prompt);
            // Release the sensor before reporting so the caller can reclaim it
            drop(handle);
            let _ = tx.send(result);
        })
        .context("Failed to start calibration thread")?;

    tokio::select! {
        () = cancel.cancelled() => {
            let mut sensor = shared.lock().unwrap_or_else(PoisonError::into_inner);
            sensor
                .shutdown()
                .context("Failed to switch sensor illumination off")?;
            info!("Calibration interrupted");
            Ok(None)
        }
        result = rx => {
            let factor = result.context("Calibration thread stopped unexpectedly")??;
            let sensor = Arc::try_unwrap(shared)
                .map_err(|_| anyhow!("Sensor still in use after calibration"))?
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner);
            Ok(Some((factor, sensor)))
        }
    }
}
