//! Guarded Execution Orchestrator
//!
//! Binds a temporary resolution change to the lifetime of one child process.
//! Once the arguments are valid, every path (failed query, rejected mode,
//! failed spawn, even a panic) goes through the reset before returning.
//!
//! A failed resolution change does not stop the command from running; the
//! failure is reported together with anything else that went wrong.

use tracing::{debug, info, info_span, warn};

use crate::display::{DisplayBackend, DisplayController, ResolutionChangeOutcome};
use crate::error::RunresError;
use crate::launcher::ProcessLauncher;

/// Stages of a run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Applying,
    Running,
    Resetting,
    Done,
}

/// What happened during a run that got past argument validation
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunReport {
    pub resolution: Option<ResolutionChangeOutcome>,
    /// Exit code of the child, recorded but not interpreted
    pub exit_code: Option<i32>,
    pub errors: Vec<RunresError>,
    pub phases: Vec<RunPhase>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// All captured errors as one message, one per line
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    fn enter(&mut self, phase: RunPhase) {
        debug!(?phase, "Run phase");
        self.phases.push(phase);
    }
}

/// Resets the display when dropped
struct DisplayGuard<'a, B: DisplayBackend> {
    controller: &'a DisplayController<B>,
}

impl<B: DisplayBackend> Drop for DisplayGuard<'_, B> {
    fn drop(&mut self) {
        self.controller.reset_to_defaults();
    }
}

pub struct Orchestrator<B, L> {
    controller: DisplayController<B>,
    launcher: L,
}

impl<B: DisplayBackend, L: ProcessLauncher> Orchestrator<B, L> {
    pub fn new(controller: DisplayController<B>, launcher: L) -> Self {
        Self {
            controller,
            launcher,
        }
    }

    /// Run `command` with the primary display set to `width`x`height`.
    ///
    /// Only invalid dimensions produce `Err`, and they do so before any
    /// display call. Everything else is collected in the [`RunReport`].
    pub fn run(&self, width: i64, height: i64, command: &str) -> Result<RunReport, RunresError> {
        let (width, height) = validate_resolution(width, height)?;
        let _span = info_span!("run", width, height).entered();

        let mut report = RunReport::default();
        report.enter(RunPhase::Idle);

        report.enter(RunPhase::Applying);
        let guard = DisplayGuard {
            controller: &self.controller,
        };

        let device = self.controller.primary_device();
        let outcome = self.controller.set_resolution(&device, width, height);
        report.resolution = Some(outcome);
        match outcome {
            ResolutionChangeOutcome::Applied => {}
            ResolutionChangeOutcome::QueryFailed => report.errors.push(RunresError::QueryFailed {
                device: device.name.clone(),
            }),
            ResolutionChangeOutcome::UnsupportedMode => {
                report
                    .errors
                    .push(RunresError::UnsupportedMode { width, height })
            }
            ResolutionChangeOutcome::ApplyFailed(status) => {
                report.errors.push(RunresError::ApplyFailed {
                    width,
                    height,
                    status,
                })
            }
        }
        if !outcome.is_applied() {
            warn!(?outcome, "Resolution not changed, running command anyway");
        }

        report.enter(RunPhase::Running);
        match self.launcher.launch(command) {
            Ok(code) => report.exit_code = Some(code),
            Err(e) => {
                warn!(error = %e, "Command failed");
                report.errors.push(e);
            }
        }

        report.enter(RunPhase::Resetting);
        drop(guard);

        report.enter(RunPhase::Done);
        info!(
            exit_code = ?report.exit_code,
            errors = report.errors.len(),
            "Run finished"
        );
        Ok(report)
    }
}

/// Check that both dimensions are positive and fit the display API
pub fn validate_resolution(width: i64, height: i64) -> Result<(u32, u32), RunresError> {
    let invalid = || RunresError::InvalidArgument { width, height };

    if width <= 0 || height <= 0 {
        return Err(invalid());
    }
    let w = u32::try_from(width).map_err(|_| invalid())?;
    let h = u32::try_from(height).map_err(|_| invalid())?;
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mock::MockDisplay;
    use crate::display::{ChangeFlags, ChangeStatus, DisplayDevice, DisplayMode};
    use std::cell::RefCell;

    /// Records launched commands and returns a scripted result
    struct FakeLauncher {
        result: Result<i32, RunresError>,
        launched: RefCell<Vec<String>>,
    }

    impl FakeLauncher {
        fn exits(code: i32) -> Self {
            Self {
                result: Ok(code),
                launched: RefCell::new(Vec::new()),
            }
        }

        fn fails(reason: &str) -> Self {
            Self {
                result: Err(RunresError::child("missing.exe", reason)),
                launched: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProcessLauncher for FakeLauncher {
        fn launch(&self, command: &str) -> Result<i32, RunresError> {
            self.launched.borrow_mut().push(command.to_string());
            self.result.clone()
        }
    }

    const FULL_PATH: [RunPhase; 5] = [
        RunPhase::Idle,
        RunPhase::Applying,
        RunPhase::Running,
        RunPhase::Resetting,
        RunPhase::Done,
    ];

    #[test]
    fn test_supported_mode_runs_and_resets() {
        let mock = MockDisplay::single(1920, 1080).with_supported(1024, 768);
        let launcher = FakeLauncher::exits(0);
        let orchestrator = Orchestrator::new(DisplayController::new(&mock), &launcher);

        let report = orchestrator.run(1024, 768, "echo hello").unwrap();

        assert_eq!(report.resolution, Some(ResolutionChangeOutcome::Applied));
        assert_eq!(report.exit_code, Some(0));
        assert!(report.is_success());
        assert_eq!(report.error_message(), None);
        assert_eq!(report.phases, FULL_PATH);
        assert_eq!(*launcher.launched.borrow(), vec!["echo hello".to_string()]);
        assert_eq!(mock.resets(), 1);
        assert_eq!(mock.current().resolution(), (1920, 1080));
    }

    #[test]
    fn test_unsupported_mode_still_runs_command() {
        let mock = MockDisplay::single(1920, 1080);
        let launcher = FakeLauncher::exits(0);
        let orchestrator = Orchestrator::new(DisplayController::new(&mock), &launcher);

        let report = orchestrator.run(999999, 999999, "echo hello").unwrap();

        assert_eq!(
            report.resolution,
            Some(ResolutionChangeOutcome::UnsupportedMode)
        );
        assert_eq!(launcher.launched.borrow().len(), 1);
        assert_eq!(mock.resets(), 1);
        assert!(report.error_message().unwrap().contains("not supported"));
        assert_eq!(report.phases, FULL_PATH);
    }

    #[test]
    fn test_invalid_argument_touches_nothing() {
        let mock = MockDisplay::single(1920, 1080);
        let launcher = FakeLauncher::exits(0);
        let orchestrator = Orchestrator::new(DisplayController::new(&mock), &launcher);

        let err = orchestrator.run(-1, 768, "echo hello").unwrap_err();

        assert_eq!(
            err,
            RunresError::InvalidArgument {
                width: -1,
                height: 768
            }
        );
        assert!(mock.calls().is_empty());
        assert!(launcher.launched.borrow().is_empty());
    }

    #[test]
    fn test_zero_devices_reports_query_failure() {
        let mock = MockDisplay::new();
        let launcher = FakeLauncher::exits(3);
        let orchestrator = Orchestrator::new(DisplayController::new(&mock), &launcher);

        let report = orchestrator.run(800, 600, "game.exe").unwrap();

        assert_eq!(report.resolution, Some(ResolutionChangeOutcome::QueryFailed));
        assert_eq!(report.exit_code, Some(3));
        assert_eq!(
            report.errors,
            vec![RunresError::QueryFailed {
                device: String::new()
            }]
        );
        assert_eq!(mock.resets(), 1);
    }

    #[test]
    fn test_child_failure_is_aggregated_with_display_failure() {
        let mock = MockDisplay::single(1920, 1080)
            .with_supported(640, 480)
            .with_apply_status(ChangeStatus::Failed);
        let launcher = FakeLauncher::fails("file not found");
        let orchestrator = Orchestrator::new(DisplayController::new(&mock), &launcher);

        let report = orchestrator.run(640, 480, "missing.exe").unwrap();

        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.exit_code, None);
        let message = report.error_message().unwrap();
        assert_eq!(message.lines().count(), 2);
        assert!(message.contains("640x480"));
        assert!(message.contains("file not found"));
        assert_eq!(mock.resets(), 1);
    }

    #[test]
    fn test_nonzero_exit_code_is_not_an_error() {
        let mock = MockDisplay::single(1920, 1080).with_supported(1280, 720);
        let launcher = FakeLauncher::exits(1);
        let orchestrator = Orchestrator::new(DisplayController::new(&mock), &launcher);

        let report = orchestrator.run(1280, 720, "game.exe").unwrap();
        assert!(report.is_success());
        assert_eq!(report.exit_code, Some(1));
    }

    #[test]
    fn test_reset_runs_when_launcher_panics() {
        struct PanickingLauncher;

        impl ProcessLauncher for PanickingLauncher {
            fn launch(&self, _command: &str) -> Result<i32, RunresError> {
                panic!("launcher exploded");
            }
        }

        let mock = MockDisplay::single(1920, 1080).with_supported(1024, 768);
        let orchestrator = Orchestrator::new(DisplayController::new(&mock), PanickingLauncher);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            orchestrator.run(1024, 768, "game.exe")
        }));

        assert!(result.is_err());
        assert_eq!(mock.resets(), 1);
        assert_eq!(mock.current().resolution(), (1920, 1080));
    }

    #[test]
    fn test_reset_runs_when_dry_run_panics() {
        /// Wraps a mock and blows up on the first dry-run request
        struct PanicOnDryRun<'a>(&'a MockDisplay);

        impl DisplayBackend for PanicOnDryRun<'_> {
            fn enum_device(&self, index: u32) -> Option<DisplayDevice> {
                self.0.enum_device(index)
            }

            fn current_mode(&self, device: &DisplayDevice) -> Option<DisplayMode> {
                self.0.current_mode(device)
            }

            fn change_mode(&self, mode: Option<&DisplayMode>, flags: ChangeFlags) -> ChangeStatus {
                if mode.is_some() && flags.contains(ChangeFlags::TEST) {
                    panic!("driver crashed during dry run");
                }
                self.0.change_mode(mode, flags)
            }

            fn screen_size(&self) -> (u32, u32) {
                self.0.screen_size()
            }
        }

        let mock = MockDisplay::single(1920, 1080).with_supported(1024, 768);
        let launcher = FakeLauncher::exits(0);
        let orchestrator =
            Orchestrator::new(DisplayController::new(PanicOnDryRun(&mock)), &launcher);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            orchestrator.run(1024, 768, "game.exe")
        }));

        assert!(result.is_err());
        assert_eq!(mock.resets(), 1);
        assert_eq!(mock.change_requests(), 0);
        assert!(launcher.launched.borrow().is_empty());
    }

    #[test]
    fn test_validate_resolution_bounds() {
        assert_eq!(validate_resolution(1, 1), Ok((1, 1)));
        assert!(validate_resolution(0, 600).is_err());
        assert!(validate_resolution(800, -600).is_err());
        assert!(validate_resolution(i64::from(u32::MAX) + 1, 600).is_err());
    }
}
