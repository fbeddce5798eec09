//! `FreeCADCmd` process runner.

use super::{parse_dimension_lines, ExportArtifacts, GeometryKernel};
use crate::config::KernelConfig;
use crate::error::{PipelineError, Result};
use crate::generator::{compile_freecad_script, compile_measure_script};
use crate::model::{FormatKind, GeometryPlan};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Well-known install locations, tried before `PATH`.
const KNOWN_LOCATIONS: &[&str] = &[
    "/usr/lib/freecad/bin/FreeCADCmd",
    "/usr/bin/freecadcmd",
    "/usr/local/bin/freecadcmd",
    "/Applications/FreeCAD.app/Contents/Resources/bin/FreeCADCmd",
    r"C:\Program Files\FreeCAD 1.0\bin\FreeCADCmd.exe",
    r"C:\Program Files\FreeCAD 0.21\bin\FreeCADCmd.exe",
    r"C:\Program Files (x86)\FreeCAD 1.0\bin\FreeCADCmd.exe",
];

/// Executable names searched on `PATH`.
const PATH_NAMES: &[&str] = &["FreeCADCmd", "freecadcmd", "FreeCADCmd.exe"];

/// Interval between exit checks while the kernel runs.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Characters of kernel output kept in error diagnostics.
const DIAGNOSTIC_TAIL: usize = 2000;

/// Geometry kernel backed by an out-of-process `FreeCADCmd`.
#[derive(Debug, Clone)]
pub struct FreeCadKernel {
    command: PathBuf,
    config: KernelConfig,
}

impl FreeCadKernel {
    /// Use the configured command, or find an installed `FreeCADCmd`.
    pub fn discover(config: KernelConfig) -> Result<Self> {
        if let Some(command) = config.command.clone() {
            return Ok(Self { command, config });
        }

        let mut searched: Vec<PathBuf> = KNOWN_LOCATIONS.iter().map(PathBuf::from).collect();
        if let Some(paths) = std::env::var_os("PATH") {
            for dir in std::env::split_paths(&paths) {
                searched.extend(PATH_NAMES.iter().map(|name| dir.join(name)));
            }
        }

        match searched.iter().find(|p| p.is_file()) {
            Some(command) => {
                info!("Found geometry kernel at {}", command.display());
                Ok(Self {
                    command: command.clone(),
                    config,
                })
            }
            None => Err(PipelineError::KernelNotFound {
                searched: KNOWN_LOCATIONS.join(", "),
            }),
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Run one script. Exactly one attempt; killed when the timeout elapses.
    fn run_script(&self, script_path: &Path) -> Result<String> {
        let timeout = self.config.timeout();
        debug!(
            "Running {} on {} (timeout {}s)",
            self.command.display(),
            script_path.display(),
            timeout.as_secs()
        );

        let mut child = Command::new(&self.command)
            .args(&self.config.leading_args)
            .arg(script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PipelineError::KernelNotFound {
                    searched: self.command.display().to_string(),
                },
                _ => PipelineError::Io(e),
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_timeout(&mut child, timeout)?;
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        let Some(status) = status else {
            warn!("Geometry kernel timed out after {}s", timeout.as_secs());
            return Err(PipelineError::Timeout {
                seconds: timeout.as_secs(),
            });
        };

        if !status.success() {
            return Err(PipelineError::Export {
                message: format!("kernel exited with {}", status),
                diagnostic: tail(&format!("{}{}", stdout, stderr)),
            });
        }
        Ok(stdout)
    }
}

/// Read a child pipe to the end on a background thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

/// Wait for exit, killing the child when `timeout` elapses. `None` means killed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn tail(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = chars.len().saturating_sub(DIAGNOSTIC_TAIL);
    chars[start..].iter().collect()
}

/// Write a file that must not already exist.
fn write_new(path: &Path, content: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => PipelineError::Export {
                message: format!("{} already exists", path.display()),
                diagnostic: String::new(),
            },
            _ => PipelineError::Io(e),
        })?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

impl GeometryKernel for FreeCadKernel {
    fn export(
        &self,
        plan: &GeometryPlan,
        formats: &[FormatKind],
        request_id: &str,
    ) -> Result<ExportArtifacts> {
        let out = &self.config.output_dir;
        fs::create_dir_all(out)?;

        let files: BTreeMap<FormatKind, PathBuf> = formats
            .iter()
            .map(|f| (*f, out.join(format!("{}.{}", request_id, f.extension()))))
            .collect();
        let exports: Vec<(FormatKind, PathBuf)> =
            files.iter().map(|(f, p)| (*f, p.clone())).collect();

        let script_path = out.join(format!("{}.py", request_id));
        write_new(&script_path, &compile_freecad_script(plan, &exports))?;
        info!("Wrote kernel script {}", script_path.display());

        let stdout = self.run_script(&script_path)?;

        for (format, path) in &files {
            if !path.is_file() {
                return Err(PipelineError::Export {
                    message: format!("kernel produced no {} file at {}", format, path.display()),
                    diagnostic: tail(&stdout),
                });
            }
        }
        info!("Exported {} file(s) for request {}", files.len(), request_id);

        Ok(ExportArtifacts {
            request_id: request_id.to_string(),
            script_path,
            bounding_box: parse_dimension_lines(&stdout),
            files,
            stdout,
        })
    }

    fn measure_bounding_box(&self, path: &Path) -> Result<[f64; 3]> {
        if !path.is_file() {
            return Err(PipelineError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let script_path = path.with_extension("measure.py");
        fs::write(&script_path, compile_measure_script(path))?;
        let stdout = self.run_script(&script_path)?;
        parse_dimension_lines(&stdout).ok_or_else(|| PipelineError::Export {
            message: format!("no bounding box reported for {}", path.display()),
            diagnostic: tail(&stdout),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::model::{Placement, PrimitiveKind, ShapeKind};
    use tempfile::TempDir;

    /// Kernel that runs `sh -c <body>` with the script path as `$1`.
    fn fake_kernel(dir: &TempDir, body: &str, timeout_secs: u64) -> FreeCadKernel {
        FreeCadKernel::discover(KernelConfig {
            command: Some(PathBuf::from("sh")),
            leading_args: vec!["-c".to_string(), body.to_string(), "kernel".to_string()],
            output_dir: dir.path().to_path_buf(),
            timeout_secs,
        })
        .expect("configured kernel")
    }

    fn box_plan() -> GeometryPlan {
        let mut plan = GeometryPlan::new(ShapeKind::Box);
        let base = plan.add_primitive(
            "Box",
            PrimitiveKind::Box {
                length: 50.0,
                width: 40.0,
                height: 10.0,
            },
            Placement::origin(),
        );
        plan.set_result(base);
        plan
    }

    const WRITES_STL: &str = r#"base="${1%.py}"; touch "$base.stl"; echo DIMENSION:LENGTH:50.000000; echo DIMENSION:WIDTH:40.000000; echo DIMENSION:HEIGHT:10.000000"#;

    #[test]
    fn test_export_success() {
        let dir = TempDir::new().expect("tempdir");
        let kernel = fake_kernel(&dir, WRITES_STL, 10);
        let artifacts = kernel
            .export(&box_plan(), &[FormatKind::Stl], "req1")
            .expect("export");

        assert_eq!(artifacts.script_path, dir.path().join("req1.py"));
        assert_eq!(artifacts.files.get(&FormatKind::Stl), Some(&dir.path().join("req1.stl")));
        assert_eq!(artifacts.bounding_box, Some([50.0, 40.0, 10.0]));
        let script = fs::read_to_string(&artifacts.script_path).expect("script");
        assert!(script.contains("Part::Box"));
    }

    #[test]
    fn test_nonzero_exit_is_export_error() {
        let dir = TempDir::new().expect("tempdir");
        let kernel = fake_kernel(&dir, "echo boom >&2; exit 3", 10);
        let err = kernel
            .export(&box_plan(), &[FormatKind::Stl], "req2")
            .unwrap_err();
        match err {
            PipelineError::Export { diagnostic, .. } => assert!(diagnostic.contains("boom")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_output_is_export_error() {
        let dir = TempDir::new().expect("tempdir");
        let kernel = fake_kernel(&dir, "exit 0", 10);
        let err = kernel
            .export(&box_plan(), &[FormatKind::Step], "req3")
            .unwrap_err();
        assert!(err.to_string().contains("no step file"));
    }

    #[test]
    fn test_timeout_kills_kernel() {
        let dir = TempDir::new().expect("tempdir");
        let kernel = fake_kernel(&dir, "exec sleep 30", 1);
        let started = Instant::now();
        let err = kernel
            .export(&box_plan(), &[FormatKind::Stl], "req4")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Timeout { seconds: 1 }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_artifacts_are_write_once() {
        let dir = TempDir::new().expect("tempdir");
        let kernel = fake_kernel(&dir, WRITES_STL, 10);
        kernel
            .export(&box_plan(), &[FormatKind::Stl], "req5")
            .expect("first export");
        let err = kernel
            .export(&box_plan(), &[FormatKind::Stl], "req5")
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_measure_bounding_box() {
        let dir = TempDir::new().expect("tempdir");
        let part = dir.path().join("part.stl");
        fs::write(&part, "solid empty\nendsolid empty\n").expect("stl");
        let kernel = fake_kernel(
            &dir,
            "echo DIMENSION:LENGTH:1.5; echo DIMENSION:WIDTH:2.5; echo DIMENSION:HEIGHT:3.5",
            10,
        );
        assert_eq!(kernel.measure_bounding_box(&part).expect("bbox"), [1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_missing_command_is_kernel_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let kernel = FreeCadKernel::discover(KernelConfig {
            command: Some(dir.path().join("no-such-kernel")),
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .expect("configured kernel");
        let err = kernel
            .export(&box_plan(), &[FormatKind::Stl], "req6")
            .unwrap_err();
        assert!(matches!(err, PipelineError::KernelNotFound { .. }));
    }
}
