use std::{
    ffi::OsString,
    fs::{self, OpenOptions},
    io::{self, Read, Write as _},
    path::{Path, PathBuf},
    process::{self, Child, Command, ExitStatus, Stdio},
    sync::atomic::{AtomicU64, Ordering},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use elosim_model::{EngineOptions, MatchHistory};
use log::{debug, warn};

use crate::{RatingEngine, RatingEngineError, Ratings, output::parse_engine_output};

/// Default location of the rating engine executable.
pub const DEFAULT_ENGINE_PATH: &str = "target/release/spawelo_cli";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs the external rating engine as a blocking child process.
///
/// Each call writes the options to a fresh temporary file, starts the engine with
/// `[args...] --options-file <path>`, feeds the history JSON to its standard input
/// and waits for it to exit. Concurrent calls are independent.
///
/// With a timeout, the whole evaluation (engine exit and draining its output) is
/// bounded. On Unix the engine runs in its own process group, and the group is
/// killed on expiry so helper processes it started do not outlive the call.
#[derive(Debug, Clone)]
pub struct ProcessRatingEngine {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl Default for ProcessRatingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE_PATH)
    }
}

impl ProcessRatingEngine {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            timeout: None,
        }
    }

    /// Arguments placed before `--options-file`, e.g. `["run", "--release", "--"]`
    /// when the program is `cargo`.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Kills the engine and fails the evaluation if it runs longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn timed_out(&self) -> RatingEngineError {
        RatingEngineError::Timeout {
            timeout: self.timeout.unwrap_or_default(),
        }
    }

    fn command(&self, options_path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--options-file")
            .arg(options_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt as _;
            command.process_group(0);
        }
        command
    }

    fn run(&self, stdin_data: Vec<u8>, options_path: &Path) -> Result<String, RatingEngineError> {
        debug!(
            "> {} --options-file {}",
            self.program.display(),
            options_path.display()
        );
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let mut child = self.command(options_path).spawn().map_err(|source| {
            let path = self.program.clone();
            if source.kind() == io::ErrorKind::NotFound {
                RatingEngineError::NotFound { path, source }
            } else {
                RatingEngineError::Spawn { path, source }
            }
        })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let writer = thread::spawn(move || write_pipe(stdin, &stdin_data));
        let stdout = thread::spawn(move || read_pipe(stdout));
        let stderr = thread::spawn(move || read_pipe(stderr));

        let status = match wait_until(&mut child, deadline) {
            Ok(Some(status)) => status,
            Ok(None) => {
                terminate(&mut child);
                return Err(self.timed_out());
            }
            Err(e) => {
                terminate(&mut child);
                return Err(io_error("waiting for the rating engine")(e));
            }
        };
        // Processes left behind by the engine may still hold the pipes open.
        let (Some(written), Some(stdout), Some(stderr)) = (
            join_until(writer, deadline),
            join_until(stdout, deadline),
            join_until(stderr, deadline),
        ) else {
            terminate(&mut child);
            return Err(self.timed_out());
        };
        let stdout = stdout.map_err(io_error("reading rating engine stdout"))?;
        let stderr = stderr.map_err(io_error("reading rating engine stderr"))?;

        if !status.success() {
            return Err(RatingEngineError::Execution {
                status,
                stdout,
                stderr,
            });
        }
        written.map_err(io_error("writing the match history to the rating engine"))?;
        Ok(stdout)
    }
}

impl RatingEngine for ProcessRatingEngine {
    fn evaluate(
        &self,
        history: &MatchHistory,
        options: &EngineOptions,
    ) -> Result<Ratings, RatingEngineError> {
        let history_json = history
            .to_json_pretty()
            .map_err(|source| RatingEngineError::Serialize { source })?;
        let options_json = options
            .to_json_pretty()
            .map_err(|source| RatingEngineError::Serialize { source })?;
        let options_file = TempOptionsFile::create(&options_json)
            .map_err(io_error("writing the options file"))?;

        let stdout = self.run(history_json.into_bytes(), options_file.path())?;
        let ratings = parse_engine_output(&stdout);
        if ratings.is_empty() {
            return Err(RatingEngineError::EmptyOutput);
        }
        Ok(ratings)
    }
}

fn io_error(action: &'static str) -> impl FnOnce(io::Error) -> RatingEngineError {
    move |source| RatingEngineError::Io { action, source }
}

/// Joins `handle`, giving up once `deadline` has passed.
fn join_until<T>(handle: JoinHandle<T>, deadline: Option<Instant>) -> Option<T> {
    if let Some(deadline) = deadline {
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
    let value = handle
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
    Some(value)
}

/// Writes `data` and closes the pipe. An engine that exits without reading its
/// input closes the pipe early; that is judged by its exit status instead.
fn write_pipe<W>(pipe: Option<W>, data: &[u8]) -> io::Result<()>
where
    W: io::Write,
{
    let Some(mut pipe) = pipe else {
        return Ok(());
    };
    match pipe.write_all(data) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result,
    }
}

fn read_pipe<R>(pipe: Option<R>) -> io::Result<String>
where
    R: Read,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf)?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Waits for `child` to exit. Returns `None` once `deadline` has passed.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kills the engine and, on Unix, every process in its group.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        match Command::new("kill")
            .args(["-s", "KILL", "--", &group])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => {}
            Ok(status) => debug!("kill of process group {group} exited with {status}"),
            Err(e) => warn!("failed to kill process group {group}: {e}"),
        }
    }
    if let Err(e) = child.kill() {
        debug!("failed to kill rating engine: {e}");
    }
    if let Err(e) = child.wait() {
        warn!("failed to reap rating engine: {e}");
    }
}

/// Options file removed on drop.
#[derive(Debug)]
struct TempOptionsFile {
    path: PathBuf,
}

impl TempOptionsFile {
    /// Creates a new file in the temp directory, never reusing an existing path.
    fn create(contents: &str) -> io::Result<Self> {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let path =
                std::env::temp_dir().join(format!("elosim-options-{}-{n}.json", process::id()));
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };
            let this = Self { path };
            file.write_all(contents.as_bytes())?;
            return Ok(this);
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempOptionsFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!("failed to remove {}: {e}", self.path.display());
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use elosim_model::MatchHistory;

    use super::*;

    /// Writes a shell script standing in for the engine.
    fn script(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("elosim-test-{}-{name}.sh", process::id()));
        fs::write(&path, format!("{body}\n")).unwrap();
        path
    }

    /// Runs the script through `sh` so it never has to be executable.
    fn sh(path: &Path) -> ProcessRatingEngine {
        ProcessRatingEngine::new("/bin/sh").with_args([path])
    }

    fn evaluate(engine: &ProcessRatingEngine) -> Result<Ratings, RatingEngineError> {
        engine.evaluate(&MatchHistory::new("test"), &EngineOptions::default())
    }

    #[test]
    fn missing_executable() {
        let engine = ProcessRatingEngine::new("/nonexistent/elosim-engine");
        assert!(evaluate(&engine).unwrap_err().is_not_found());
    }

    #[test]
    fn parses_successful_output() {
        let path = script(
            "ok",
            "cat > /dev/null\necho 'Computing...'\necho ' Player-1 1532'\necho 'Player-2 980'",
        );
        let ratings = evaluate(&sh(&path)).unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings["Player-1"], 1532);
        assert_eq!(ratings["Player-2"], 980);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn receives_history_and_options_file() {
        // Report back what the engine received as fake rating records.
        let path = script(
            "args",
            "grep -q '\"game\": \"test\"' && echo 'stdin 1'\n\
             [ \"$1\" = --options-file ] && grep -q evenMatchTargetProbability \"$2\" && echo 'options 1'",
        );
        let ratings = evaluate(&sh(&path)).unwrap();
        assert_eq!(ratings.get("stdin"), Some(&1));
        assert_eq!(ratings.get("options"), Some(&1));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn non_zero_exit_keeps_diagnostics() {
        let path = script("fail", "echo 'Player-1 1000'\necho 'bad options' >&2\nexit 3");
        let err = evaluate(&sh(&path)).unwrap_err();
        let RatingEngineError::Execution { status, stderr, .. } = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(status.code(), Some(3));
        assert_eq!(stderr, "bad options\n");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn empty_output_is_an_error() {
        let path = script("empty", "cat > /dev/null\necho 'nothing to report'");
        let err = evaluate(&sh(&path)).unwrap_err();
        assert!(matches!(err, RatingEngineError::EmptyOutput));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn timeout_kills_engine() {
        let path = script("slow", "exec sleep 5");
        let engine = sh(&path).with_timeout(Duration::from_millis(100));
        let err = evaluate(&engine).unwrap_err();
        assert!(matches!(err, RatingEngineError::Timeout { .. }));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn timeout_bounds_engine_with_child_processes() {
        // The shell forks `sleep`, which inherits the output pipes.
        let path = script("forking", "sleep 3\necho 'Player-1 1000'");
        let engine = sh(&path).with_timeout(Duration::from_millis(100));
        let start = Instant::now();
        let err = evaluate(&engine).unwrap_err();
        assert!(matches!(err, RatingEngineError::Timeout { .. }), "{err}");
        assert!(start.elapsed() < Duration::from_secs(2), "{:?}", start.elapsed());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn timeout_covers_output_held_by_background_process() {
        let path = script("background", "echo 'Player-1 1000'\nsleep 3 &");
        let engine = sh(&path).with_timeout(Duration::from_millis(200));
        let start = Instant::now();
        let err = evaluate(&engine).unwrap_err();
        assert!(matches!(err, RatingEngineError::Timeout { .. }), "{err}");
        assert!(start.elapsed() < Duration::from_secs(2), "{:?}", start.elapsed());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn options_file_never_reuses_existing_path() {
        let first = TempOptionsFile::create("{}").unwrap();
        let second = TempOptionsFile::create("{}").unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().exists());
        let path = second.path().to_path_buf();
        drop(second);
        assert!(!path.exists());
    }
}
