// Turn executor - runs one chat turn as a `bash -s` child on the sprite
//
// Capture mode polls the child for liveness every POLL_INTERVAL so the UI can
// animate a spinner, drains stdout/stderr concurrently, and hands back a
// TurnResult. Passthrough mode wires the child straight to the terminal.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::error::TurnError;
use super::preamble::{self, BOOTSTRAP_SCRIPT};
use super::types::{TurnMode, TurnOutput, TurnRequest, TurnResult};
use crate::config::constants::DEFAULT_POLL_INTERVAL_MS;

/// Receives liveness updates while a turn is running
pub trait ProgressSink {
    /// Static "working" notice, shown once per turn before any tick
    fn notice(&mut self);

    /// Called once per poll iteration with whole seconds elapsed
    fn tick(&mut self, elapsed_secs: u64);

    /// Turn is over; remove whatever the indicator drew
    fn clear(&mut self);
}

/// Sink that ignores every update
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notice(&mut self) {}
    fn tick(&mut self, _elapsed_secs: u64) {}
    fn clear(&mut self) {}
}

/// The remote-exec command line plus the sandbox it targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    program: String,
    prefix_args: Vec<String>,
    sandbox: String,
}

impl RemoteTarget {
    /// `remote_exec` is split shell-style, so `sprite exec` becomes the
    /// program `sprite` with `exec` ahead of the sandbox flags. `sandbox`
    /// must already be a validated sprite name.
    pub fn new(remote_exec: impl AsRef<str>, sandbox: impl Into<String>) -> Self {
        let remote_exec = remote_exec.as_ref();
        let mut words = shlex::split(remote_exec)
            .unwrap_or_else(|| vec![remote_exec.to_string()])
            .into_iter();

        Self {
            program: words.next().unwrap_or_default(),
            prefix_args: words.collect(),
            sandbox: sandbox.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn sandbox(&self) -> &str {
        &self.sandbox
    }

    /// `<program> [prefix args] -s <sandbox> bash -s`
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.prefix_args)
            .args(["-s", self.sandbox.as_str(), "bash", "-s"]);
        command
    }
}

pub struct TurnExecutor {
    target: RemoteTarget,
    script: String,
    poll_interval: Duration,
}

impl TurnExecutor {
    pub fn new(target: RemoteTarget) -> Self {
        Self {
            target,
            script: BOOTSTRAP_SCRIPT.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Replace the bootstrap script that follows the exports
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    /// Run one turn. Non-zero exit codes are data, not errors.
    pub async fn execute(
        &self,
        request: &TurnRequest,
        mode: TurnMode,
        progress: &mut dyn ProgressSink,
    ) -> Result<TurnOutput, TurnError> {
        let payload = preamble::build(request, &self.script)?;

        match mode {
            TurnMode::Capture => self
                .run_captured(&payload, progress)
                .await
                .map(TurnOutput::Captured),
            TurnMode::Passthrough => self.run_passthrough(&payload, progress).await,
        }
    }

    async fn run_captured(
        &self,
        payload: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<TurnResult, TurnError> {
        let start = Instant::now();

        let mut child = self.spawn(Stdio::piped(), Stdio::piped())?;

        // Drain before feeding stdin so a chatty child can never block on a full pipe
        let stdout_task = drain(child.stdout.take());
        let stderr_task = drain(child.stderr.take());

        feed_stdin(&mut child, payload).await;
        progress.notice();

        let status = match self.poll_until_exit(&mut child, start, progress).await {
            Ok(status) => status,
            Err(err) => {
                progress.clear();
                abandon(&mut child, [&stdout_task, &stderr_task]).await;
                return Err(err);
            }
        };
        progress.clear();

        let stdout = join_drain(stdout_task, "stdout").await;
        let stderr = join_drain(stderr_task, "stderr").await;
        drop(child);

        let result = TurnResult {
            stdout,
            stderr,
            exit_code: exit_code(status),
            wall_clock_secs: start.elapsed().as_secs_f64(),
        };

        debug!(
            exit_code = result.exit_code,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            secs = result.wall_clock_secs,
            "turn finished"
        );

        Ok(result)
    }

    async fn poll_until_exit(
        &self,
        child: &mut Child,
        start: Instant,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExitStatus, TurnError> {
        let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => progress.tick(start.elapsed().as_secs()),
                Err(source) => {
                    return Err(TurnError::Wait {
                        program: self.target.program().to_string(),
                        source,
                    })
                }
            }
            ticker.tick().await;
        }
    }

    async fn run_passthrough(
        &self,
        payload: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<TurnOutput, TurnError> {
        progress.notice();

        let mut child = self.spawn(Stdio::inherit(), Stdio::inherit())?;
        feed_stdin(&mut child, payload).await;

        let status = child.wait().await.map_err(|source| TurnError::Wait {
            program: self.target.program().to_string(),
            source,
        })?;

        let exit_code = exit_code(status);
        debug!(exit_code, "passthrough turn finished");
        Ok(TurnOutput::Streamed { exit_code })
    }

    fn spawn(&self, stdout: Stdio, stderr: Stdio) -> Result<Child, TurnError> {
        debug!(
            program = %self.target.program(),
            sandbox = %self.target.sandbox(),
            "spawning turn"
        );

        self.target
            .command()
            .stdin(Stdio::piped())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|source| TurnError::Spawn {
                program: self.target.program().to_string(),
                source,
            })
    }
}

/// Write the preamble and close stdin. A child that exits early just gets a warning.
async fn feed_stdin(child: &mut Child, payload: &str) {
    let Some(mut stdin) = child.stdin.take() else {
        warn!("child stdin was not piped");
        return;
    };

    if let Err(e) = stdin.write_all(payload.as_bytes()).await {
        warn!("Failed to write turn preamble: {}", e);
    }
    if let Err(e) = stdin.shutdown().await {
        debug!("Failed to close child stdin: {}", e);
    }
}

fn drain<R>(reader: Option<R>) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut reader) = reader {
            if let Err(e) = reader.read_to_end(&mut buf).await {
                warn!("Failed to read child output: {}", e);
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

async fn join_drain(task: JoinHandle<String>, stream: &str) -> String {
    task.await.unwrap_or_else(|e| {
        warn!("{} reader task failed: {}", stream, e);
        String::new()
    })
}

/// Kill and reap a child we can no longer poll, and stop its readers
async fn abandon(child: &mut Child, drains: [&JoinHandle<String>; 2]) {
    if let Err(e) = child.start_kill() {
        debug!("Failed to kill turn child: {}", e);
    }
    if let Err(e) = child.wait().await {
        warn!("Failed to reap turn child: {}", e);
    }
    for task in drains {
        task.abort();
    }
}

/// Killed-by-signal has no code; report it as -1
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::turn::ThinkingLevel;

    #[derive(Default)]
    struct CountingSink {
        notices: usize,
        ticks: Vec<u64>,
        clears: usize,
    }

    impl ProgressSink for CountingSink {
        fn notice(&mut self) {
            self.notices += 1;
        }
        fn tick(&mut self, elapsed_secs: u64) {
            self.ticks.push(elapsed_secs);
        }
        fn clear(&mut self) {
            self.clears += 1;
        }
    }

    // `bash -s <sandbox> bash -s` reads the preamble from stdin just like the
    // real remote-exec would, so a local bash stands in for the sprite.
    fn local_executor(script: &str) -> TurnExecutor {
        TurnExecutor::new(RemoteTarget::new("bash", "test-sprite")).with_script(script)
    }

    fn request(message: &str) -> TurnRequest {
        TurnRequest::new(message, "tui", ThinkingLevel::High, 30)
    }

    async fn captured(executor: &TurnExecutor, message: &str, sink: &mut CountingSink) -> TurnResult {
        match executor
            .execute(&request(message), TurnMode::Capture, sink)
            .await
            .unwrap()
        {
            TurnOutput::Captured(result) => result,
            other => panic!("expected captured output, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_message_arrives_decoded_on_the_remote_side() {
        let executor = local_executor(r#"printf '%s' "$MSG_B64" | base64 -d"#);
        let mut sink = CountingSink::default();
        let message = "it's \"quoted\" $(not run) `nor this`";

        let result = captured(&executor, message, &mut sink).await;

        assert_eq!(result.stdout, message);
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_exports_are_visible_to_the_script() {
        let executor = local_executor(r#"echo "$SESSION_ID|$THINKING|$TIMEOUT""#);
        let mut sink = CountingSink::default();

        let result = captured(&executor, "hi", &mut sink).await;

        assert_eq!(result.stdout.trim(), "tui|high|30");
    }

    #[tokio::test]
    async fn test_stderr_and_exit_code_are_data() {
        let executor = local_executor("echo oops >&2; exit 3");
        let mut sink = CountingSink::default();

        let result = captured(&executor, "hi", &mut sink).await;

        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stderr.trim(), "oops");
        assert!(result.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_tick_count_tracks_poll_intervals() {
        let interval = Duration::from_millis(100);
        let executor = local_executor("echo $$; sleep 0.5").with_poll_interval(interval);
        let mut sink = CountingSink::default();

        let result = captured(&executor, "hi", &mut sink).await;

        // One tick per interval the child was alive, give or take one
        let n = (result.wall_clock_secs / interval.as_secs_f64()).round() as usize;
        let ticks = sink.ticks.len();
        assert!(
            ticks + 1 >= n && ticks <= n + 1,
            "{} ticks for {} intervals",
            ticks,
            n
        );
        assert!(sink.ticks.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(sink.notices, 1);
        assert_eq!(sink.clears, 1);
        assert!(result.wall_clock_secs >= 0.5);

        // The child has been reaped, not left as a zombie
        let pid = result.stdout.trim();
        if cfg!(target_os = "linux") {
            assert!(!std::path::Path::new(&format!("/proc/{}", pid)).exists());
        }

        let next = captured(&executor, "again", &mut sink).await;
        assert_eq!(next.exit_code, 0);
        assert_eq!(sink.clears, 2);
    }

    #[tokio::test]
    async fn test_abandoned_child_is_killed_and_reaped() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        let stdout_task = drain(child.stdout.take());
        let stderr_task = drain(child.stderr.take());

        abandon(&mut child, [&stdout_task, &stderr_task]).await;

        assert!(child.try_wait().unwrap().is_some());
        let _ = stdout_task.await;
        let _ = stderr_task.await;
    }

    #[tokio::test]
    async fn test_large_output_does_not_deadlock() {
        let executor = local_executor("head -c 300000 /dev/zero | tr '\\0' 'x'");
        let mut sink = CountingSink::default();

        let result = captured(&executor, "hi", &mut sink).await;

        assert_eq!(result.stdout.len(), 300_000);
    }

    #[tokio::test]
    async fn test_sequential_turns_reuse_nothing() {
        let executor = local_executor("echo $$");
        let mut sink = CountingSink::default();

        let first = captured(&executor, "one", &mut sink).await;
        let second = captured(&executor, "two", &mut sink).await;

        assert_ne!(first.stdout, second.stdout);
        assert_eq!(sink.clears, 2);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_a_value() {
        let executor = TurnExecutor::new(RemoteTarget::new(
            "definitely-not-a-real-remote-exec-binary",
            "test-sprite",
        ));
        let mut sink = CountingSink::default();

        let err = executor
            .execute(&request("hi"), TurnMode::Capture, &mut sink)
            .await
            .unwrap_err();

        assert!(err.is_spawn_failure());
        assert!(sink.ticks.is_empty());
    }

    #[tokio::test]
    async fn test_passthrough_returns_exit_code_only() {
        let executor = local_executor("exit 4");
        let mut sink = CountingSink::default();

        let output = executor
            .execute(&request("hi"), TurnMode::Passthrough, &mut sink)
            .await
            .unwrap();

        assert_eq!(output, TurnOutput::Streamed { exit_code: 4 });
        assert_eq!(sink.notices, 1);
        assert!(sink.ticks.is_empty());
    }

    fn argv(target: &RemoteTarget) -> (String, Vec<String>) {
        let command = target.command();
        let std_command = command.as_std();
        let program = std_command.get_program().to_string_lossy().into_owned();
        let args = std_command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        (program, args)
    }

    #[test]
    fn test_remote_command_shape() {
        let target = RemoteTarget::new(Config::default().remote_exec, "pm-agent");
        let (program, args) = argv(&target);

        assert_eq!(program, "sprite");
        assert_eq!(args, vec!["exec", "-s", "pm-agent", "bash", "-s"]);
    }

    #[test]
    fn test_remote_exec_is_split_like_a_shell() {
        let target = RemoteTarget::new("'/opt/my tools/sprite' exec --quiet", "pm-agent");
        let (program, args) = argv(&target);

        assert_eq!(target.program(), "/opt/my tools/sprite");
        assert_eq!(program, "/opt/my tools/sprite");
        assert_eq!(args, vec!["exec", "--quiet", "-s", "pm-agent", "bash", "-s"]);

        let bare = RemoteTarget::new("bash", "test-sprite");
        assert_eq!(argv(&bare).1, vec!["-s", "test-sprite", "bash", "-s"]);
    }
}
